use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::Role;
use crate::error::{invalid_input_error, Error};

/// Wrong codes a challenge tolerates before it is discarded.
pub const MAX_OTP_ATTEMPTS: u32 = 3;

/// A one-time code issued to a phone number. There is no SMS gateway, so the
/// code travels back to the caller in the challenge itself.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OtpChallenge {
    pub phone: String,
    pub role: Role,
    pub code: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip)]
    pub failed_attempts: u32,
}

impl OtpChallenge {
    pub fn new(phone: String, role: Role, code: String, issued_at: DateTime<Utc>, ttl: Duration) -> Self {
        Self {
            phone,
            role,
            code,
            expires_at: issued_at + ttl,
            failed_attempts: 0,
        }
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn attempts_exhausted(&self) -> bool {
        self.failed_attempts >= MAX_OTP_ATTEMPTS
    }

    pub fn verify(&self, code: &str, now: DateTime<Utc>) -> Result<(), Error> {
        if self.is_expired(now) || self.code != code.trim() {
            return Err(invalid_input_error());
        }

        Ok(())
    }
}

/// Accepts 10 to 15 digits with an optional leading `+`, ignoring spaces and
/// dashes, and returns the normalized number.
pub fn validate_phone(phone: &str) -> Result<String, Error> {
    let trimmed = phone.trim();
    let (prefix, rest) = match trimmed.strip_prefix('+') {
        Some(rest) => ("+", rest),
        None => ("", trimmed),
    };

    let digits: String = rest.chars().filter(|c| *c != ' ' && *c != '-').collect();

    if !(10..=15).contains(&digits.len()) || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(invalid_input_error());
    }

    Ok(format!("{}{}", prefix, digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn issued_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 2, 2, 10, 0, 0).unwrap()
    }

    fn challenge() -> OtpChallenge {
        OtpChallenge::new(
            "+919876543210".into(),
            Role::Rider,
            "0427".into(),
            issued_at(),
            Duration::minutes(5),
        )
    }

    #[test]
    fn accepts_issued_code_before_expiry() {
        assert!(challenge().verify("0427", issued_at() + Duration::minutes(4)).is_ok());
    }

    #[test]
    fn rejects_wrong_code() {
        assert!(challenge().verify("1234", issued_at()).is_err());
    }

    #[test]
    fn rejects_expired_code() {
        assert!(challenge().verify("0427", issued_at() + Duration::minutes(5)).is_err());
    }

    #[test]
    fn attempts_run_out() {
        let mut challenge = challenge();
        assert!(!challenge.attempts_exhausted());

        challenge.failed_attempts = MAX_OTP_ATTEMPTS;
        assert!(challenge.attempts_exhausted());
    }

    #[test]
    fn attempt_count_stays_server_side() {
        let json = serde_json::to_value(challenge()).unwrap();
        assert!(json.get("failed_attempts").is_none());
        assert_eq!(json["code"], "0427");
    }

    #[test]
    fn normalizes_phone_numbers() {
        assert_eq!(validate_phone(" +91 98765-43210 ").unwrap(), "+919876543210");
        assert_eq!(validate_phone("9876543210").unwrap(), "9876543210");
    }

    #[test]
    fn rejects_bad_phone_numbers() {
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("98765abc10").is_err());
        assert!(validate_phone("+1234567890123456").is_err());
    }
}
