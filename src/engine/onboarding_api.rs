use super::Engine;

use async_trait::async_trait;

use crate::{
    api::OnboardingAPI,
    auth::{validate_phone, OtpChallenge, Role, User},
    error::{invalid_input_error, unexpected_error, Error},
    simulation,
};

#[async_trait]
impl OnboardingAPI for Engine {
    #[tracing::instrument(skip(self))]
    async fn send_otp(&self, phone: String, role: Role) -> Result<OtpChallenge, Error> {
        let phone = validate_phone(&phone)?;
        let ttl = chrono::Duration::from_std(self.simulation.otp_ttl).map_err(|_| unexpected_error())?;

        let code = simulation::deliver_otp(
            &*self.clock,
            self.simulation.otp_delay,
            &self.shutdown,
            &phone,
        )
        .await?;

        let now = self.clock.now();
        let challenge = OtpChallenge::new(phone.clone(), role, code, now, ttl);

        let mut challenges = self.challenges.lock().await;
        challenges.retain(|_, pending| !pending.is_expired(now));

        // a fresh code replaces any earlier one for the same number
        challenges.insert(phone, challenge.clone());

        Ok(challenge)
    }

    #[tracing::instrument(skip(self, code))]
    async fn verify_otp(&self, phone: String, code: String) -> Result<User, Error> {
        let phone = validate_phone(&phone)?;
        let now = self.clock.now();

        let mut challenges = self.challenges.lock().await;

        let challenge = challenges.get_mut(&phone).ok_or_else(invalid_input_error)?;

        if challenge.is_expired(now) {
            tracing::info!("otp expired, discarding challenge");
            challenges.remove(&phone);
            return Err(invalid_input_error());
        }

        if let Err(err) = challenge.verify(&code, now) {
            challenge.failed_attempts += 1;

            if challenge.attempts_exhausted() {
                tracing::info!("too many wrong codes, discarding challenge");
                challenges.remove(&phone);
            }

            return Err(err);
        }

        let role = challenge.role;
        challenges.remove(&phone);

        let user = User::new(phone, role);

        tracing::info!(user_id = %user.id, "phone verified");

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MAX_OTP_ATTEMPTS;
    use crate::clock::{Clock, SteppingClock};
    use crate::config::Config;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;
    use std::time::Duration;

    fn engine() -> (Engine, Arc<SteppingClock>) {
        let clock = Arc::new(SteppingClock::new(
            Utc.with_ymd_and_hms(2024, 10, 1, 6, 0, 0).unwrap(),
        ));
        (Engine::new(&Config::default(), clock.clone()), clock)
    }

    #[tokio::test]
    async fn issued_code_verifies_once() {
        let (engine, _) = engine();

        let challenge = engine
            .send_otp("+91 98765 43210".into(), Role::Driver)
            .await
            .unwrap();
        assert_eq!(challenge.phone, "+919876543210");

        let user = engine
            .verify_otp("+919876543210".into(), challenge.code.clone())
            .await
            .unwrap();
        assert_eq!(user.phone, "+919876543210");
        assert_eq!(user.role, Role::Driver);

        let err = engine
            .verify_otp("+919876543210".into(), challenge.code)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input_error());
    }

    #[tokio::test]
    async fn wrong_code_keeps_challenge() {
        let (engine, _) = engine();

        let challenge = engine
            .send_otp("9876543210".into(), Role::Rider)
            .await
            .unwrap();
        let wrong = if challenge.code == "0000" { "1111" } else { "0000" };

        assert!(engine
            .verify_otp("9876543210".into(), wrong.into())
            .await
            .is_err());
        assert!(engine
            .verify_otp("9876543210".into(), challenge.code)
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn expired_code_is_rejected() {
        let (engine, clock) = engine();

        let challenge = engine
            .send_otp("9876543210".into(), Role::Rider)
            .await
            .unwrap();
        clock.advance(Duration::from_secs(301));

        let err = engine
            .verify_otp("9876543210".into(), challenge.code)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input_error());
    }

    #[tokio::test]
    async fn invalid_phone_is_rejected_before_sending() {
        let (engine, clock) = engine();
        let before = clock.now();

        let err = engine.send_otp("12".into(), Role::Rider).await.unwrap_err();

        assert!(err.is_invalid_input_error());
        assert_eq!(clock.now(), before);
    }

    #[tokio::test]
    async fn challenge_is_dropped_after_repeated_wrong_codes() {
        let (engine, _) = engine();

        let challenge = engine
            .send_otp("9876543210".into(), Role::Rider)
            .await
            .unwrap();
        let wrong = if challenge.code == "0000" { "1111" } else { "0000" };

        for _ in 0..MAX_OTP_ATTEMPTS {
            assert!(engine
                .verify_otp("9876543210".into(), wrong.into())
                .await
                .is_err());
        }

        let err = engine
            .verify_otp("9876543210".into(), challenge.code)
            .await
            .unwrap_err();
        assert!(err.is_invalid_input_error());
        assert!(engine.challenges.lock().await.is_empty());
    }

    #[tokio::test]
    async fn sending_prunes_expired_challenges() {
        let (engine, clock) = engine();

        engine
            .send_otp("9876543210".into(), Role::Rider)
            .await
            .unwrap();
        clock.advance(Duration::from_secs(301));

        engine
            .send_otp("9123456780".into(), Role::Driver)
            .await
            .unwrap();

        let challenges = engine.challenges.lock().await;
        assert_eq!(challenges.len(), 1);
        assert!(challenges.contains_key("9123456780"));
    }
}
