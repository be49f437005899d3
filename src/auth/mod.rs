mod otp;
mod user;

pub use otp::{validate_phone, OtpChallenge, MAX_OTP_ATTEMPTS};
pub use user::{Role, User};
