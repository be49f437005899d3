pub mod catalog;
pub mod dispatch;
pub mod onboarding;
pub mod payments;
pub mod rides;
