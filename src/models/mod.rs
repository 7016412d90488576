//! Data models shared across database access and API handlers.

pub mod account;
pub mod login_attempt;
pub mod otp;
pub mod password_reset;
pub mod reactivation;
pub mod session;
