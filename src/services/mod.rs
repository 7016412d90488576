pub mod lockout;
pub mod login;
pub mod otp;
pub mod password_reset;
pub mod reactivation;
pub mod session;
