pub mod accounts;
pub mod lock_history;
pub mod login_attempts;
pub mod otp_requests;
pub mod password_reset_attempts;
pub mod reactivation_requests;
pub mod sessions;
