use serde::{Deserialize, Serialize};
use std::env;

use crate::utils::cookies::SameSite;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database_url: String,
    /// Failed logins tolerated before the account locks.
    pub max_login_attempts: i32,
    /// How long a lockout lasts once triggered.
    pub lockout_duration_minutes: i64,
    /// Idle window after which a session is destroyed.
    pub session_idle_timeout_seconds: i64,
    /// Lifetime of a one-time code.
    pub otp_expiry_minutes: i64,
    /// OTP generations allowed per account inside the window below.
    pub otp_max_requests: i64,
    pub otp_window_minutes: i64,
    /// Seconds a caller must wait before a fresh code replaces a live one.
    pub otp_resend_wait_seconds: i64,
    /// Password reset attempts allowed per email per calendar day.
    pub reset_max_attempts_per_day: i32,
    /// Reactivation submissions allowed per account per calendar day.
    pub reactivation_max_requests_per_day: i64,
    /// Cooldown after a rejected reactivation request.
    pub reactivation_rejection_cooldown_hours: i64,
    pub cookie_secure: bool,
    pub cookie_same_site: SameSite,
    pub cors_allow_origins: Vec<String>,
    /// Requests per minute allowed per client IP on the public auth routes.
    pub rate_limit_ip_per_minute: u32,
}

impl Config {
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/propdesk".to_string());

        let cookie_same_site = match env::var("COOKIE_SAME_SITE").as_deref() {
            Ok("lax") => SameSite::Lax,
            Ok("none") => SameSite::None,
            _ => SameSite::Strict,
        };

        let cors_allow_origins = env::var("CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:8000".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        Ok(Config {
            database_url,
            max_login_attempts: env_i32("MAX_LOGIN_ATTEMPTS", 3),
            lockout_duration_minutes: env_i64("LOCKOUT_DURATION_MINUTES", 60),
            session_idle_timeout_seconds: env_i64("SESSION_IDLE_TIMEOUT_SECONDS", 1800),
            otp_expiry_minutes: env_i64("OTP_EXPIRY_MINUTES", 2),
            otp_max_requests: env_i64("OTP_MAX_REQUESTS", 3),
            otp_window_minutes: env_i64("OTP_WINDOW_MINUTES", 5),
            otp_resend_wait_seconds: env_i64("OTP_RESEND_WAIT_SECONDS", 30),
            reset_max_attempts_per_day: env_i32("RESET_MAX_ATTEMPTS_PER_DAY", 3),
            reactivation_max_requests_per_day: env_i64("REACTIVATION_MAX_REQUESTS_PER_DAY", 2),
            reactivation_rejection_cooldown_hours: env_i64(
                "REACTIVATION_REJECTION_COOLDOWN_HOURS",
                24,
            ),
            cookie_secure: env::var("COOKIE_SECURE").as_deref() == Ok("true"),
            cookie_same_site,
            cors_allow_origins,
            rate_limit_ip_per_minute: env_i64("RATE_LIMIT_IP_PER_MINUTE", 30) as u32,
        })
    }
}

fn env_i32(key: &str, default: i32) -> i32 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
