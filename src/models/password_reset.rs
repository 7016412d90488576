//! Models for the secret-answer-gated password reset flow.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Daily reset quota, keyed by `(email, attempt_date)`. The day rollover is a
/// date comparison at read time, not a background job.
pub struct PasswordResetAttempt {
    pub email: String,
    pub attempt_date: NaiveDate,
    pub reset_attempts: i32,
    pub last_attempt_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload for resetting a password via the secret answer.
pub struct ResetPasswordRequest {
    pub email: String,
    pub password: String,
    #[serde(rename = "confirmPassword")]
    pub confirm_password: String,
    pub secret_answer: String,
}
