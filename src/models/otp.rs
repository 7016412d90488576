//! Models for one-time codes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::account::UserType;

/// Lifecycle of an OTP row. Rows are immutable once terminal; `Pending` is the
/// only state a code can be verified from, so a row is single-use both on a
/// correct and on a wrong guess.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OtpStatus {
    Pending,
    Verified,
    InvalidAttempt,
    Expired,
    EmailFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct OtpRequest {
    pub id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub email: String,
    /// Argon2 hash; the plaintext code is never stored.
    pub otp_hash: String,
    pub status: OtpStatus,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub ip_address: String,
    /// Audit tag describing what the verified code was consumed for.
    pub usage_description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
/// Payload for requesting a one-time code by email.
pub struct GenerateOtpRequest {
    pub email: String,
    pub user_type: UserType,
}
