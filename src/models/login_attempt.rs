//! Models for failed-login bookkeeping and the lock audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::account::UserType;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// One row per account. Created on the first failed attempt, incremented on
/// every failure, cleared on successful login or lockout expiry.
pub struct LoginAttemptRecord {
    pub user_type: UserType,
    pub user_id: String,
    pub attempts: i32,
    pub last_attempt: DateTime<Utc>,
    /// Set only once `attempts` reaches the configured maximum.
    pub locked_until: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum LockEvent {
    Locked,
    Unlocked,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Append-only audit row for every lock/unlock transition.
pub struct LockHistoryEntry {
    pub id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub event: LockEvent,
    /// Who caused the transition: "system" for automatic ones.
    pub actor: String,
    pub reason: String,
    /// How the transition happened, e.g. "Failed login threshold" or
    /// "System auto-unlock".
    pub method: String,
    pub created_at: DateTime<Utc>,
}

/// Result of a lockout check, normalized on read.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct LockoutStatus {
    pub locked: bool,
    pub attempts: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_remaining: Option<String>,
}

impl LockoutStatus {
    pub fn clear() -> Self {
        Self {
            locked: false,
            attempts: 0,
            time_remaining: None,
        }
    }
}
