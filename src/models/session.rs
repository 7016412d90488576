//! Models for the single-active-session-per-account invariant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::models::account::{Account, AccountKey, UserType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
/// Database record of a login session. At most one row exists per account;
/// creating a new session destroys the previous row in the same transaction.
pub struct SessionRecord {
    pub id: String,
    pub user_type: UserType,
    pub user_id: String,
    /// SHA-256 of the session token. The plaintext token lives only in the
    /// cookie and the in-process session store.
    pub session_token_hash: String,
    pub login_time: DateTime<Utc>,
    pub ip_address: String,
    pub user_agent: String,
    pub status: SessionStatus,
    pub logged_out_at: Option<DateTime<Utc>>,
}

/// Server-side session state held by the session store and threaded through
/// the request as an explicit context, never ambient global state.
#[derive(Debug, Clone)]
pub struct SessionData {
    pub account: AccountKey,
    pub firstname: String,
    pub lastname: String,
    pub role: String,
    /// Hash of the secret answer, kept for lightweight re-auth challenges.
    pub secret_answer_hash: String,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl SessionData {
    pub fn from_account(account: &Account, ip_address: String, user_agent: String) -> Self {
        let now = Utc::now();
        Self {
            account: account.key(),
            firstname: account.firstname.clone(),
            lastname: account.lastname.clone(),
            role: account.role.clone(),
            secret_answer_hash: account.secret_answer_hash.clone(),
            ip_address,
            user_agent,
            created_at: now,
            last_activity: now,
        }
    }

    pub fn is_super_admin(&self) -> bool {
        self.role == "super_admin"
    }
}

/// Request-scoped identity inserted by the session middleware.
#[derive(Debug, Clone)]
pub struct SessionContext {
    pub session_token: String,
    pub data: SessionData,
}
