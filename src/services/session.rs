//! Session manager: issues and destroys the single active session an account
//! may hold, and owns the server-side session store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::account::{Account, AccountKey};
use crate::models::session::{SessionData, SessionRecord, SessionStatus};
use crate::repositories::{login_attempts, sessions};
use crate::state::AppState;
use crate::utils::security::{generate_session_token, hash_token};

/// Server-side store keyed by the SHA-256 of the session token, matching the
/// database rows so one key works against both. The plaintext token only ever
/// travels in the cookie.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, token_hash: &str) -> Option<SessionData>;
    async fn insert(&self, token_hash: String, data: SessionData);
    async fn remove(&self, token_hash: &str) -> bool;
    /// Bumps `last_activity`; returns false when the key is unknown.
    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> bool;
}

#[derive(Default)]
pub struct InMemorySessionStore {
    inner: RwLock<HashMap<String, SessionData>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, token_hash: &str) -> Option<SessionData> {
        self.inner.read().await.get(token_hash).cloned()
    }

    async fn insert(&self, token_hash: String, data: SessionData) {
        self.inner.write().await.insert(token_hash, data);
    }

    async fn remove(&self, token_hash: &str) -> bool {
        self.inner.write().await.remove(token_hash).is_some()
    }

    async fn touch(&self, token_hash: &str, at: DateTime<Utc>) -> bool {
        match self.inner.write().await.get_mut(token_hash) {
            Some(data) => {
                data.last_activity = at;
                true
            }
            None => false,
        }
    }
}

/// Invalidates whatever session the account currently holds. Best-effort by
/// policy: a failure is logged and login proceeds; the destroy-before-create
/// transaction in [`create_new_session`] still enforces the invariant.
pub async fn destroy_existing_session(state: &AppState, key: &AccountKey) -> bool {
    let existing = match sessions::find_by_account(&state.pool, key).await {
        Ok(existing) => existing,
        Err(err) => {
            tracing::warn!(account = %key, error = %err, "failed to look up existing session");
            return false;
        }
    };
    let Some(record) = existing else {
        return true;
    };

    state.sessions.remove(&record.session_token_hash).await;

    match sessions::delete_by_account(&state.pool, key).await {
        Ok(_) => true,
        Err(err) => {
            tracing::warn!(account = %key, error = %err, "failed to delete session record");
            false
        }
    }
}

/// Issues a fresh unpredictable session identifier, replaces any previous
/// session row inside one transaction, resets the lockout counters and
/// populates the store. Returns the plaintext token for the cookie.
pub async fn create_new_session(
    state: &AppState,
    account: &Account,
    ip_address: &str,
    user_agent: &str,
) -> Result<String, AppError> {
    let key = account.key();

    // Session fixation defense: a brand new identifier at every login.
    let token = generate_session_token();
    let token_hash = hash_token(&token);
    let now = Utc::now();

    let record = SessionRecord {
        id: uuid::Uuid::new_v4().to_string(),
        user_type: key.user_type,
        user_id: key.user_id.clone(),
        session_token_hash: token_hash.clone(),
        login_time: now,
        ip_address: ip_address.to_string(),
        user_agent: user_agent.to_string(),
        status: SessionStatus::Active,
        logged_out_at: None,
    };

    // Destroy-then-create is atomic relative to concurrent logins for the
    // same account; the UNIQUE (user_type, user_id) constraint backs it up.
    let mut tx = state.pool.begin().await.map_err(AppError::from)?;
    sessions::delete_by_account(&mut *tx, &key).await?;
    sessions::insert(&mut *tx, &record).await?;
    login_attempts::clear(&mut *tx, &key).await?;
    tx.commit().await.map_err(AppError::from)?;

    let data = SessionData::from_account(account, ip_address.to_string(), user_agent.to_string());
    state.sessions.insert(token_hash, data).await;

    Ok(token)
}

/// Logs the session out: flips the DB row, removes the store entry.
pub async fn logout(state: &AppState, token: &str) -> Result<DateTime<Utc>, AppError> {
    let token_hash = hash_token(token);
    let logged_out_at = Utc::now();
    sessions::mark_logged_out(&state.pool, &token_hash, logged_out_at).await?;
    state.sessions.remove(&token_hash).await;
    Ok(logged_out_at)
}

/// Destroys an idle session found by the middleware. Best-effort on the DB
/// side; the store removal is what actually ends the session.
pub async fn expire_idle_session(state: &AppState, token_hash: &str) {
    state.sessions.remove(token_hash).await;
    if let Err(err) = sessions::mark_logged_out(&state.pool, token_hash, Utc::now()).await {
        tracing::warn!(error = %err, "failed to mark idle session as logged out");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::account::UserType;

    fn sample_data() -> SessionData {
        SessionData {
            account: AccountKey {
                user_type: UserType::Admin,
                user_id: "ADM-1".into(),
            },
            firstname: "Ada".into(),
            lastname: "Admin".into(),
            role: "super_admin".into(),
            secret_answer_hash: "hash".into(),
            ip_address: "127.0.0.1".into(),
            user_agent: "tests".into(),
            created_at: Utc::now(),
            last_activity: Utc::now(),
        }
    }

    #[tokio::test]
    async fn store_insert_get_remove_roundtrip() {
        let store = InMemorySessionStore::new();
        store.insert("tok".into(), sample_data()).await;

        let data = store.get("tok").await.expect("session present");
        assert_eq!(data.account.user_id, "ADM-1");
        assert!(data.is_super_admin());

        assert!(store.remove("tok").await);
        assert!(store.get("tok").await.is_none());
        assert!(!store.remove("tok").await);
    }

    #[tokio::test]
    async fn touch_updates_last_activity() {
        let store = InMemorySessionStore::new();
        store.insert("tok".into(), sample_data()).await;

        let later = Utc::now() + chrono::Duration::minutes(5);
        assert!(store.touch("tok", later).await);
        let data = store.get("tok").await.unwrap();
        assert_eq!(data.last_activity, later);

        assert!(!store.touch("unknown", later).await);
    }
}
