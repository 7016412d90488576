use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::account::AccountKey;
use crate::models::login_attempt::LoginAttemptRecord;

pub async fn find_by_account(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<Option<LoginAttemptRecord>, sqlx::Error> {
    sqlx::query_as::<_, LoginAttemptRecord>(
        r#"
        SELECT user_type, user_id, attempts, last_attempt, locked_until
        FROM login_attempts
        WHERE user_type = $1 AND user_id = $2
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .fetch_optional(exec)
    .await
}

/// Inserts on the first failure, otherwise increments. Returns the new count.
pub async fn record_failure(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    now: DateTime<Utc>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO login_attempts (user_type, user_id, attempts, last_attempt)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (user_type, user_id)
        DO UPDATE SET attempts = login_attempts.attempts + 1, last_attempt = $3
        RETURNING attempts
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub async fn set_locked_until(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    locked_until: DateTime<Utc>,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE login_attempts
        SET locked_until = $3
        WHERE user_type = $1 AND user_id = $2
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(locked_until)
    .execute(exec)
    .await
    .map(|_| ())
}

/// Clears the record entirely: successful login, lockout expiry, reset commit.
pub async fn clear(exec: impl PgExecutor<'_>, key: &AccountKey) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM login_attempts WHERE user_type = $1 AND user_id = $2")
        .bind(key.user_type)
        .bind(&key.user_id)
        .execute(exec)
        .await
        .map(|_| ())
}
