use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::account::AccountKey;
use crate::models::otp::{OtpRequest, OtpStatus};

const COLUMNS: &str = "id, user_type, user_id, email, otp_hash, status, expires_at, created_at, \
                       ip_address, usage_description";

/// Moves expired pending rows to `expired`. Runs at the start of generation
/// and of verification, which is what keeps "at most one live pending row per
/// account" true without a scheduler.
pub async fn sweep_expired(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    now: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE otp_requests
        SET status = 'expired'
        WHERE user_type = $1 AND user_id = $2 AND status = 'pending' AND expires_at <= $3
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(now)
    .execute(exec)
    .await?;
    Ok(result.rows_affected())
}

/// Generation requests inside the rate-limit window, any status.
pub async fn count_since(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    since: DateTime<Utc>,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM otp_requests
        WHERE user_type = $1 AND user_id = $2 AND created_at > $3
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(since)
    .fetch_one(exec)
    .await
}

/// Newest live pending row for the account, if any.
pub async fn find_active_pending(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    now: DateTime<Utc>,
) -> Result<Option<OtpRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM otp_requests \
         WHERE user_type = $1 AND user_id = $2 AND status = 'pending' AND expires_at > $3 \
         ORDER BY created_at DESC LIMIT 1"
    );
    sqlx::query_as::<_, OtpRequest>(&sql)
        .bind(key.user_type)
        .bind(&key.user_id)
        .bind(now)
        .fetch_optional(exec)
        .await
}

/// Newest live pending row matching the full `(user_type, user_id, email)`
/// triple, for verification.
pub async fn find_pending_for_verification(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    email: &str,
    now: DateTime<Utc>,
) -> Result<Option<OtpRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM otp_requests \
         WHERE user_type = $1 AND user_id = $2 AND email = $3 \
           AND status = 'pending' AND expires_at > $4 \
         ORDER BY created_at DESC LIMIT 1"
    );
    sqlx::query_as::<_, OtpRequest>(&sql)
        .bind(key.user_type)
        .bind(&key.user_id)
        .bind(email)
        .bind(now)
        .fetch_optional(exec)
        .await
}

pub async fn insert(exec: impl PgExecutor<'_>, row: &OtpRequest) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO otp_requests
            (id, user_type, user_id, email, otp_hash, status, expires_at, created_at,
             ip_address, usage_description)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&row.id)
    .bind(row.user_type)
    .bind(&row.user_id)
    .bind(&row.email)
    .bind(&row.otp_hash)
    .bind(row.status)
    .bind(row.expires_at)
    .bind(row.created_at)
    .bind(&row.ip_address)
    .bind(&row.usage_description)
    .execute(exec)
    .await
    .map(|_| ())
}

/// Transitions a row out of `pending`. The status guard makes the transition
/// single-shot even under concurrent verification attempts.
pub async fn transition_from_pending(
    exec: impl PgExecutor<'_>,
    id: &str,
    to: OtpStatus,
) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE otp_requests SET status = $2 WHERE id = $1 AND status = 'pending'")
            .bind(id)
            .bind(to)
            .execute(exec)
            .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn mark_email_failed(exec: impl PgExecutor<'_>, id: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE otp_requests SET status = 'email_failed' WHERE id = $1")
        .bind(id)
        .execute(exec)
        .await
        .map(|_| ())
}

/// Audit tag recording what a verified code was consumed for.
pub async fn tag_usage(
    exec: impl PgExecutor<'_>,
    id: &str,
    usage_description: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE otp_requests SET usage_description = $2 WHERE id = $1")
        .bind(id)
        .bind(usage_description)
        .execute(exec)
        .await
        .map(|_| ())
}
