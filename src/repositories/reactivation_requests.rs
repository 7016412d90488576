use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{PgExecutor, PgPool};

use crate::models::account::AccountKey;
use crate::models::reactivation::{ReactivationRequest, ReactivationStatus};

const COLUMNS: &str = "request_id, user_type, user_id, email, otp_request_id, request_reason, \
                       status, reviewed_by, review_notes, rejection_reason, review_timestamp, \
                       request_ip, request_user_agent, created_at";

/// Submissions today, for the daily cap. Expired requests never consumed a
/// reviewer's attention, so they do not count.
pub async fn count_for_day(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    day: NaiveDate,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM account_reactivation_requests
        WHERE user_type = $1 AND user_id = $2 AND created_at::date = $3
          AND status IN ('pending', 'approved', 'rejected')
        "#,
    )
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(day)
    .fetch_one(exec)
    .await
}

pub async fn find_pending(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<Option<ReactivationRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM account_reactivation_requests \
         WHERE user_type = $1 AND user_id = $2 AND status = 'pending' \
         ORDER BY created_at DESC LIMIT 1"
    );
    sqlx::query_as::<_, ReactivationRequest>(&sql)
        .bind(key.user_type)
        .bind(&key.user_id)
        .fetch_optional(exec)
        .await
}

pub async fn find_latest_rejected(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<Option<ReactivationRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM account_reactivation_requests \
         WHERE user_type = $1 AND user_id = $2 AND status = 'rejected' \
         ORDER BY created_at DESC LIMIT 1"
    );
    sqlx::query_as::<_, ReactivationRequest>(&sql)
        .bind(key.user_type)
        .bind(&key.user_id)
        .fetch_optional(exec)
        .await
}

pub async fn insert(
    exec: impl PgExecutor<'_>,
    row: &ReactivationRequest,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO account_reactivation_requests
            (request_id, user_type, user_id, email, otp_request_id, request_reason, status,
             request_ip, request_user_agent, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(&row.request_id)
    .bind(row.user_type)
    .bind(&row.user_id)
    .bind(&row.email)
    .bind(&row.otp_request_id)
    .bind(&row.request_reason)
    .bind(row.status)
    .bind(&row.request_ip)
    .bind(&row.request_user_agent)
    .bind(row.created_at)
    .execute(exec)
    .await
    .map(|_| ())
}

/// Locks the row for the duration of the review transaction. The row lock
/// plus the pending-status guard is what makes review single-shot.
pub async fn find_for_update(
    exec: impl PgExecutor<'_>,
    request_id: &str,
) -> Result<Option<ReactivationRequest>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM account_reactivation_requests WHERE request_id = $1 FOR UPDATE"
    );
    sqlx::query_as::<_, ReactivationRequest>(&sql)
        .bind(request_id)
        .fetch_optional(exec)
        .await
}

pub async fn update_review(
    exec: impl PgExecutor<'_>,
    request_id: &str,
    status: ReactivationStatus,
    reviewed_by: &str,
    review_notes: Option<&str>,
    rejection_reason: Option<&str>,
    review_timestamp: DateTime<Utc>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE account_reactivation_requests
        SET status = $2, reviewed_by = $3, review_notes = $4, rejection_reason = $5,
            review_timestamp = $6
        WHERE request_id = $1
        "#,
    )
    .bind(request_id)
    .bind(status)
    .bind(reviewed_by)
    .bind(review_notes)
    .bind(rejection_reason)
    .bind(review_timestamp)
    .execute(exec)
    .await?;
    Ok(result.rows_affected())
}

/// Review-screen listing, pending first, newest within each status.
pub async fn list(
    pool: &PgPool,
    status: Option<ReactivationStatus>,
    limit: i64,
    offset: i64,
) -> Result<Vec<ReactivationRequest>, sqlx::Error> {
    match status {
        Some(status) => {
            let sql = format!(
                "SELECT {COLUMNS} FROM account_reactivation_requests WHERE status = $1 \
                 ORDER BY created_at DESC LIMIT $2 OFFSET $3"
            );
            sqlx::query_as::<_, ReactivationRequest>(&sql)
                .bind(status)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        }
        None => {
            let sql = format!(
                "SELECT {COLUMNS} FROM account_reactivation_requests \
                 ORDER BY (status = 'pending') DESC, created_at DESC LIMIT $1 OFFSET $2"
            );
            sqlx::query_as::<_, ReactivationRequest>(&sql)
                .bind(limit)
                .bind(offset)
                .fetch_all(pool)
                .await
        }
    }
}
