use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgExecutor;

/// Attempts already consumed today. Rows for earlier dates are simply ignored
/// by the key, so the quota resets on day rollover without a sweep job.
pub async fn count_for_day(
    exec: impl PgExecutor<'_>,
    email: &str,
    day: NaiveDate,
) -> Result<i32, sqlx::Error> {
    let count: Option<i32> = sqlx::query_scalar(
        "SELECT reset_attempts FROM password_reset_attempts WHERE email = $1 AND attempt_date = $2",
    )
    .bind(email)
    .bind(day)
    .fetch_optional(exec)
    .await?;
    Ok(count.unwrap_or(0))
}

/// Read-then-increment collapsed into one atomic upsert so concurrent
/// rejections from the same identity cannot lose updates.
pub async fn record_attempt(
    exec: impl PgExecutor<'_>,
    email: &str,
    day: NaiveDate,
    now: DateTime<Utc>,
) -> Result<i32, sqlx::Error> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO password_reset_attempts (email, attempt_date, reset_attempts, last_attempt_at)
        VALUES ($1, $2, 1, $3)
        ON CONFLICT (email, attempt_date)
        DO UPDATE SET reset_attempts = password_reset_attempts.reset_attempts + 1,
                      last_attempt_at = $3
        RETURNING reset_attempts
        "#,
    )
    .bind(email)
    .bind(day)
    .bind(now)
    .fetch_one(exec)
    .await
}

pub async fn clear_for_day(
    exec: impl PgExecutor<'_>,
    email: &str,
    day: NaiveDate,
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM password_reset_attempts WHERE email = $1 AND attempt_date = $2")
        .bind(email)
        .bind(day)
        .execute(exec)
        .await
        .map(|_| ())
}
