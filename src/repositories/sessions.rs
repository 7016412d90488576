use chrono::{DateTime, Utc};
use sqlx::PgExecutor;

use crate::models::account::AccountKey;
use crate::models::session::SessionRecord;

const COLUMNS: &str = "id, user_type, user_id, session_token_hash, login_time, ip_address, \
                       user_agent, status, logged_out_at";

pub async fn find_by_account(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<Option<SessionRecord>, sqlx::Error> {
    let sql = format!(
        "SELECT {COLUMNS} FROM active_sessions WHERE user_type = $1 AND user_id = $2"
    );
    sqlx::query_as::<_, SessionRecord>(&sql)
        .bind(key.user_type)
        .bind(&key.user_id)
        .fetch_optional(exec)
        .await
}

pub async fn insert(
    exec: impl PgExecutor<'_>,
    record: &SessionRecord,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO active_sessions
            (id, user_type, user_id, session_token_hash, login_time, ip_address, user_agent, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(&record.id)
    .bind(record.user_type)
    .bind(&record.user_id)
    .bind(&record.session_token_hash)
    .bind(record.login_time)
    .bind(&record.ip_address)
    .bind(&record.user_agent)
    .bind(record.status)
    .execute(exec)
    .await
    .map(|_| ())
}

pub async fn delete_by_account(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM active_sessions WHERE user_type = $1 AND user_id = $2")
            .bind(key.user_type)
            .bind(&key.user_id)
            .execute(exec)
            .await?;
    Ok(result.rows_affected())
}

/// Flips the row to inactive on logout or idle timeout. Returns whether a row
/// was still active for that token.
pub async fn mark_logged_out(
    exec: impl PgExecutor<'_>,
    session_token_hash: &str,
    logged_out_at: DateTime<Utc>,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE active_sessions
        SET status = 'inactive', logged_out_at = $2
        WHERE session_token_hash = $1 AND status = 'active'
        "#,
    )
    .bind(session_token_hash)
    .bind(logged_out_at)
    .execute(exec)
    .await?;
    Ok(result.rows_affected() > 0)
}
