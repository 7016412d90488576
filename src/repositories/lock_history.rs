use chrono::Utc;
use sqlx::PgExecutor;
use uuid::Uuid;

use crate::models::account::AccountKey;
use crate::models::login_attempt::LockEvent;

/// Appends one audit row. The table is write-only from the core's
/// perspective; nothing in this crate reads it back outside of tests.
pub async fn append(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    event: LockEvent,
    actor: &str,
    reason: &str,
    method: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO lock_history (id, user_type, user_id, event, actor, reason, method, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(key.user_type)
    .bind(&key.user_id)
    .bind(event)
    .bind(actor)
    .bind(reason)
    .bind(method)
    .bind(Utc::now())
    .execute(exec)
    .await
    .map(|_| ())
}
