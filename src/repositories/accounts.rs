//! Read/flip access to the four role-specific account tables.
//!
//! Table and id-column names come from the closed [`UserType`] enum, so the
//! four-way polymorphism of the account populations never goes through
//! runtime string maps.

use sqlx::{PgExecutor, PgPool};

use crate::models::account::{Account, AccountKey, UserType};

fn select_columns(user_type: UserType) -> String {
    format!(
        "SELECT '{ut}'::text AS user_type, {id} AS user_id, firstname, lastname, email, phone, \
         role, status, is_blocked, password_hash, secret_answer_hash FROM {table}",
        ut = user_type.as_str(),
        id = user_type.id_column(),
        table = user_type.table(),
    )
}

/// Looks up an account by email or phone, scanning the account tables in enum
/// order. Used by login, where the identifier does not say which population
/// the caller belongs to.
pub async fn find_by_login_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<Account>, sqlx::Error> {
    for user_type in UserType::ALL {
        let sql = format!(
            "{} WHERE email = $1 OR phone = $1",
            select_columns(user_type)
        );
        let account = sqlx::query_as::<_, Account>(&sql)
            .bind(identifier)
            .fetch_optional(pool)
            .await?;
        if account.is_some() {
            return Ok(account);
        }
    }
    Ok(None)
}

pub async fn find_by_email(
    exec: impl PgExecutor<'_>,
    user_type: UserType,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    let sql = format!("{} WHERE email = $1", select_columns(user_type));
    sqlx::query_as::<_, Account>(&sql)
        .bind(email)
        .fetch_optional(exec)
        .await
}

pub async fn update_password_hash(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "UPDATE {table} SET password_hash = $1, updated_at = NOW() WHERE {id} = $2",
        table = key.user_type.table(),
        id = key.user_type.id_column(),
    );
    let result = sqlx::query(&sql)
        .bind(password_hash)
        .bind(&key.user_id)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}

/// Flips an account to active, matching id and email together so a stale or
/// reused id pointing at a different email cannot be activated. Returns the
/// rows affected; the caller must treat zero as an integrity failure.
pub async fn activate_account(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
    email: &str,
) -> Result<u64, sqlx::Error> {
    let sql = format!(
        "UPDATE {table} SET status = 'active', updated_at = NOW() \
         WHERE {id} = $1 AND email = $2",
        table = key.user_type.table(),
        id = key.user_type.id_column(),
    );
    let result = sqlx::query(&sql)
        .bind(&key.user_id)
        .bind(email)
        .execute(exec)
        .await?;
    Ok(result.rows_affected())
}

/// Serializes writers touching one account's rate-limit state. The lock is
/// transaction-scoped and released automatically at commit or rollback.
pub async fn lock_account(
    exec: impl PgExecutor<'_>,
    key: &AccountKey,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1::text || ':' || $2::text, 0))")
        .bind(key.user_type)
        .bind(&key.user_id)
        .execute(exec)
        .await
        .map(|_| ())
}

/// Recipients for reactivation-pending notifications.
pub async fn list_super_admin_emails(pool: &PgPool) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT email FROM admins WHERE role = 'super_admin' AND status = 'active'",
    )
    .fetch_all(pool)
    .await
}
