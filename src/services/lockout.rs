//! Lockout tracker: failed-attempt counting and lock/unlock transitions.
//!
//! All time-based transitions are evaluated lazily at read time; there is no
//! sweep job. [`check_lockout_status`] is the single normalize-on-read point
//! for lockout expiry.

use chrono::{Duration, Utc};

use crate::error::AppError;
use crate::models::account::{Account, AccountKey};
use crate::models::login_attempt::{LockEvent, LockoutStatus};
use crate::repositories::{lock_history, login_attempts};
use crate::state::AppState;
use crate::utils::time::format_remaining;

/// Reads the attempt record and normalizes it against the clock. An expired
/// lock is cleared here (attempts reset, `unlocked` audit row appended) so
/// every caller observes the same post-expiry state.
pub async fn check_lockout_status(
    state: &AppState,
    key: &AccountKey,
) -> Result<LockoutStatus, AppError> {
    let record = match login_attempts::find_by_account(&state.pool, key).await? {
        Some(record) => record,
        None => return Ok(LockoutStatus::clear()),
    };

    let now = Utc::now();
    if let Some(locked_until) = record.locked_until {
        if record.attempts >= state.config.max_login_attempts {
            if locked_until > now {
                return Ok(LockoutStatus {
                    locked: true,
                    attempts: record.attempts,
                    time_remaining: Some(format_remaining(locked_until, now)),
                });
            }

            // Lock has expired: clear counters and audit the auto-unlock.
            let mut tx = state.pool.begin().await.map_err(AppError::from)?;
            login_attempts::clear(&mut *tx, key).await?;
            lock_history::append(
                &mut *tx,
                key,
                LockEvent::Unlocked,
                "system",
                "Lockout period elapsed",
                "System auto-unlock",
            )
            .await?;
            tx.commit().await.map_err(AppError::from)?;
            return Ok(LockoutStatus::clear());
        }
    }

    Ok(LockoutStatus {
        locked: false,
        attempts: record.attempts,
        time_remaining: None,
    })
}

/// Transactionally records one more failed attempt. Reaching the threshold
/// sets `locked_until`, appends a `locked` audit row and notifies the account
/// holder (best-effort). Returns the message the login denial should carry.
pub async fn handle_failed_login(
    state: &AppState,
    account: &Account,
) -> Result<String, AppError> {
    let key = account.key();
    let now = Utc::now();
    let max_attempts = state.config.max_login_attempts;
    let lockout_minutes = state.config.lockout_duration_minutes;

    let mut tx = state.pool.begin().await.map_err(AppError::from)?;
    let attempts = login_attempts::record_failure(&mut *tx, &key, now).await?;

    let message = if attempts >= max_attempts {
        let locked_until = now + Duration::minutes(lockout_minutes);
        login_attempts::set_locked_until(&mut *tx, &key, locked_until).await?;
        lock_history::append(
            &mut *tx,
            &key,
            LockEvent::Locked,
            "system",
            &format!("{} consecutive failed login attempts", attempts),
            "Failed login threshold",
        )
        .await?;
        format!(
            "Account locked due to too many failed attempts. Try again in {} minute(s).",
            lockout_minutes
        )
    } else {
        format!(
            "Invalid credentials. {} attempt(s) remaining before lockout.",
            max_attempts - attempts
        )
    };
    tx.commit().await.map_err(AppError::from)?;

    if attempts >= max_attempts {
        if let Err(err) = state
            .email
            .send_lockout_notice(&account.email, lockout_minutes)
        {
            tracing::warn!(account = %key, error = %err, "failed to send lockout notice");
        }
    }

    Ok(message)
}

/// Clears lockout state outside of login, e.g. when a password reset commits.
pub async fn clear_lockout(
    exec: impl sqlx::PgExecutor<'_>,
    key: &AccountKey,
) -> Result<(), AppError> {
    login_attempts::clear(exec, key).await?;
    Ok(())
}
