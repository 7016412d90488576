//! Secret-answer password reset with a per-email daily quota.
//!
//! The precondition ladder runs in a fixed order and each step is a hard
//! stop. Rejections past the account-exists check count against the daily
//! quota, which gives a per-identity rate limit independent of any
//! network-level limiting.

use chrono::Utc;

use crate::error::AppError;
use crate::models::password_reset::ResetPasswordRequest;
use crate::repositories::{accounts, password_reset_attempts};
use crate::services::lockout;
use crate::state::AppState;
use crate::utils::password::{hash_password, verify_password};
use crate::validation::rules::{is_valid_email, password_strength_errors};

pub async fn reset_password(
    state: &AppState,
    payload: ResetPasswordRequest,
) -> Result<String, AppError> {
    let email = payload.email.trim().to_lowercase();
    let password = payload.password.as_str();
    let confirm_password = payload.confirm_password.as_str();
    let secret_answer = payload.secret_answer.trim();

    if email.is_empty() || password.is_empty() || confirm_password.is_empty()
        || secret_answer.is_empty()
    {
        return Err(AppError::BadRequest(
            "Email, password, confirmation and secret answer are required".to_string(),
        ));
    }
    if !is_valid_email(&email) {
        return Err(AppError::BadRequest(
            "A valid email address is required".to_string(),
        ));
    }

    let strength_errors = password_strength_errors(password);
    if !strength_errors.is_empty() {
        return Err(AppError::Validation(strength_errors));
    }
    if password != confirm_password {
        return Err(AppError::BadRequest(
            "Password confirmation does not match".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let used = password_reset_attempts::count_for_day(&state.pool, &email, today).await?;
    if used >= state.config.reset_max_attempts_per_day {
        return Err(AppError::RateLimited(
            "Daily password reset limit reached. Try again tomorrow.".to_string(),
        ));
    }

    // Generic wording: the caller cannot tell an unknown email from a typo.
    let account = accounts::find_by_login_identifier(&state.pool, &email)
        .await?
        .ok_or_else(|| {
            AppError::NotFound("No account matches the provided details".to_string())
        })?;
    let key = account.key();

    let lockout_status = lockout::check_lockout_status(state, &key).await?;
    if lockout_status.locked {
        let remaining = lockout_status
            .time_remaining
            .unwrap_or_else(|| "a while".to_string());
        return Err(AppError::Locked(format!(
            "Account is temporarily locked. Try again in {}.",
            remaining
        )));
    }

    // Both remaining rejections consume quota, so an attacker holding a valid
    // email cannot probe the secret answer or current password for free.
    if verify_password(password, &account.password_hash)
        .map_err(AppError::InternalServerError)?
    {
        count_attempt(state, &email).await;
        return Err(AppError::BadRequest(
            "The new password must differ from the current password".to_string(),
        ));
    }

    if !verify_password(secret_answer, &account.secret_answer_hash)
        .map_err(AppError::InternalServerError)?
    {
        count_attempt(state, &email).await;
        return Err(AppError::Unauthorized(
            "The secret answer is incorrect".to_string(),
        ));
    }

    let new_hash = hash_password(password).map_err(AppError::InternalServerError)?;

    let mut tx = state.pool.begin().await.map_err(AppError::from)?;
    let updated = accounts::update_password_hash(&mut *tx, &key, &new_hash).await?;
    if updated == 0 {
        return Err(AppError::Integrity(format!(
            "password update matched no row for {}",
            key
        )));
    }
    password_reset_attempts::clear_for_day(&mut *tx, &email, today).await?;
    lockout::clear_lockout(&mut *tx, &key).await?;
    tx.commit().await.map_err(AppError::from)?;

    if let Err(err) = state.email.send_password_changed_notification(&account.email) {
        tracing::warn!(account = %key, error = %err, "failed to send password change notice");
    }

    Ok("Password has been reset. You can sign in with the new password.".to_string())
}

/// Records one quota hit. Best-effort: the denial stands even if the counter
/// write fails.
async fn count_attempt(state: &AppState, email: &str) {
    let now = Utc::now();
    if let Err(err) =
        password_reset_attempts::record_attempt(&state.pool, email, now.date_naive(), now).await
    {
        tracing::warn!(email, error = %err, "failed to record reset attempt");
    }
}
