//! Login state machine.
//!
//! Validate input, find the account, check its status, check the lockout,
//! verify the password, then replace any existing session with a fresh one.
//! Each step short-circuits with the error the client should see; the
//! orchestrator never advances past a failed step.

use crate::error::AppError;
use crate::models::account::{Account, LoginRequest, LoginUserData};
use crate::repositories::accounts;
use crate::services::{lockout, session};
use crate::state::AppState;
use crate::utils::password::{hash_password, needs_rehash, verify_password};

/// Wording shared by the no-such-account and wrong-password denials, so the
/// response does not reveal which identities exist.
const INVALID_CREDENTIALS: &str = "Invalid credentials";

pub struct LoginSuccess {
    pub session_token: String,
    pub user: LoginUserData,
}

pub async fn login(
    state: &AppState,
    payload: LoginRequest,
    ip_address: &str,
    user_agent: &str,
) -> Result<LoginSuccess, AppError> {
    // Input validation: nothing below runs on empty credentials.
    let username = payload.username.trim();
    let password = payload.password.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_string(),
        ));
    }

    // Lookup by email or phone across the account populations.
    let account = accounts::find_by_login_identifier(&state.pool, username)
        .await?
        .ok_or_else(|| AppError::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

    // Account status gates before any credential work.
    if account.is_blocked {
        return Err(AppError::Forbidden(
            "This account has been blocked. Contact an administrator.".to_string(),
        ));
    }
    if !account.is_active() {
        return Err(AppError::Forbidden(
            "This account has been deactivated. You may request reactivation.".to_string(),
        ));
    }

    // Lockout is read before the password is touched: a locked account never
    // reaches hash comparison, so the response leaks no timing signal about
    // password correctness while locked.
    let lockout_status = lockout::check_lockout_status(state, &account.key()).await?;
    if lockout_status.locked {
        let remaining = lockout_status
            .time_remaining
            .unwrap_or_else(|| "a while".to_string());
        return Err(AppError::Locked(format!(
            "Account is temporarily locked. Try again in {}.",
            remaining
        )));
    }

    if !verify_password(password, &account.password_hash)
        .map_err(AppError::InternalServerError)?
    {
        // Bookkeeping failures must not mask the denial itself.
        let message = match lockout::handle_failed_login(state, &account).await {
            Ok(message) => message,
            Err(err) => {
                tracing::error!(account = %account.key(), "failed login bookkeeping error: {:?}", err);
                INVALID_CREDENTIALS.to_string()
            }
        };
        return Err(AppError::Unauthorized(message));
    }

    maybe_rehash_password(state, &account, password).await;

    // Destroy-then-create; a create failure means the login did not happen.
    session::destroy_existing_session(state, &account.key()).await;
    let session_token = session::create_new_session(state, &account, ip_address, user_agent).await?;

    Ok(LoginSuccess {
        session_token,
        user: LoginUserData {
            user_id: account.user_id.clone(),
            firstname: account.firstname.clone(),
            lastname: account.lastname.clone(),
            role: account.role.clone(),
        },
    })
}

/// Upgrades stale hash parameters after a successful verification.
/// Best-effort: a failure here never fails the login.
async fn maybe_rehash_password(state: &AppState, account: &Account, password: &str) {
    if !needs_rehash(&account.password_hash) {
        return;
    }
    let new_hash = match hash_password(password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::warn!(account = %account.key(), error = %err, "rehash-on-login failed to hash");
            return;
        }
    };
    if let Err(err) =
        accounts::update_password_hash(&state.pool, &account.key(), &new_hash).await
    {
        tracing::warn!(account = %account.key(), error = %err, "rehash-on-login failed to persist");
    }
}
