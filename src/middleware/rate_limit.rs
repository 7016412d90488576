//! Per-IP rate limiting on the public auth routes.
//!
//! Keyed by the client address, so it throttles the network source; the
//! per-identity quotas (reset/day, OTP/window, reactivation/day) live in the
//! services and are enforced independently of this layer.

use std::num::NonZeroU32;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use governor::{clock::DefaultClock, state::keyed::DefaultKeyedStateStore, Quota, RateLimiter};

use crate::error::AppError;
use crate::utils::http::client_ip;

pub type IpRateLimiter = RateLimiter<String, DefaultKeyedStateStore<String>, DefaultClock>;

pub fn build_ip_rate_limiter(requests_per_minute: u32) -> Arc<IpRateLimiter> {
    let burst = NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN);
    Arc::new(RateLimiter::keyed(Quota::per_minute(burst)))
}

pub async fn ip_rate_limit(
    State(limiter): State<Arc<IpRateLimiter>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key = client_ip(request.headers());
    if limiter.check_key(&key).is_err() {
        tracing::warn!(ip = %key, "request rate limited");
        return Err(AppError::RateLimited(
            "Too many requests. Try again shortly.".to_string(),
        ));
    }
    Ok(next.run(request).await)
}
