pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;
pub mod validation;

use axum::{
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// Assembles the full router. Public auth routes sit behind the per-IP rate
/// limiter; everything else requires a session, and the review routes require
/// a super admin on top.
pub fn app(state: AppState) -> Router {
    let limiter =
        middleware::rate_limit::build_ip_rate_limiter(state.config.rate_limit_ip_per_minute);

    let public_routes = Router::new()
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/password/reset",
            post(handlers::password_reset::reset_password),
        )
        .route("/api/otp/generate", post(handlers::reactivation::generate_otp))
        .route(
            "/api/reactivation/submit",
            post(handlers::reactivation::submit),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            limiter,
            middleware::rate_limit::ip_rate_limit,
        ));

    let session_routes = Router::new()
        .route("/api/auth/logout", post(handlers::auth::logout))
        .route("/api/auth/me", get(handlers::auth::me))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::session_auth,
        ));

    let admin_routes = Router::new()
        .route(
            "/api/admin/reactivation",
            get(handlers::admin::list_reactivation_requests),
        )
        .route(
            "/api/admin/reactivation/review",
            post(handlers::admin::review_reactivation),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::session::super_admin_auth,
        ));

    Router::new()
        .merge(public_routes)
        .merge(session_routes)
        .merge(admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui")
                .url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(axum_middleware::from_fn(middleware::request_id::request_id))
                .layer(TraceLayer::new_for_http())
                .layer(build_cors(&state.config)),
        )
        .with_state(state)
}

/// CORS restricted to the configured origins; credentials must be allowed for
/// the session cookie, which rules out a wildcard origin.
fn build_cors(config: &config::Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(60 * 60))
}
