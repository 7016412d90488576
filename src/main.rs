use std::net::SocketAddr;
use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use propdesk_backend::config::Config;
use propdesk_backend::db::connection::create_pool;
use propdesk_backend::services::session::InMemorySessionStore;
use propdesk_backend::state::AppState;
use propdesk_backend::utils::email::EmailService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "propdesk_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::load()?;
    tracing::info!(
        database_url = %config.database_url,
        max_login_attempts = config.max_login_attempts,
        lockout_duration_minutes = config.lockout_duration_minutes,
        session_idle_timeout_seconds = config.session_idle_timeout_seconds,
        "Loaded configuration from environment/.env"
    );

    let pool = create_pool(&config.database_url).await?;
    sqlx::migrate!("./migrations").run(&pool).await?;

    let email = Arc::new(EmailService::new()?);
    let sessions = Arc::new(InMemorySessionStore::new());
    let state = AppState::new(pool, config, email, sessions);

    let app = propdesk_backend::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
