use std::sync::Arc;

use crate::{
    config::Config, db::connection::DbPool, services::session::SessionStore,
    utils::email::EmailService,
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub email: Arc<EmailService>,
    pub sessions: Arc<dyn SessionStore>,
}

impl AppState {
    pub fn new(
        pool: DbPool,
        config: Config,
        email: Arc<EmailService>,
        sessions: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            pool,
            config,
            email,
            sessions,
        }
    }
}
