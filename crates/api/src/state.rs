use std::sync::Arc;

use logit_mail::EmailDispatcher;

use crate::config::ServerConfig;

/// State handed to every handler through `State<AppState>`. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub pool: logit_db::DbPool,
    /// Read-only after startup; holds the JWT secret and link base URLs.
    pub config: Arc<ServerConfig>,
    /// Fire-and-forget delivery of confirmation and reset emails.
    pub mailer: EmailDispatcher,
}
