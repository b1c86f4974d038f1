//! Shared handler state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::google::GoogleClient;

/// Everything a request handler needs: config, the connection pool and the
/// optional Google OAuth client. Clones share one `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    google: Option<GoogleClient>,
}

impl AppState {
    /// Builds the state. The Google client exists only when credentials
    /// were configured; handlers treat its absence as "feature off".
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let google = config.google.as_ref().map(GoogleClient::new);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                google,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn google(&self) -> Option<&GoogleClient> {
        self.inner.google.as_ref()
    }
}
