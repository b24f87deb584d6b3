use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::config::Config;
use crate::resource::ResourceClient;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: DatabaseConnection,
    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: DatabaseConnection, config: Config) -> Self {
        Self {
            db,
            config: Arc::new(config),
        }
    }

    /// Resource client over the shared pool
    pub fn client(&self) -> ResourceClient {
        ResourceClient::new(self.db.clone())
    }

    /// Requested page size, or the configured default, capped at the configured maximum
    pub fn page_size(&self, requested: Option<u64>) -> u64 {
        let console = &self.config.console;
        requested
            .filter(|size| *size > 0)
            .unwrap_or(console.page_size)
            .min(console.max_page_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_page_size_bounds() {
        let state = AppState::new(crate::testing::memory_db().await, Config::default());
        assert_eq!(state.page_size(None), 10);
        assert_eq!(state.page_size(Some(0)), 10);
        assert_eq!(state.page_size(Some(25)), 25);
        assert_eq!(state.page_size(Some(5000)), 100);
    }
}
