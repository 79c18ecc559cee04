use std::sync::Arc;

use market_core::storage::FileStore;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; everything heavy sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: market_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Storage for uploaded images.
    pub files: Arc<dyn FileStore>,
}
