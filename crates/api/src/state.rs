use std::sync::Arc;

use crate::config::ServerConfig;
use crate::engine::dispatcher::PluginDispatcher;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: inner data is behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: keystone_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Plugin trigger dispatcher and manual execution entry point.
    pub dispatcher: Arc<PluginDispatcher>,
}
