use std::sync::Arc;

use chronicle_core::engine::WikiEngine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct AppState {
    /// Versioning engine over the configured article store.
    pub engine: WikiEngine,
    /// Server configuration (read by the auth extractor).
    pub config: Arc<ServerConfig>,
}
