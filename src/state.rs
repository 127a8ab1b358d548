//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the server config and the session table. All room state lives
//! inside `Sessions`; handlers reach it only through the write lock, which
//! makes each intent's mutate-then-broadcast step atomic.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::config::ServerConfig;
use crate::services::session::Sessions;

/// Shared application state, injected into Axum handlers via State extractor.
/// Clone is required by Axum; all inner fields are Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub sessions: Arc<RwLock<Sessions>>,
}

impl AppState {
    #[must_use]
    pub fn new(config: ServerConfig) -> Self {
        Self { config: Arc::new(config), sessions: Arc::new(RwLock::new(Sessions::new())) }
    }
}
