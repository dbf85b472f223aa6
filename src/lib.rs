pub mod config;
pub mod error;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::Config;
use storage::TaskStore;

/// Shared application state passed to every request handler.
///
/// The store handle is injected at startup; handlers never reach for global
/// connection state.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub store: Arc<dyn TaskStore>,
    pub started_at: std::time::Instant,
}
