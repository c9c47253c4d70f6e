pub mod cli;
pub mod config;
pub mod rest;
pub mod storage;

use std::sync::Arc;

use config::Config;
use storage::Storage;

/// Shared application state passed to every request handler.
///
/// Constructed once at startup; the storage layer is injected here rather
/// than reached through any global handle, so tests can run isolated
/// instances side by side.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<Config>,
    pub storage: Arc<Storage>,
}
