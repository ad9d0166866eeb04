use std::sync::Arc;

use crate::{config::ShareConfig, store::ShareStore};

/// Shared handle passed to every request handler and the sweep task. The
/// store is constructed once at startup; a fresh instance per test gives
/// isolated state.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<ShareStore>,
}

impl AppState {
    pub fn new(config: ShareConfig) -> Self {
        Self {
            store: Arc::new(ShareStore::new(config)),
        }
    }
}
