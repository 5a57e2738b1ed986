// ABOUTME: Shared application state for the ngxui HTTP server.
// ABOUTME: Holds the asset tree, credential validator and API backend, all immutable after startup.

use std::sync::Arc;

use ngxui_core::CredentialValidator;

use crate::api::ApiBackend;
use crate::assets::AssetTree;
use crate::config::DEFAULT_MAX_BODY_BYTES;

/// Shared application state accessible by all Axum handlers and middleware.
pub struct AppState {
    pub assets: AssetTree,
    pub validator: Arc<dyn CredentialValidator>,
    pub backend: Arc<dyn ApiBackend>,
    pub max_body_bytes: usize,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState with the default API body limit.
    pub fn new(
        assets: AssetTree,
        validator: Arc<dyn CredentialValidator>,
        backend: Arc<dyn ApiBackend>,
    ) -> Self {
        Self {
            assets,
            validator,
            backend,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, limit: usize) -> Self {
        self.max_body_bytes = limit;
        self
    }
}
