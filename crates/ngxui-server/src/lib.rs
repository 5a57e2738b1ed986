// ABOUTME: HTTP entry layer for ngxui: auth gate, static asset serving with SPA fallback, and API routing.
// ABOUTME: Uses Axum with an immutable shared state; API handlers are reached through the ApiBackend seam.

pub mod api;
pub mod app_state;
pub mod assets;
pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod spa;

pub use api::{ApiBackend, ApiCall, ProxyBackend, UnavailableBackend};
pub use app_state::{AppState, SharedState};
pub use assets::AssetTree;
pub use auth::{AuthLayer, Authenticated};
pub use config::ServerConfig;
pub use error::ApiError;
pub use routes::create_router;
