// ABOUTME: Configuration loading and validation for the ngxui server.
// ABOUTME: Reads NGXUI_* environment variables and rejects malformed addresses, URLs and limits.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Default cap on API request bodies forwarded to handlers.
pub const DEFAULT_MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("NGXUI_BIND is not a valid socket address: {0}")]
    InvalidBind(String),

    #[error("NGXUI_UPSTREAM_URL must start with http:// or https://: {0}")]
    InvalidUpstream(String),

    #[error("NGXUI_MAX_BODY_BYTES is not a positive integer: {0}")]
    InvalidBodyLimit(String),
}

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub home: PathBuf,
    pub bind: SocketAddr,
    pub database: PathBuf,
    pub assets_dir: Option<PathBuf>,
    pub upstream_url: Option<String>,
    pub auth_token: Option<String>,
    pub max_body_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - NGXUI_HOME: data directory (default: ~/.ngxui)
    /// - NGXUI_BIND: socket address to bind (default: 127.0.0.1:9000)
    /// - NGXUI_DATABASE: SQLite database holding auth_tokens (default: $NGXUI_HOME/database.db)
    /// - NGXUI_ASSETS_DIR: serve the frontend from this directory instead of the embedded bundle
    /// - NGXUI_UPSTREAM_URL: forward API handler calls to this base URL
    /// - NGXUI_AUTH_TOKEN: an extra token accepted by the auth gate
    /// - NGXUI_MAX_BODY_BYTES: API request body limit (default: 2 MiB)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        let home = var("NGXUI_HOME").map(PathBuf::from).unwrap_or_else(|| {
            var("HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("/tmp"))
                .join(".ngxui")
        });

        let bind_str = var("NGXUI_BIND").unwrap_or_else(|| "127.0.0.1:9000".to_string());
        let bind: SocketAddr = bind_str
            .parse()
            .map_err(|_| ConfigError::InvalidBind(bind_str))?;

        let database = var("NGXUI_DATABASE")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join("database.db"));

        let assets_dir = var("NGXUI_ASSETS_DIR").map(PathBuf::from);

        let upstream_url = match var("NGXUI_UPSTREAM_URL") {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => Some(url),
            Some(url) => return Err(ConfigError::InvalidUpstream(url)),
            None => None,
        };

        let auth_token = var("NGXUI_AUTH_TOKEN");

        let max_body_bytes = match var("NGXUI_MAX_BODY_BYTES") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ConfigError::InvalidBodyLimit(raw)),
            },
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            home,
            bind,
            database,
            assets_dir,
            upstream_url,
            auth_token,
            max_body_bytes,
        })
    }
}
