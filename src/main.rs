// ABOUTME: Entry point for the ngxui binary.
// ABOUTME: Parses CLI arguments, initializes tracing, wires validator/assets/backend, and starts the HTTP server.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ngxui_core::{CredentialValidator, StaticTokens, ValidatorChain};
use ngxui_server::{
    ApiBackend, AppState, AssetTree, ProxyBackend, ServerConfig, UnavailableBackend, create_router,
};
use ngxui_store::SqliteTokenStore;

#[derive(Debug, Parser)]
#[command(name = "ngxui", version, about = "Web entry layer for the Nginx UI manager")]
struct Cli {
    /// Socket address to listen on (overrides NGXUI_BIND)
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Serve the frontend from this directory instead of the embedded bundle (overrides NGXUI_ASSETS_DIR)
    #[arg(long)]
    assets_dir: Option<PathBuf>,

    /// SQLite database holding session tokens (overrides NGXUI_DATABASE)
    #[arg(long)]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new("ngxui=info,ngxui_server=info,tower_http=info")
            }),
        )
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env()?;
    if let Some(bind) = cli.bind {
        config.bind = bind;
    }
    if let Some(dir) = cli.assets_dir {
        config.assets_dir = Some(dir);
    }
    if let Some(db) = cli.database {
        config.database = db;
    }

    let assets = match &config.assets_dir {
        Some(dir) => {
            tracing::info!(path = %dir.display(), "serving frontend from directory");
            AssetTree::from_dir(dir)?
        }
        None => AssetTree::embedded()?,
    };

    if let Some(parent) = config.database.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteTokenStore::open(&config.database)
        .with_context(|| format!("opening token database {}", config.database.display()))?;

    let mut chain = ValidatorChain::new().with(Arc::new(store));
    if let Some(token) = &config.auth_token {
        chain = chain.with(Arc::new(StaticTokens::new([token.as_str()])));
    }
    let validator: Arc<dyn CredentialValidator> = Arc::new(chain);

    let backend: Arc<dyn ApiBackend> = match &config.upstream_url {
        Some(url) => {
            tracing::info!(upstream = %url, "forwarding api calls upstream");
            Arc::new(ProxyBackend::new(url.clone()))
        }
        None => {
            tracing::warn!("NGXUI_UPSTREAM_URL not set; api handlers will answer 501");
            Arc::new(UnavailableBackend)
        }
    };

    let state = Arc::new(
        AppState::new(assets, validator, backend).with_max_body_bytes(config.max_body_bytes),
    );
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;
    tracing::info!("ngxui listening on http://{}", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("ngxui stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => tracing::error!("failed to listen for SIGTERM: {}", e),
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
