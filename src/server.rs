use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::{self, AppState};
use crate::github::client::GitHubClient;
use crate::mirror::orchestrator::ConfabMirror;
use crate::settings::Settings;
use crate::store::db::{ConfabDb, DbHandle};

/// Configuration for the confab server.
pub struct ServerConfig {
    pub port: u16,
    pub db_path: PathBuf,
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8001,
            db_path: PathBuf::from(".confab/confab.db"),
            dev_mode: false,
        }
    }
}

pub fn build_router(state: Arc<AppState>) -> Router {
    api::api_router().with_state(state)
}

/// Start the confab API server.
pub async fn start_server(config: ServerConfig) -> Result<()> {
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let db = ConfabDb::new(&config.db_path).context("Failed to initialize confab database")?;
    let settings = Settings::from_env();
    if settings.github_token.is_none() {
        tracing::warn!(
            owner = %settings.mirror_owner,
            repo = %settings.mirror_repo,
            "no GITHUB_TOKEN set; mirroring relies on unauthenticated access"
        );
    }

    let state = Arc::new(AppState {
        db: DbHandle::new(db),
        mirror: ConfabMirror::new(Arc::new(GitHubClient::new())),
        settings,
    });

    let mut app = build_router(state);
    if config.dev_mode {
        app = app.layer(CorsLayer::permissive());
    }

    let host = if config.dev_mode { "0.0.0.0" } else { "127.0.0.1" };
    let addr = format!("{}:{}", host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    tracing::info!(addr = %listener.local_addr()?, "confab API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("shutting down");
}
