//! baro-api - Read-only transparency data service
//!
//! Serves aggregated French local-government transparency data
//! (marchés publics, subventions, A-E scorecards) as a JSON API for
//! the citizen-facing front end.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use baro_common::config::{RootFolderInitializer, RootFolderResolver};
use baro_api::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod db;

const DEFAULT_PORT: u16 = 8330;

/// Command-line arguments for baro-api
#[derive(Parser, Debug)]
#[command(name = "baro-api")]
#[command(about = "Read-only JSON API over the transparency barometer database")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "BARO_API_PORT")]
    port: Option<u16>,

    /// Root folder containing baro.db
    #[arg(short, long, env = "BARO_ROOT_FOLDER")]
    root_folder: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "baro_api=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting baro-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let resolver = RootFolderResolver::new("api").with_cli_arg(args.root_folder.clone());
    let toml_config = resolver.toml_config();
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    // The API only reads; the ingestion pipeline owns writes
    let pool = db::connect_readonly(&db_path)
        .await
        .context("Failed to open database")?;
    info!("Connected to database (read-only)");

    let state = AppState::new(pool);
    let app = build_router(state);

    // Port priority: CLI/env arg, then config file, then default
    let port = args
        .port
        .or_else(|| toml_config.as_ref().and_then(|c| c.listen.port))
        .unwrap_or(DEFAULT_PORT);
    let host = toml_config
        .as_ref()
        .and_then(|c| c.listen.host.clone())
        .unwrap_or_else(|| "127.0.0.1".to_string());

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .context("Invalid listen address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("baro-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
