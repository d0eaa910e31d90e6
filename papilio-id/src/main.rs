//! papilio-id - Butterfly identification microservice
//!
//! Loads the classifier and species metadata once at startup and serves
//! `POST /predict`. If startup loading fails the server still comes up, but
//! `/predict` answers 503 until restarted.

use anyhow::{Context, Result};
use clap::Parser;
use papilio_common::config::RootFolderInitializer;
use papilio_id::config::{load_settings, ConfigOverrides};
use papilio_id::{build_router, load_identifier, AppState, ServiceStatus};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Parser)]
#[command(name = "papilio-id", version, about = "Butterfly species identification service")]
struct Cli {
    /// TOML configuration file
    #[arg(long, env = "PAPILIO_CONFIG")]
    config: Option<PathBuf>,

    /// Root folder for model, metadata and uploads
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "PAPILIO_BIND")]
    bind: Option<String>,

    /// Port to listen on
    #[arg(long, env = "PAPILIO_PORT")]
    port: Option<u16>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        return;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = load_settings(ConfigOverrides {
        config_path: cli.config,
        root_folder: cli.root_folder,
        bind_address: cli.bind,
        port: cli.port,
    })?;

    papilio_common::logging::init_tracing(&settings.log_level);

    info!(
        "Starting papilio-id v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("PAPILIO_GIT_HASH"),
        env!("PAPILIO_BUILD_TIMESTAMP"),
        env!("PAPILIO_BUILD_PROFILE")
    );
    info!("Root folder: {}", settings.root_folder.display());

    let initializer = RootFolderInitializer::new(settings.root_folder.clone());
    initializer
        .ensure_directory_exists()
        .context("Failed to initialize root folder")?;
    let uploads_dir = initializer
        .ensure_subdirectory(&settings.data.uploads_dir)
        .context("Failed to create uploads directory")?;
    info!("Uploads: {}", uploads_dir.display());

    // Model loading is CPU heavy; keep it off the async workers
    let startup_settings = settings.clone();
    let service = match tokio::task::spawn_blocking(move || load_identifier(&startup_settings)).await? {
        Ok(identifier) => {
            info!("✓ Identification service initialized");
            ServiceStatus::Ready(Arc::new(identifier))
        }
        Err(e) => {
            error!("CRITICAL: Failed to initialize identification service: {}", e);
            error!("/predict will answer 503 until the service is restarted");
            ServiceStatus::Unavailable(e.to_string())
        }
    };

    let state = AppState::new(service, uploads_dir, settings.max_upload_bytes);
    let app = build_router(state);

    let address = settings.listen_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
