//! Application setup and initialization

pub mod routes;
pub mod server;

use crate::state::AppState;
use anyhow::{Context, Result};
use quietreel_core::Config;
use quietreel_processing::FFmpegService;
use quietreel_storage::{LocalStaging, StagingStore};
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    // Fail fast on misconfiguration
    config.validate().context("Configuration validation failed")?;

    quietreel_infra::init_telemetry("quietreel-api", config.environment(), config.log_json())
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!("Configuration loaded and validated successfully");

    let staging = LocalStaging::new(config.staging_dir())
        .await
        .context("Failed to prepare staging directory")?;
    tracing::info!(staging_dir = %staging.root().display(), "Staging directory ready");

    let transcoder = FFmpegService::from_config(&config);

    let state = Arc::new(AppState::new(
        config.clone(),
        Arc::new(staging),
        Arc::new(transcoder),
    ));

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
