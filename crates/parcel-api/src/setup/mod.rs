//! Application setup and initialization
//!
//! Startup order: telemetry, configuration validation, database, storage, pipeline, routes.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use parcel_core::Config;
use parcel_db::PropertyRepository;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry()
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    // Fail fast on misconfiguration
    config
        .validate()
        .context("Configuration validation failed")?;
    tracing::info!("Configuration loaded and validated successfully");

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(
        &config,
        storage,
        Arc::new(PropertyRepository::new(pool)),
    )?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
