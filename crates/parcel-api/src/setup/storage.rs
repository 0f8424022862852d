//! Storage setup and initialization

use anyhow::{Context, Result};
use parcel_core::Config;
use parcel_storage::{create_storage, Storage};
use std::sync::Arc;

/// Create the archive storage backend selected by configuration.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage...");
    let storage = create_storage(config.storage())
        .await
        .context("Failed to initialize storage backend")?;

    tracing::info!(
        backend = %storage.backend_type(),
        archive_prefix = %config.storage().archive_prefix,
        "Storage initialized successfully"
    );

    Ok(storage)
}
