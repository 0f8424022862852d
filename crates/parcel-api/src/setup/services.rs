//! Service initialization and application state setup

use anyhow::{Context, Result};
use parcel_core::Config;
use parcel_db::PropertyStore;
use parcel_extraction::{OpenAiChatModel, SchemaExtractor};
use parcel_processing::{HttpDocumentFetcher, PdfTextExtractor};
use parcel_storage::{DocumentArchiver, Storage};
use std::sync::Arc;

use crate::services::import::ImportPipeline;
use crate::state::AppState;

/// Wire the import pipeline from configuration and return the application state.
pub fn initialize_services(
    config: &Config,
    storage: Arc<dyn Storage>,
    store: Arc<dyn PropertyStore>,
) -> Result<Arc<AppState>> {
    let fetcher = HttpDocumentFetcher::new(config.fetch().clone())
        .context("Failed to build document fetcher")?;

    let model = OpenAiChatModel::new(config.model()).context("Failed to build model client")?;
    tracing::info!(
        model = %config.model().model,
        base_url = %config.model().base_url,
        "Language model client configured"
    );

    let pipeline = ImportPipeline::new(
        Arc::new(fetcher),
        Arc::new(PdfTextExtractor),
        Arc::new(SchemaExtractor::new(Arc::new(model), config.model())),
        Arc::new(DocumentArchiver::new(
            storage,
            config.storage().archive_prefix.clone(),
        )),
        store.clone(),
        config.pipeline().clone(),
    );

    Ok(Arc::new(AppState {
        pipeline: Arc::new(pipeline),
        properties: store,
    }))
}
