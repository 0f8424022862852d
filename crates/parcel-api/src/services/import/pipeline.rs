use parcel_core::models::{ImportStage, NewProperty, PropertyRecord, SubmittedDocument};
use parcel_core::PipelineConfig;
use parcel_db::PropertyStore;
use parcel_extraction::SchemaExtractor;
use parcel_processing::{DocumentFetcher, TextExtractor};
use parcel_storage::DocumentArchiver;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

use super::state::ImportState;
use super::{ImportFailure, ImportRequest, StageError};

/// Runs imports. Holds no per-import state, so one instance serves concurrent requests.
pub struct ImportPipeline {
    fetcher: Arc<dyn DocumentFetcher>,
    text_extractor: Arc<dyn TextExtractor>,
    schema_extractor: Arc<SchemaExtractor>,
    archiver: Arc<DocumentArchiver>,
    store: Arc<dyn PropertyStore>,
    timeouts: PipelineConfig,
}

impl ImportPipeline {
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        text_extractor: Arc<dyn TextExtractor>,
        schema_extractor: Arc<SchemaExtractor>,
        archiver: Arc<DocumentArchiver>,
        store: Arc<dyn PropertyStore>,
        timeouts: PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            text_extractor,
            schema_extractor,
            archiver,
            store,
            timeouts,
        }
    }

    /// Run one import to a terminal state.
    pub async fn run(&self, request: ImportRequest) -> Result<PropertyRecord, ImportFailure> {
        let start = Instant::now();
        let mut tracker = StateTracker::new(Uuid::new_v4());

        tracing::info!(
            import_id = %tracker.import_id,
            document_name = %request.document_name,
            "Import started"
        );

        let result = self.execute(&request, &mut tracker).await;

        match &result {
            Ok(record) => {
                tracker.record(ImportState::Succeeded);
                tracing::info!(
                    import_id = %tracker.import_id,
                    property_id = %record.id,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Import succeeded"
                );
            }
            Err(failure) => {
                tracker.record(failure.to_state());
                tracing::warn!(
                    import_id = %tracker.import_id,
                    stage = %failure.stage,
                    error = %failure,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "Import failed"
                );
            }
        }

        result
    }

    async fn execute(
        &self,
        request: &ImportRequest,
        tracker: &mut StateTracker,
    ) -> Result<PropertyRecord, ImportFailure> {
        let bytes = run_stage(
            ImportStage::Fetch,
            self.timeouts.fetch_timeout,
            self.fetcher.fetch(&request.document_url),
        )
        .await?;
        let document = SubmittedDocument::new(bytes, request.document_name.clone());
        tracker.record(ImportState::Fetched);

        let text = run_stage(
            ImportStage::TextExtract,
            self.timeouts.text_timeout,
            self.text_extractor.extract(document.bytes.clone()),
        )
        .await?;
        tracker.record(ImportState::TextExtracted);

        // The model call and the archive write are independent; the first failure drops the other.
        let (data, archived) = tokio::try_join!(
            run_stage(
                ImportStage::SchemaExtract,
                self.timeouts.model_timeout,
                self.schema_extractor.extract(&text),
            ),
            run_stage(
                ImportStage::Archive,
                self.timeouts.archive_timeout,
                self.archiver.archive(&document),
            ),
        )?;
        tracker.record(ImportState::SchemaExtracted);
        tracker.record(ImportState::Archived);

        let property = NewProperty::assemble(
            data,
            &archived,
            &document.name,
            document.submitted_at,
        );
        let record = run_stage(
            ImportStage::Persist,
            self.timeouts.persist_timeout,
            self.store.insert(property),
        )
        .await?;
        tracker.record(ImportState::Persisted);

        Ok(record)
    }
}

/// Await one stage under its deadline, attributing any failure to that stage.
async fn run_stage<T, E, F>(stage: ImportStage, limit: Duration, work: F) -> Result<T, ImportFailure>
where
    F: Future<Output = Result<T, E>>,
    E: Into<StageError>,
{
    match tokio::time::timeout(limit, work).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(ImportFailure::new(stage, e.into())),
        Err(_) => Err(ImportFailure::new(stage, StageError::Timeout(limit))),
    }
}

struct StateTracker {
    import_id: Uuid,
    state: ImportState,
}

impl StateTracker {
    fn new(import_id: Uuid) -> Self {
        Self {
            import_id,
            state: ImportState::Submitted,
        }
    }

    fn record(&mut self, next: ImportState) {
        match self.state.advance(next) {
            Ok(state) => {
                tracing::debug!(import_id = %self.import_id, state = %state, "Import state changed");
                self.state = state;
            }
            Err(e) => {
                tracing::error!(import_id = %self.import_id, error = %e, "Rejected import state change");
            }
        }
    }
}
