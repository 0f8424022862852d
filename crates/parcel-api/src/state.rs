//! Application state shared by handlers.

use parcel_db::PropertyStore;
use std::sync::Arc;

use crate::services::import::ImportPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ImportPipeline>,
    /// Read side of the same store the pipeline persists into.
    pub properties: Arc<dyn PropertyStore>,
}
