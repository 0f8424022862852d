//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use parcel_core::models::{DocumentUrls, ImportStage, PropertyRecord, PropertyStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parcel API",
        version = "0.1.0",
        description = "Imports real estate listings from PDF brochures. A submitted document is fetched, its text extracted, structured property data pulled out by a language model, the source archived and the record stored. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::property_import::import_property,
        handlers::property_get::get_property,
    ),
    components(schemas(
        handlers::property_import::ImportPropertyRequest,
        handlers::property_import::ImportPropertyResponse,
        PropertyRecord,
        PropertyStatus,
        DocumentUrls,
        ImportStage,
        ErrorResponse,
    )),
    tags(
        (name = "properties", description = "Property import and lookup")
    )
)]
pub struct ApiDoc;
