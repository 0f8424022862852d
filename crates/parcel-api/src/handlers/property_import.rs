use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::services::import::ImportRequest;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use parcel_core::models::PropertyRecord;
use parcel_core::AppError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImportPropertyRequest {
    /// Location of the PDF brochure. `pdfUrl` is accepted as well.
    #[serde(default, alias = "pdfUrl")]
    pub document_url: Option<String>,
    /// Name to archive the document under; defaults to the last URL path segment.
    #[serde(default)]
    pub file_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportPropertyResponse {
    pub success: bool,
    pub property: PropertyRecord,
}

#[utoipa::path(
    post,
    path = "/api/v0/properties/import",
    tag = "properties",
    request_body = ImportPropertyRequest,
    responses(
        (status = 200, description = "Property imported", body = ImportPropertyResponse),
        (status = 400, description = "Missing or invalid document URL", body = ErrorResponse),
        (status = 422, description = "Document could not be parsed", body = ErrorResponse),
        (status = 502, description = "Document host or model failed", body = ErrorResponse),
        (status = 504, description = "An import stage timed out", body = ErrorResponse),
        (status = 500, description = "Archive or database failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip_all)]
pub async fn import_property(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<ImportPropertyRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document_url = body
        .document_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
        .ok_or_else(|| AppError::BadRequest("PDF URL is required".to_string()))?;

    let property = state
        .pipeline
        .run(ImportRequest::new(document_url, body.file_name))
        .await?;

    Ok(Json(ImportPropertyResponse {
        success: true,
        property,
    }))
}
