use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use parcel_core::models::PropertyRecord;
use parcel_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

#[utoipa::path(
    get,
    path = "/api/v0/properties/{id}",
    tag = "properties",
    params(
        ("id" = Uuid, Path, description = "Property ID")
    ),
    responses(
        (status = 200, description = "Property found", body = PropertyRecord),
        (status = 404, description = "Property not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn get_property(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let property = state
        .properties
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Property not found".to_string()))?;

    Ok(Json(property))
}
