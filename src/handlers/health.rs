// src/handlers/health.rs

use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    doc::HEALTH_TAG,
    error::{AppError, ErrorResponse},
    repositories::Repositories,
};

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    /// Active storage backend.
    #[schema(example = "postgres")]
    pub storage: String,
}

/// Reports whether the storage backend is reachable.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = HEALTH_TAG,
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse),
        (status = 503, description = "Storage unreachable", body = ErrorResponse)
    )
)]
pub async fn health_check(State(repos): State<Repositories>) -> Result<impl IntoResponse, AppError> {
    repos.health.ping().await?;

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        storage: repos.backend.as_str().to_string(),
    }))
}
