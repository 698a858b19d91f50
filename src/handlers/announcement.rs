// src/handlers/announcement.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    doc::ANNOUNCEMENT_TAG,
    error::{AppError, ErrorResponse},
    models::announcement::{
        Announcement, AnnouncementFilter, CreateAnnouncementRequest, MAX_CONTENT_CHARS,
        UpdateAnnouncementRequest,
    },
    repositories::Repositories,
    utils::{
        extract::{Path, Query},
        html::clean_non_empty,
        validate::ValidatedJson,
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Announcement not found".to_string())
}

/// Escaping can grow the body, so the length limit is enforced on the cleaned text.
fn sanitized(content: &str) -> Result<String, AppError> {
    let cleaned = clean_non_empty(content).ok_or_else(|| {
        AppError::BadRequest("Announcement content is empty after sanitization".to_string())
    })?;

    if cleaned.chars().count() > MAX_CONTENT_CHARS {
        return Err(AppError::BadRequest(format!(
            "Announcement content exceeds {} characters after sanitization",
            MAX_CONTENT_CHARS
        )));
    }
    Ok(cleaned)
}

/// Lists announcements, pinned first then newest first.
#[utoipa::path(
    get,
    path = "/api/announcements",
    tag = ANNOUNCEMENT_TAG,
    params(AnnouncementFilter),
    responses(
        (status = 200, description = "Announcements", body = Vec<Announcement>)
    )
)]
pub async fn list_announcements(
    State(repos): State<Repositories>,
    Query(filter): Query<AnnouncementFilter>,
) -> Result<impl IntoResponse, AppError> {
    let announcements = repos.announcements.list(&filter).await?;
    Ok(Json(announcements))
}

/// Retrieves a single announcement by ID.
#[utoipa::path(
    get,
    path = "/api/announcements/{id}",
    tag = ANNOUNCEMENT_TAG,
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Announcement found", body = Announcement),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    )
)]
pub async fn get_announcement(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let announcement = repos.announcements.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(announcement))
}

/// Publishes a new announcement. The HTML body is sanitized before storage.
#[utoipa::path(
    post,
    path = "/api/announcements",
    tag = ANNOUNCEMENT_TAG,
    request_body = CreateAnnouncementRequest,
    responses(
        (status = 201, description = "Announcement created", body = Announcement),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_announcement(
    State(repos): State<Repositories>,
    ValidatedJson(mut payload): ValidatedJson<CreateAnnouncementRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.title = payload.title.trim().to_string();
    payload.content = sanitized(&payload.content)?;

    let announcement = repos.announcements.create(payload).await?;
    tracing::info!(id = announcement.id, "Announcement created");

    Ok((StatusCode::CREATED, Json(announcement)))
}

/// Updates an announcement by ID. Absent fields are left unchanged.
#[utoipa::path(
    put,
    path = "/api/announcements/{id}",
    tag = ANNOUNCEMENT_TAG,
    params(("id" = i64, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Announcement updated", body = Announcement),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    )
)]
pub async fn update_announcement(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    ValidatedJson(mut payload): ValidatedJson<UpdateAnnouncementRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        let current = repos.announcements.get(id).await?.ok_or_else(not_found)?;
        return Ok(Json(current));
    }

    payload.title = payload.title.map(|t| t.trim().to_string());
    if let Some(content) = payload.content.as_deref() {
        payload.content = Some(sanitized(content)?);
    }

    let announcement = repos
        .announcements
        .update(id, payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(announcement))
}

/// Deletes an announcement by ID.
#[utoipa::path(
    delete,
    path = "/api/announcements/{id}",
    tag = ANNOUNCEMENT_TAG,
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 204, description = "Announcement deleted"),
        (status = 404, description = "Announcement not found", body = ErrorResponse)
    )
)]
pub async fn delete_announcement(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !repos.announcements.delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(id, "Announcement deleted");
    Ok(StatusCode::NO_CONTENT)
}
