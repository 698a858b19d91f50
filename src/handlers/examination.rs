// src/handlers/examination.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    doc::EXAMINATION_TAG,
    error::{AppError, ErrorResponse},
    models::examination::{
        CreateExaminationRequest, Examination, ExaminationFilter, UpdateExaminationRequest,
    },
    repositories::Repositories,
    utils::{
        extract::{Path, Query},
        validate::ValidatedJson,
    },
};

fn not_found() -> AppError {
    AppError::NotFound("Examination not found".to_string())
}

/// Lists examinations by schedule, optionally filtered by type and time window.
#[utoipa::path(
    get,
    path = "/api/examinations",
    tag = EXAMINATION_TAG,
    params(ExaminationFilter),
    responses(
        (status = 200, description = "Examinations", body = Vec<Examination>),
        (status = 400, description = "Invalid time window", body = ErrorResponse)
    )
)]
pub async fn list_examinations(
    State(repos): State<Repositories>,
    Query(filter): Query<ExaminationFilter>,
) -> Result<impl IntoResponse, AppError> {
    if !filter.is_valid() {
        return Err(AppError::BadRequest("'from' must not be later than 'to'".to_string()));
    }

    let examinations = repos.examinations.list(&filter).await?;
    Ok(Json(examinations))
}

/// Lists the examinations of one course. Unknown courses yield an empty list.
#[utoipa::path(
    get,
    path = "/api/examinations/course/{course_id}",
    tag = EXAMINATION_TAG,
    params(("course_id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Examinations of the course", body = Vec<Examination>)
    )
)]
pub async fn list_course_examinations(
    State(repos): State<Repositories>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let examinations = repos.examinations.list_by_course(course_id).await?;
    Ok(Json(examinations))
}

#[utoipa::path(
    get,
    path = "/api/examinations/{id}",
    tag = EXAMINATION_TAG,
    params(("id" = i64, Path, description = "Examination ID")),
    responses(
        (status = 200, description = "Examination found", body = Examination),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    )
)]
pub async fn get_examination(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let examination = repos.examinations.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(examination))
}

#[utoipa::path(
    post,
    path = "/api/examinations",
    tag = EXAMINATION_TAG,
    request_body = CreateExaminationRequest,
    responses(
        (status = 201, description = "Examination scheduled", body = Examination),
        (status = 400, description = "Invalid request", body = ErrorResponse)
    )
)]
pub async fn create_examination(
    State(repos): State<Repositories>,
    ValidatedJson(mut payload): ValidatedJson<CreateExaminationRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.title = payload.title.trim().to_string();

    let examination = repos.examinations.create(payload).await?;
    tracing::info!(
        id = examination.id,
        course_id = examination.course_id,
        "Examination scheduled"
    );

    Ok((StatusCode::CREATED, Json(examination)))
}

#[utoipa::path(
    put,
    path = "/api/examinations/{id}",
    tag = EXAMINATION_TAG,
    params(("id" = i64, Path, description = "Examination ID")),
    request_body = UpdateExaminationRequest,
    responses(
        (status = 200, description = "Examination updated", body = Examination),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    )
)]
pub async fn update_examination(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    ValidatedJson(mut payload): ValidatedJson<UpdateExaminationRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        let current = repos.examinations.get(id).await?.ok_or_else(not_found)?;
        return Ok(Json(current));
    }

    payload.title = payload.title.map(|t| t.trim().to_string());

    let examination = repos
        .examinations
        .update(id, payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(examination))
}

#[utoipa::path(
    delete,
    path = "/api/examinations/{id}",
    tag = EXAMINATION_TAG,
    params(("id" = i64, Path, description = "Examination ID")),
    responses(
        (status = 204, description = "Examination deleted"),
        (status = 404, description = "Examination not found", body = ErrorResponse)
    )
)]
pub async fn delete_examination(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !repos.examinations.delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(id, "Examination deleted");
    Ok(StatusCode::NO_CONTENT)
}
