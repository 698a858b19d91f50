// src/handlers/department.rs

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    doc::DEPARTMENT_TAG,
    error::{AppError, ErrorResponse},
    models::department::{CreateDepartmentRequest, Department, UpdateDepartmentRequest},
    repositories::Repositories,
    utils::{extract::Path, validate::ValidatedJson},
};

fn not_found() -> AppError {
    AppError::NotFound("Department not found".to_string())
}

/// Lists all departments ordered by code.
#[utoipa::path(
    get,
    path = "/api/departments",
    tag = DEPARTMENT_TAG,
    responses(
        (status = 200, description = "Departments", body = Vec<Department>)
    )
)]
pub async fn list_departments(
    State(repos): State<Repositories>,
) -> Result<impl IntoResponse, AppError> {
    let departments = repos.departments.list().await?;
    Ok(Json(departments))
}

/// Retrieves a single department, including its faculty ids.
#[utoipa::path(
    get,
    path = "/api/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department found", body = Department),
        (status = 404, description = "Department not found", body = ErrorResponse)
    )
)]
pub async fn get_department(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let department = repos.departments.get(id).await?.ok_or_else(not_found)?;
    Ok(Json(department))
}

#[utoipa::path(
    post,
    path = "/api/departments",
    tag = DEPARTMENT_TAG,
    request_body = CreateDepartmentRequest,
    responses(
        (status = 201, description = "Department created", body = Department),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 409, description = "Code or name already in use", body = ErrorResponse)
    )
)]
pub async fn create_department(
    State(repos): State<Repositories>,
    ValidatedJson(mut payload): ValidatedJson<CreateDepartmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.name = payload.name.trim().to_string();

    let department = repos.departments.create(payload).await?;
    tracing::info!(id = department.id, code = %department.code, "Department created");

    Ok((StatusCode::CREATED, Json(department)))
}

#[utoipa::path(
    put,
    path = "/api/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i64, Path, description = "Department ID")),
    request_body = UpdateDepartmentRequest,
    responses(
        (status = 200, description = "Department updated", body = Department),
        (status = 400, description = "Invalid request", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse),
        (status = 409, description = "Code or name already in use", body = ErrorResponse)
    )
)]
pub async fn update_department(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
    ValidatedJson(mut payload): ValidatedJson<UpdateDepartmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if payload.is_empty() {
        let current = repos.departments.get(id).await?.ok_or_else(not_found)?;
        return Ok(Json(current));
    }

    payload.name = payload.name.map(|n| n.trim().to_string());

    let department = repos
        .departments
        .update(id, payload)
        .await?
        .ok_or_else(not_found)?;

    Ok(Json(department))
}

/// Deletes a department. Its faculty associations go with it and
/// announcements published by it lose their department reference.
#[utoipa::path(
    delete,
    path = "/api/departments/{id}",
    tag = DEPARTMENT_TAG,
    params(("id" = i64, Path, description = "Department ID")),
    responses(
        (status = 204, description = "Department deleted"),
        (status = 404, description = "Department not found", body = ErrorResponse)
    )
)]
pub async fn delete_department(
    State(repos): State<Repositories>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !repos.departments.delete(id).await? {
        return Err(not_found());
    }

    tracing::info!(id, "Department deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Associates a faculty member with a department.
#[utoipa::path(
    post,
    path = "/api/departments/{id}/faculty/{faculty_id}",
    tag = DEPARTMENT_TAG,
    params(
        ("id" = i64, Path, description = "Department ID"),
        ("faculty_id" = i64, Path, description = "Faculty member ID")
    ),
    responses(
        (status = 201, description = "Faculty member associated", body = Department),
        (status = 400, description = "Invalid faculty id", body = ErrorResponse),
        (status = 404, description = "Department not found", body = ErrorResponse),
        (status = 409, description = "Already associated", body = ErrorResponse)
    )
)]
pub async fn add_faculty(
    State(repos): State<Repositories>,
    Path((id, faculty_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    if faculty_id <= 0 {
        return Err(AppError::BadRequest("Faculty id must be positive".to_string()));
    }

    let department = repos
        .departments
        .add_faculty(id, faculty_id)
        .await?
        .ok_or_else(not_found)?;
    tracing::info!(id, faculty_id, "Faculty member assigned to department");

    Ok((StatusCode::CREATED, Json(department)))
}
