// src/doc.rs

use axum::Json;
use utoipa::OpenApi;

pub const ANNOUNCEMENT_TAG: &str = "Announcements";
pub const DEPARTMENT_TAG: &str = "Departments";
pub const EXAMINATION_TAG: &str = "Examinations";
pub const HEALTH_TAG: &str = "Health";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Campus Admin",
        description = "University administration API: announcements, departments and examinations",
    ),
    paths(
        crate::handlers::announcement::list_announcements,
        crate::handlers::announcement::get_announcement,
        crate::handlers::announcement::create_announcement,
        crate::handlers::announcement::update_announcement,
        crate::handlers::announcement::delete_announcement,
        crate::handlers::department::list_departments,
        crate::handlers::department::get_department,
        crate::handlers::department::create_department,
        crate::handlers::department::update_department,
        crate::handlers::department::delete_department,
        crate::handlers::department::add_faculty,
        crate::handlers::examination::list_examinations,
        crate::handlers::examination::list_course_examinations,
        crate::handlers::examination::get_examination,
        crate::handlers::examination::create_examination,
        crate::handlers::examination::update_examination,
        crate::handlers::examination::delete_examination,
        crate::handlers::health::health_check,
    ),
    components(
        schemas(
            crate::error::ErrorResponse,
            crate::models::announcement::Audience,
            crate::models::examination::ExamType,
        )
    ),
    tags(
        (name = ANNOUNCEMENT_TAG, description = "Campus announcements"),
        (name = DEPARTMENT_TAG, description = "Departments and their faculty members"),
        (name = EXAMINATION_TAG, description = "Examination schedule"),
        (name = HEALTH_TAG, description = "Health check endpoints"),
    )
)]
pub struct ApiDoc;

/// Serves the generated OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
