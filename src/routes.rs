// src/routes.rs

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    config::ANY_ORIGIN,
    doc::openapi_json,
    handlers::{announcement, department, examination, health},
    state::AppState,
};

/// Assembles the main application router.
///
/// * Mounts the announcement, department and examination tables under `/api`.
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (repositories and configuration).
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let announcement_routes = Router::new()
        .route(
            "/",
            get(announcement::list_announcements).post(announcement::create_announcement),
        )
        .route(
            "/{id}",
            get(announcement::get_announcement)
                .put(announcement::update_announcement)
                .delete(announcement::delete_announcement),
        );

    let department_routes = Router::new()
        .route(
            "/",
            get(department::list_departments).post(department::create_department),
        )
        .route(
            "/{id}",
            get(department::get_department)
                .put(department::update_department)
                .delete(department::delete_department),
        )
        .route("/{id}/faculty/{faculty_id}", post(department::add_faculty));

    let examination_routes = Router::new()
        .route(
            "/",
            get(examination::list_examinations).post(examination::create_examination),
        )
        .route(
            "/course/{course_id}",
            get(examination::list_course_examinations),
        )
        .route(
            "/{id}",
            get(examination::get_examination)
                .put(examination::update_examination)
                .delete(examination::delete_examination),
        );

    Router::new()
        .nest("/api/announcements", announcement_routes)
        .nest("/api/departments", department_routes)
        .nest("/api/examinations", examination_routes)
        .route("/api/health", get(health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        // Global Middleware (applied from outside in)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    // A list containing "*" would panic inside tower-http.
    if origins.iter().any(|origin| origin == ANY_ORIGIN) {
        return layer.allow_origin(AllowOrigin::any());
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}
