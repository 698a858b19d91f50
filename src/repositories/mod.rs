//! Data access for announcements, departments and examinations.
//!
//! Handlers only see the traits below; the concrete store (Postgres or the
//! in-process memory store) is picked once at startup.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    config::StorageBackend,
    error::AppError,
    models::{
        announcement::{
            Announcement, AnnouncementFilter, CreateAnnouncementRequest, UpdateAnnouncementRequest,
        },
        department::{CreateDepartmentRequest, Department, UpdateDepartmentRequest},
        examination::{
            CreateExaminationRequest, Examination, ExaminationFilter, UpdateExaminationRequest,
        },
    },
};

#[async_trait]
pub trait AnnouncementRepository: Send + Sync {
    /// Pinned first, then newest first.
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Announcement>, AppError>;

    async fn create(&self, req: CreateAnnouncementRequest) -> Result<Announcement, AppError>;

    /// Returns `None` when no announcement has this id.
    async fn update(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, AppError>;

    /// Returns `false` when no announcement has this id.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait DepartmentRepository: Send + Sync {
    /// Ordered by code.
    async fn list(&self) -> Result<Vec<Department>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Department>, AppError>;

    async fn create(&self, req: CreateDepartmentRequest) -> Result<Department, AppError>;

    async fn update(
        &self,
        id: i64,
        req: UpdateDepartmentRequest,
    ) -> Result<Option<Department>, AppError>;

    /// Also drops faculty associations and detaches announcements.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Associates a faculty member with a department.
    ///
    /// Returns `None` when the department does not exist and
    /// `AppError::Conflict` when the association is already present.
    async fn add_faculty(&self, id: i64, faculty_id: i64) -> Result<Option<Department>, AppError>;
}

#[async_trait]
pub trait ExaminationRepository: Send + Sync {
    /// Ordered by schedule, earliest first.
    async fn list(&self, filter: &ExaminationFilter) -> Result<Vec<Examination>, AppError>;

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Examination>, AppError>;

    async fn get(&self, id: i64) -> Result<Option<Examination>, AppError>;

    async fn create(&self, req: CreateExaminationRequest) -> Result<Examination, AppError>;

    async fn update(
        &self,
        id: i64,
        req: UpdateExaminationRequest,
    ) -> Result<Option<Examination>, AppError>;

    async fn delete(&self, id: i64) -> Result<bool, AppError>;
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    /// Fails with `AppError::Unavailable` when the store cannot be reached.
    async fn ping(&self) -> Result<(), AppError>;
}

/// Aggregates all repositories for convenient access.
///
/// Cloning is cheap: every field is an `Arc`.
#[derive(Clone)]
pub struct Repositories {
    pub backend: StorageBackend,
    pub announcements: Arc<dyn AnnouncementRepository>,
    pub departments: Arc<dyn DepartmentRepository>,
    pub examinations: Arc<dyn ExaminationRepository>,
    pub health: Arc<dyn HealthCheck>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            backend: StorageBackend::Postgres,
            announcements: store.clone(),
            departments: store.clone(),
            examinations: store.clone(),
            health: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::default());
        Self {
            backend: StorageBackend::Memory,
            announcements: store.clone(),
            departments: store.clone(),
            examinations: store.clone(),
            health: store,
        }
    }
}

pub(crate) fn department_code_conflict(code: &str) -> AppError {
    AppError::Conflict(format!("Department code '{}' already exists", code))
}

pub(crate) fn department_name_conflict(name: &str) -> AppError {
    AppError::Conflict(format!("Department name '{}' already exists", name))
}

pub(crate) fn unknown_department(id: i64) -> AppError {
    AppError::BadRequest(format!("Department {} does not exist", id))
}

pub(crate) fn faculty_already_assigned(id: i64, faculty_id: i64) -> AppError {
    AppError::Conflict(format!(
        "Faculty member {} is already assigned to department {}",
        faculty_id, id
    ))
}
