//! Postgres-backed repositories using the runtime `sqlx` query API.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::{
    AnnouncementRepository, DepartmentRepository, ExaminationRepository, HealthCheck,
    department_code_conflict, department_name_conflict, faculty_already_assigned,
    unknown_department,
};
use crate::{
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

const ANNOUNCEMENT_COLUMNS: &str =
    "id, title, content, audience, department_id, attachment_url, is_pinned, created_at, updated_at";

const EXAMINATION_COLUMNS: &str = "id, course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Maps a foreign-key failure on `announcements.department_id` to a 400 naming the department.
fn map_department_ref(err: sqlx::Error, department_id: Option<i64>) -> AppError {
    if let (sqlx::Error::Database(db_err), Some(id)) = (&err, department_id) {
        if db_err.is_foreign_key_violation() {
            return unknown_department(id);
        }
    }
    tracing::error!("Announcement write failed: {:?}", err);
    AppError::from(err)
}

/// Maps unique violations on `departments` to a 409 naming the clashing value.
fn map_department_unique(err: sqlx::Error, code: Option<&str>, name: Option<&str>) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match (db_err.constraint(), code, name) {
                (Some("departments_code_key"), Some(code), _) => return department_code_conflict(code),
                (Some("departments_name_key"), _, Some(name)) => return department_name_conflict(name),
                _ => {}
            }
        }
    }
    tracing::error!("Department write failed: {:?}", err);
    AppError::from(err)
}

#[async_trait]
impl AnnouncementRepository for PgStore {
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>, AppError> {
        let announcements = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, title, content, audience, department_id, attachment_url, is_pinned, created_at, updated_at
            FROM announcements
            WHERE ($1::TEXT IS NULL OR audience = $1)
              AND ($2::BIGINT IS NULL OR department_id = $2)
              AND ($3::BOOLEAN IS NULL OR is_pinned = $3)
            ORDER BY is_pinned DESC, created_at DESC, id DESC
            "#,
        )
        .bind(filter.audience.map(|a| a.as_str()))
        .bind(filter.department_id)
        .bind(filter.pinned)
        .fetch_all(&self.pool)
        .await?;

        Ok(announcements)
    }

    async fn get(&self, id: i64) -> Result<Option<Announcement>, AppError> {
        let announcement = sqlx::query_as::<_, Announcement>(
            r#"
            SELECT id, title, content, audience, department_id, attachment_url, is_pinned, created_at, updated_at
            FROM announcements
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(announcement)
    }

    async fn create(&self, req: CreateAnnouncementRequest) -> Result<Announcement, AppError> {
        let department_id = req.department_id;
        sqlx::query_as::<_, Announcement>(
            r#"
            INSERT INTO announcements
            (title, content, audience, department_id, attachment_url, is_pinned)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, title, content, audience, department_id, attachment_url, is_pinned, created_at, updated_at
            "#,
        )
        .bind(req.title)
        .bind(req.content)
        .bind(req.audience.as_str())
        .bind(req.department_id)
        .bind(req.attachment_url)
        .bind(req.is_pinned)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_department_ref(e, department_id))
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, AppError> {
        let department_id = req.department_id;

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE announcements SET ");
        let mut separated = builder.separated(", ");

        if let Some(title) = req.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }

        if let Some(content) = req.content {
            separated.push("content = ");
            separated.push_bind_unseparated(content);
        }

        if let Some(audience) = req.audience {
            separated.push("audience = ");
            separated.push_bind_unseparated(audience.as_str());
        }

        if let Some(department_id) = req.department_id {
            separated.push("department_id = ");
            separated.push_bind_unseparated(department_id);
        }

        if let Some(url) = req.attachment_url {
            separated.push("attachment_url = ");
            separated.push_bind_unseparated(url);
        }

        if let Some(pinned) = req.is_pinned {
            separated.push("is_pinned = ");
            separated.push_bind_unseparated(pinned);
        }

        separated.push("updated_at = NOW()");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(ANNOUNCEMENT_COLUMNS);

        builder
            .build_query_as::<Announcement>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_department_ref(e, department_id))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl DepartmentRepository for PgStore {
    async fn list(&self) -> Result<Vec<Department>, AppError> {
        let departments = sqlx::query_as::<_, Department>(
            r#"
            SELECT d.id, d.code, d.name, d.description, d.created_at, d.updated_at,
                   COALESCE(
                       ARRAY_AGG(f.faculty_id ORDER BY f.faculty_id) FILTER (WHERE f.faculty_id IS NOT NULL),
                       ARRAY[]::BIGINT[]
                   ) AS faculty_ids
            FROM departments d
            LEFT JOIN department_faculty f ON f.department_id = d.id
            GROUP BY d.id
            ORDER BY d.code COLLATE "C"
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    async fn get(&self, id: i64) -> Result<Option<Department>, AppError> {
        let department = sqlx::query_as::<_, Department>(
            r#"
            SELECT d.id, d.code, d.name, d.description, d.created_at, d.updated_at,
                   COALESCE(
                       ARRAY_AGG(f.faculty_id ORDER BY f.faculty_id) FILTER (WHERE f.faculty_id IS NOT NULL),
                       ARRAY[]::BIGINT[]
                   ) AS faculty_ids
            FROM departments d
            LEFT JOIN department_faculty f ON f.department_id = d.id
            WHERE d.id = $1
            GROUP BY d.id
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(department)
    }

    async fn create(&self, req: CreateDepartmentRequest) -> Result<Department, AppError> {
        sqlx::query_as::<_, Department>(
            r#"
            INSERT INTO departments (code, name, description)
            VALUES ($1, $2, $3)
            RETURNING id, code, name, description, created_at, updated_at,
                      ARRAY[]::BIGINT[] AS faculty_ids
            "#,
        )
        .bind(&req.code)
        .bind(&req.name)
        .bind(&req.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_department_unique(e, Some(req.code.as_str()), Some(req.name.as_str())))
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateDepartmentRequest,
    ) -> Result<Option<Department>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE departments SET ");
        let mut separated = builder.separated(", ");

        if let Some(code) = &req.code {
            separated.push("code = ");
            separated.push_bind_unseparated(code.clone());
        }

        if let Some(name) = &req.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name.clone());
        }

        if let Some(description) = &req.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description.clone());
        }

        separated.push("updated_at = NOW()");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING id");

        let updated: Option<i64> = builder
            .build_query_scalar()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_department_unique(e, req.code.as_deref(), req.name.as_deref()))?;

        match updated {
            Some(id) => DepartmentRepository::get(self, id).await,
            None => Ok(None),
        }
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        // Faculty rows cascade; announcements are detached by ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM departments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn add_faculty(&self, id: i64, faculty_id: i64) -> Result<Option<Department>, AppError> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> =
            sqlx::query_scalar("SELECT id FROM departments WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        if exists.is_none() {
            return Ok(None);
        }

        let inserted = sqlx::query(
            r#"
            INSERT INTO department_faculty (department_id, faculty_id)
            VALUES ($1, $2)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(faculty_id)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            return Err(faculty_already_assigned(id, faculty_id));
        }

        sqlx::query("UPDATE departments SET updated_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        DepartmentRepository::get(self, id).await
    }
}

#[async_trait]
impl ExaminationRepository for PgStore {
    async fn list(&self, filter: &ExaminationFilter) -> Result<Vec<Examination>, AppError> {
        let examinations = sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score, created_at, updated_at
            FROM examinations
            WHERE ($1::TEXT IS NULL OR exam_type = $1)
              AND ($2::TIMESTAMPTZ IS NULL OR scheduled_at >= $2)
              AND ($3::TIMESTAMPTZ IS NULL OR scheduled_at <= $3)
            ORDER BY scheduled_at ASC, id ASC
            "#,
        )
        .bind(filter.exam_type.map(|t| t.as_str()))
        .bind(filter.from)
        .bind(filter.to)
        .fetch_all(&self.pool)
        .await?;

        Ok(examinations)
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Examination>, AppError> {
        let examinations = sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score, created_at, updated_at
            FROM examinations
            WHERE course_id = $1
            ORDER BY scheduled_at ASC, id ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(examinations)
    }

    async fn get(&self, id: i64) -> Result<Option<Examination>, AppError> {
        let examination = sqlx::query_as::<_, Examination>(
            r#"
            SELECT id, course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score, created_at, updated_at
            FROM examinations
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(examination)
    }

    async fn create(&self, req: CreateExaminationRequest) -> Result<Examination, AppError> {
        let examination = sqlx::query_as::<_, Examination>(
            r#"
            INSERT INTO examinations
            (course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, course_id, title, exam_type, scheduled_at, duration_minutes, venue, max_score, created_at, updated_at
            "#,
        )
        .bind(req.course_id)
        .bind(req.title)
        .bind(req.exam_type.as_str())
        .bind(req.scheduled_at)
        .bind(req.duration_minutes)
        .bind(req.venue)
        .bind(req.max_score)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create examination: {:?}", e);
            AppError::from(e)
        })?;

        Ok(examination)
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateExaminationRequest,
    ) -> Result<Option<Examination>, AppError> {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE examinations SET ");
        let mut separated = builder.separated(", ");

        if let Some(course_id) = req.course_id {
            separated.push("course_id = ");
            separated.push_bind_unseparated(course_id);
        }

        if let Some(title) = req.title {
            separated.push("title = ");
            separated.push_bind_unseparated(title);
        }

        if let Some(exam_type) = req.exam_type {
            separated.push("exam_type = ");
            separated.push_bind_unseparated(exam_type.as_str());
        }

        if let Some(scheduled_at) = req.scheduled_at {
            separated.push("scheduled_at = ");
            separated.push_bind_unseparated(scheduled_at);
        }

        if let Some(duration) = req.duration_minutes {
            separated.push("duration_minutes = ");
            separated.push_bind_unseparated(duration);
        }

        if let Some(venue) = req.venue {
            separated.push("venue = ");
            separated.push_bind_unseparated(venue);
        }

        if let Some(max_score) = req.max_score {
            separated.push("max_score = ");
            separated.push_bind_unseparated(max_score);
        }

        separated.push("updated_at = NOW()");

        builder.push(" WHERE id = ");
        builder.push_bind(id);
        builder.push(" RETURNING ");
        builder.push(EXAMINATION_COLUMNS);

        let examination = builder
            .build_query_as::<Examination>()
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update examination: {:?}", e);
                AppError::from(e)
            })?;

        Ok(examination)
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM examinations WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl HealthCheck for PgStore {
    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
