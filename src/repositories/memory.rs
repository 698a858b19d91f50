//! Process-local store with the same rules as the Postgres schema.
//!
//! Used when `STORAGE_BACKEND=memory` and by the test-suite. Data is lost on
//! restart.

use std::{cmp::Reverse, collections::BTreeMap};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

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

#[derive(Default)]
struct Tables {
    announcement_seq: i64,
    department_seq: i64,
    examination_seq: i64,
    announcements: BTreeMap<i64, Announcement>,
    departments: BTreeMap<i64, Department>,
    examinations: BTreeMap<i64, Examination>,
}

impl Tables {
    fn check_department_ref(&self, department_id: Option<i64>) -> Result<(), AppError> {
        match department_id {
            Some(id) if !self.departments.contains_key(&id) => Err(unknown_department(id)),
            _ => Ok(()),
        }
    }

    /// Mirrors the UNIQUE constraints on `departments.code` and `departments.name`.
    fn check_department_unique(
        &self,
        except: Option<i64>,
        code: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), AppError> {
        for dept in self.departments.values() {
            if Some(dept.id) == except {
                continue;
            }
            if let Some(code) = code.filter(|c| *c == dept.code) {
                return Err(department_code_conflict(code));
            }
            if let Some(name) = name.filter(|n| *n == dept.name) {
                return Err(department_name_conflict(name));
            }
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

#[async_trait]
impl AnnouncementRepository for MemoryStore {
    async fn list(&self, filter: &AnnouncementFilter) -> Result<Vec<Announcement>, AppError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Announcement> = tables
            .announcements
            .values()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        items.sort_by_key(|a| (!a.is_pinned, Reverse(a.created_at), Reverse(a.id)));
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Announcement>, AppError> {
        Ok(self.tables.read().await.announcements.get(&id).cloned())
    }

    async fn create(&self, req: CreateAnnouncementRequest) -> Result<Announcement, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_department_ref(req.department_id)?;

        tables.announcement_seq += 1;
        let now = Utc::now();
        let announcement = Announcement {
            id: tables.announcement_seq,
            title: req.title,
            content: req.content,
            audience: req.audience,
            department_id: req.department_id,
            attachment_url: req.attachment_url,
            is_pinned: req.is_pinned,
            created_at: now,
            updated_at: now,
        };
        tables
            .announcements
            .insert(announcement.id, announcement.clone());
        Ok(announcement)
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.announcements.contains_key(&id) {
            return Ok(None);
        }
        tables.check_department_ref(req.department_id)?;

        let Some(announcement) = tables.announcements.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(title) = req.title {
            announcement.title = title;
        }
        if let Some(content) = req.content {
            announcement.content = content;
        }
        if let Some(audience) = req.audience {
            announcement.audience = audience;
        }
        if let Some(department_id) = req.department_id {
            announcement.department_id = Some(department_id);
        }
        if let Some(url) = req.attachment_url {
            announcement.attachment_url = Some(url);
        }
        if let Some(pinned) = req.is_pinned {
            announcement.is_pinned = pinned;
        }
        announcement.updated_at = Utc::now();
        Ok(Some(announcement.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.announcements.remove(&id).is_some())
    }
}

#[async_trait]
impl DepartmentRepository for MemoryStore {
    async fn list(&self) -> Result<Vec<Department>, AppError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Department> = tables.departments.values().cloned().collect();
        items.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Department>, AppError> {
        Ok(self.tables.read().await.departments.get(&id).cloned())
    }

    async fn create(&self, req: CreateDepartmentRequest) -> Result<Department, AppError> {
        let mut tables = self.tables.write().await;
        tables.check_department_unique(None, Some(&req.code), Some(&req.name))?;

        tables.department_seq += 1;
        let now = Utc::now();
        let department = Department {
            id: tables.department_seq,
            code: req.code,
            name: req.name,
            description: req.description,
            faculty_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        tables.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateDepartmentRequest,
    ) -> Result<Option<Department>, AppError> {
        let mut tables = self.tables.write().await;
        if !tables.departments.contains_key(&id) {
            return Ok(None);
        }
        tables.check_department_unique(Some(id), req.code.as_deref(), req.name.as_deref())?;

        let Some(department) = tables.departments.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(code) = req.code {
            department.code = code;
        }
        if let Some(name) = req.name {
            department.name = name;
        }
        if let Some(description) = req.description {
            department.description = Some(description);
        }
        department.updated_at = Utc::now();
        Ok(Some(department.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        if tables.departments.remove(&id).is_none() {
            return Ok(false);
        }
        // ON DELETE SET NULL
        for announcement in tables.announcements.values_mut() {
            if announcement.department_id == Some(id) {
                announcement.department_id = None;
            }
        }
        Ok(true)
    }

    async fn add_faculty(&self, id: i64, faculty_id: i64) -> Result<Option<Department>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(department) = tables.departments.get_mut(&id) else {
            return Ok(None);
        };

        match department.faculty_ids.binary_search(&faculty_id) {
            Ok(_) => Err(faculty_already_assigned(id, faculty_id)),
            Err(pos) => {
                department.faculty_ids.insert(pos, faculty_id);
                department.updated_at = Utc::now();
                Ok(Some(department.clone()))
            }
        }
    }
}

#[async_trait]
impl ExaminationRepository for MemoryStore {
    async fn list(&self, filter: &ExaminationFilter) -> Result<Vec<Examination>, AppError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Examination> = tables
            .examinations
            .values()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        items.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(items)
    }

    async fn list_by_course(&self, course_id: i64) -> Result<Vec<Examination>, AppError> {
        let tables = self.tables.read().await;
        let mut items: Vec<Examination> = tables
            .examinations
            .values()
            .filter(|e| e.course_id == course_id)
            .cloned()
            .collect();
        items.sort_by_key(|e| (e.scheduled_at, e.id));
        Ok(items)
    }

    async fn get(&self, id: i64) -> Result<Option<Examination>, AppError> {
        Ok(self.tables.read().await.examinations.get(&id).cloned())
    }

    async fn create(&self, req: CreateExaminationRequest) -> Result<Examination, AppError> {
        let mut tables = self.tables.write().await;
        tables.examination_seq += 1;
        let now = Utc::now();
        let examination = Examination {
            id: tables.examination_seq,
            course_id: req.course_id,
            title: req.title,
            exam_type: req.exam_type,
            scheduled_at: req.scheduled_at,
            duration_minutes: req.duration_minutes,
            venue: req.venue,
            max_score: req.max_score,
            created_at: now,
            updated_at: now,
        };
        tables
            .examinations
            .insert(examination.id, examination.clone());
        Ok(examination)
    }

    async fn update(
        &self,
        id: i64,
        req: UpdateExaminationRequest,
    ) -> Result<Option<Examination>, AppError> {
        let mut tables = self.tables.write().await;
        let Some(examination) = tables.examinations.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(course_id) = req.course_id {
            examination.course_id = course_id;
        }
        if let Some(title) = req.title {
            examination.title = title;
        }
        if let Some(exam_type) = req.exam_type {
            examination.exam_type = exam_type;
        }
        if let Some(scheduled_at) = req.scheduled_at {
            examination.scheduled_at = scheduled_at;
        }
        if let Some(duration) = req.duration_minutes {
            examination.duration_minutes = duration;
        }
        if let Some(venue) = req.venue {
            examination.venue = Some(venue);
        }
        if let Some(max_score) = req.max_score {
            examination.max_score = max_score;
        }
        examination.updated_at = Utc::now();
        Ok(Some(examination.clone()))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        Ok(self.tables.write().await.examinations.remove(&id).is_some())
    }
}

#[async_trait]
impl HealthCheck for MemoryStore {
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
