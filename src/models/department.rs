// src/models/department.rs

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

/// Short uppercase department code, e.g. "CS" or "EE2".
static DEPARTMENT_CODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9]{1,9}$").expect("department code pattern"));

/// Represents the 'departments' table joined with its faculty associations.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Department {
    pub id: i64,

    /// Unique department code.
    #[schema(example = "CS")]
    pub code: String,

    /// Unique display name.
    #[schema(example = "Computer Science")]
    pub name: String,

    pub description: Option<String>,

    /// Ids of the faculty members associated with this department, ascending.
    /// Aggregated from the 'department_faculty' table.
    pub faculty_ids: Vec<i64>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new department.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateDepartmentRequest {
    #[validate(custom(function = validate_department_code))]
    pub code: String,
    #[validate(length(min = 1, max = 120), custom(function = not_blank))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

/// DTO for updating a department. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateDepartmentRequest {
    #[validate(custom(function = validate_department_code))]
    pub code: Option<String>,
    #[validate(length(min = 1, max = 120), custom(function = not_blank))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
}

impl UpdateDepartmentRequest {
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.name.is_none() && self.description.is_none()
    }
}

fn validate_department_code(code: &str) -> Result<(), validator::ValidationError> {
    if !DEPARTMENT_CODE.is_match(code) {
        return Err(validator::ValidationError::new("invalid_department_code"));
    }
    Ok(())
}
