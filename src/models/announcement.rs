// src/models/announcement.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use url::Url;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{UnknownVariant, not_blank};

/// Who an announcement is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    #[default]
    All,
    Students,
    Faculty,
    Staff,
}

impl Audience {
    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::All => "all",
            Audience::Students => "students",
            Audience::Faculty => "faculty",
            Audience::Staff => "staff",
        }
    }
}

impl TryFrom<String> for Audience {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "all" => Ok(Audience::All),
            "students" => Ok(Audience::Students),
            "faculty" => Ok(Audience::Faculty),
            "staff" => Ok(Audience::Staff),
            _ => Err(UnknownVariant {
                kind: "audience",
                value,
            }),
        }
    }
}

/// Represents the 'announcements' table in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Announcement {
    pub id: i64,

    pub title: String,

    /// Sanitized HTML body.
    pub content: String,

    #[sqlx(try_from = "String")]
    pub audience: Audience,

    /// Publishing department, if any. Cleared when the department is deleted.
    pub department_id: Option<i64>,

    pub attachment_url: Option<String>,

    /// Pinned announcements are listed first.
    pub is_pinned: bool,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Upper bound on stored content, counted in characters after sanitization.
pub const MAX_CONTENT_CHARS: usize = 20000;

/// DTO for creating a new announcement.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAnnouncementRequest {
    #[validate(length(min = 1, max = 200), custom(function = not_blank))]
    pub title: String,
    #[validate(length(min = 1, max = 20000), custom(function = not_blank))]
    pub content: String,
    #[serde(default)]
    pub audience: Audience,
    #[validate(range(min = 1))]
    pub department_id: Option<i64>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub is_pinned: bool,
}

/// DTO for updating an announcement. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateAnnouncementRequest {
    #[validate(length(min = 1, max = 200), custom(function = not_blank))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 20000), custom(function = not_blank))]
    pub content: Option<String>,
    pub audience: Option<Audience>,
    #[validate(range(min = 1))]
    pub department_id: Option<i64>,
    #[validate(length(max = 500), custom(function = validate_url_string))]
    pub attachment_url: Option<String>,
    pub is_pinned: Option<bool>,
}

impl UpdateAnnouncementRequest {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.audience.is_none()
            && self.department_id.is_none()
            && self.attachment_url.is_none()
            && self.is_pinned.is_none()
    }
}

/// Query parameters for listing announcements.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AnnouncementFilter {
    pub audience: Option<Audience>,
    pub department_id: Option<i64>,
    pub pinned: Option<bool>,
}

impl AnnouncementFilter {
    pub fn matches(&self, announcement: &Announcement) -> bool {
        self.audience.is_none_or(|a| a == announcement.audience)
            && self
                .department_id
                .is_none_or(|d| announcement.department_id == Some(d))
            && self.pinned.is_none_or(|p| p == announcement.is_pinned)
    }
}

/// Validates that a string is a correctly formatted absolute URL.
fn validate_url_string(url: &str) -> Result<(), validator::ValidationError> {
    if Url::parse(url).is_err() {
        return Err(validator::ValidationError::new("invalid_url"));
    }
    Ok(())
}
