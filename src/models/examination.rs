// src/models/examination.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use super::{UnknownVariant, not_blank};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ExamType {
    Midterm,
    Final,
    Quiz,
    Practical,
}

impl ExamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExamType::Midterm => "midterm",
            ExamType::Final => "final",
            ExamType::Quiz => "quiz",
            ExamType::Practical => "practical",
        }
    }
}

impl TryFrom<String> for ExamType {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "midterm" => Ok(ExamType::Midterm),
            "final" => Ok(ExamType::Final),
            "quiz" => Ok(ExamType::Quiz),
            "practical" => Ok(ExamType::Practical),
            _ => Err(UnknownVariant {
                kind: "exam type",
                value,
            }),
        }
    }
}

/// Represents the 'examinations' table in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Examination {
    pub id: i64,

    /// Course the examination belongs to. Courses are managed elsewhere.
    pub course_id: i64,

    pub title: String,

    #[sqlx(try_from = "String")]
    pub exam_type: ExamType,

    pub scheduled_at: DateTime<Utc>,

    pub duration_minutes: i32,

    pub venue: Option<String>,

    pub max_score: i32,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for scheduling a new examination.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateExaminationRequest {
    #[validate(range(min = 1))]
    pub course_id: i64,
    #[validate(length(min = 1, max = 200), custom(function = not_blank))]
    pub title: String,
    pub exam_type: ExamType,
    /// RFC 3339 timestamp.
    pub scheduled_at: DateTime<Utc>,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: i32,
    #[validate(length(max = 200))]
    pub venue: Option<String>,
    #[serde(default = "default_max_score")]
    #[validate(range(min = 1, max = 1000))]
    pub max_score: i32,
}

/// DTO for updating an examination. Fields are optional.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateExaminationRequest {
    #[validate(range(min = 1))]
    pub course_id: Option<i64>,
    #[validate(length(min = 1, max = 200), custom(function = not_blank))]
    pub title: Option<String>,
    pub exam_type: Option<ExamType>,
    pub scheduled_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1, max = 600))]
    pub duration_minutes: Option<i32>,
    #[validate(length(max = 200))]
    pub venue: Option<String>,
    #[validate(range(min = 1, max = 1000))]
    pub max_score: Option<i32>,
}

impl UpdateExaminationRequest {
    pub fn is_empty(&self) -> bool {
        self.course_id.is_none()
            && self.title.is_none()
            && self.exam_type.is_none()
            && self.scheduled_at.is_none()
            && self.duration_minutes.is_none()
            && self.venue.is_none()
            && self.max_score.is_none()
    }
}

/// Query parameters for listing examinations.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ExaminationFilter {
    pub exam_type: Option<ExamType>,
    /// Only examinations scheduled at or after this instant.
    pub from: Option<DateTime<Utc>>,
    /// Only examinations scheduled at or before this instant.
    pub to: Option<DateTime<Utc>>,
}

impl ExaminationFilter {
    /// Returns false when the window is inverted.
    pub fn is_valid(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }

    pub fn matches(&self, exam: &Examination) -> bool {
        self.exam_type.is_none_or(|t| t == exam.exam_type)
            && self.from.is_none_or(|from| exam.scheduled_at >= from)
            && self.to.is_none_or(|to| exam.scheduled_at <= to)
    }
}

fn default_max_score() -> i32 {
    100
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn request_json() -> serde_json::Value {
        serde_json::json!({
            "course_id": 101,
            "title": "Data Structures Midterm",
            "exam_type": "midterm",
            "scheduled_at": "2025-10-20T09:00:00Z",
            "duration_minutes": 120
        })
    }

    #[test]
    fn max_score_defaults_to_100() {
        let req: CreateExaminationRequest = serde_json::from_value(request_json()).unwrap();
        assert_eq!(req.max_score, 100);
        assert_eq!(req.exam_type, ExamType::Midterm);
        assert_eq!(
            req.scheduled_at,
            Utc.with_ymd_and_hms(2025, 10, 20, 9, 0, 0).unwrap()
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let mut json = request_json();
        json["duration_minutes"] = serde_json::json!(0);
        json["course_id"] = serde_json::json!(-4);
        let req: CreateExaminationRequest = serde_json::from_value(json).unwrap();
        let errors = req.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("duration_minutes"));
        assert!(fields.contains_key("course_id"));
    }

    #[test]
    fn unknown_exam_type_fails_to_deserialize() {
        let mut json = request_json();
        json["exam_type"] = serde_json::json!("oral");
        assert!(serde_json::from_value::<CreateExaminationRequest>(json).is_err());
    }

    #[test]
    fn inverted_window_is_invalid() {
        let filter = ExaminationFilter {
            exam_type: None,
            from: Some(Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2025, 11, 1, 0, 0, 0).unwrap()),
        };
        assert!(!filter.is_valid());
        assert!(ExaminationFilter::default().is_valid());
    }
}
