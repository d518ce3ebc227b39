//! Request/response shapes shared by the assessment route group, plus the
//! single mapping from engine errors to HTTP status codes.

use axum::http::StatusCode;
use db::error::AssessmentError;
use db::models::assessment::{
    AssessmentType, Model as AssessmentModel, RubricItem, SubmissionType,
};
use db::models::assessment_submission::Model as SubmissionModel;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Maps every engine error to its HTTP status. This is the one place the
/// taxonomy meets the transport.
pub fn error_status(err: &AssessmentError) -> StatusCode {
    match err {
        AssessmentError::Validation(_) => StatusCode::BAD_REQUEST,
        AssessmentError::NotFound(_) => StatusCode::NOT_FOUND,
        AssessmentError::Forbidden(_) => StatusCode::FORBIDDEN,
        AssessmentError::NotPublished => StatusCode::FORBIDDEN,
        AssessmentError::DuplicateSubmission => StatusCode::CONFLICT,
        AssessmentError::SubmissionClosed => StatusCode::UNPROCESSABLE_ENTITY,
        AssessmentError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// One rubric criterion as accepted on create/update.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RubricItemRequest {
    #[validate(length(min = 1, message = "Rubric criteria must not be empty"))]
    pub criteria: String,
    pub max_points: f64,
    pub description: Option<String>,
}

impl From<RubricItemRequest> for RubricItem {
    fn from(item: RubricItemRequest) -> Self {
        Self {
            criteria: item.criteria,
            max_points: item.max_points,
            description: item.description,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateAssessmentRequest {
    pub course_id: i64,
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    #[validate(length(min = 1, message = "Instructions are required"))]
    pub instructions: String,
    pub assessment_type: AssessmentType,
    pub max_points: f64,
    pub due_date: chrono::DateTime<chrono::Utc>,
    pub submission_type: SubmissionType,
    #[serde(default)]
    pub allow_late_submission: bool,
    #[validate(range(min = 0.0, max = 100.0, message = "Late penalty must be between 0 and 100"))]
    #[serde(default)]
    pub late_penalty: f64,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size: Option<i64>,
    #[validate(nested)]
    #[serde(default)]
    pub rubric: Vec<RubricItemRequest>,
}

impl CreateAssessmentRequest {
    /// Range checks the derive can't express. Returns the first violation.
    pub fn check_ranges(&self) -> Result<(), String> {
        if self.max_points <= 0.0 {
            return Err("max_points must be a positive number".into());
        }
        if let Some(size) = self.max_file_size {
            if size <= 0 {
                return Err("max_file_size must be a positive number".into());
            }
        }
        if self.rubric.iter().any(|item| item.max_points <= 0.0) {
            return Err("Rubric items must have positive max_points".into());
        }
        Ok(())
    }
}

/// Partial update: every field optional, absent fields untouched. The course,
/// the owning instructor, and the submissions are never updatable.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateAssessmentRequest {
    #[validate(length(min = 1, message = "Title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "Description must not be empty"))]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Instructions must not be empty"))]
    pub instructions: Option<String>,
    pub assessment_type: Option<AssessmentType>,
    pub max_points: Option<f64>,
    pub due_date: Option<chrono::DateTime<chrono::Utc>>,
    pub submission_type: Option<SubmissionType>,
    pub allow_late_submission: Option<bool>,
    #[validate(range(min = 0.0, max = 100.0, message = "Late penalty must be between 0 and 100"))]
    pub late_penalty: Option<f64>,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size: Option<i64>,
    #[validate(nested)]
    pub rubric: Option<Vec<RubricItemRequest>>,
}

impl UpdateAssessmentRequest {
    pub fn check_ranges(&self) -> Result<(), String> {
        if let Some(points) = self.max_points {
            if points <= 0.0 {
                return Err("max_points must be a positive number".into());
            }
        }
        if let Some(size) = self.max_file_size {
            if size <= 0 {
                return Err("max_file_size must be a positive number".into());
            }
        }
        if let Some(rubric) = &self.rubric {
            if rubric.iter().any(|item| item.max_points <= 0.0) {
                return Err("Rubric items must have positive max_points".into());
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize, Default)]
pub struct AssessmentResponse {
    pub id: i64,
    pub course_id: i64,
    pub instructor_id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub assessment_type: String,
    pub max_points: f64,
    pub due_date: String,
    pub allow_late_submission: bool,
    pub late_penalty: f64,
    pub submission_type: String,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size: Option<i64>,
    pub rubric: Vec<RubricItem>,
    pub is_published: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<AssessmentModel> for AssessmentResponse {
    fn from(a: AssessmentModel) -> Self {
        Self {
            id: a.id,
            course_id: a.course_id,
            instructor_id: a.instructor_id,
            title: a.title,
            description: a.description,
            instructions: a.instructions,
            assessment_type: a.assessment_type.to_string(),
            max_points: a.max_points,
            due_date: a.due_date.to_rfc3339(),
            allow_late_submission: a.allow_late_submission,
            late_penalty: a.late_penalty,
            submission_type: a.submission_type.to_string(),
            allowed_file_types: a.allowed_file_types.map(|t| t.0),
            max_file_size: a.max_file_size,
            rubric: a.rubric.0,
            is_published: a.is_published,
            created_at: a.created_at.to_rfc3339(),
            updated_at: a.updated_at.to_rfc3339(),
        }
    }
}

/// The grade block, present only once a submission has been graded.
#[derive(Debug, Serialize, Default)]
pub struct GradeResponse {
    pub points: f64,
    pub feedback: Option<String>,
    pub graded_at: String,
    pub graded_by: i64,
}

#[derive(Debug, Serialize, Default)]
pub struct SubmissionResponse {
    pub id: i64,
    pub assessment_id: i64,
    pub student_id: i64,
    pub content_text: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
    pub is_late: bool,
    pub submitted_at: String,
    pub status: String,
    pub grade: Option<GradeResponse>,
}

impl From<SubmissionModel> for SubmissionResponse {
    fn from(s: SubmissionModel) -> Self {
        let grade = match (s.grade_points, s.graded_at, s.graded_by) {
            (Some(points), Some(graded_at), Some(graded_by)) => Some(GradeResponse {
                points,
                feedback: s.grade_feedback.clone(),
                graded_at: graded_at.to_rfc3339(),
                graded_by,
            }),
            _ => None,
        };

        Self {
            id: s.id,
            assessment_id: s.assessment_id,
            student_id: s.student_id,
            content_text: s.content_text,
            file_url: s.file_url,
            file_name: s.file_name,
            github_url: s.github_url,
            website_url: s.website_url,
            is_late: s.is_late,
            submitted_at: s.submitted_at.to_rfc3339(),
            status: s.status.to_string(),
            grade,
        }
    }
}
