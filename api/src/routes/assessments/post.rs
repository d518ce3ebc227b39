use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use validator::Validate;

use crate::auth::AuthUser;
use crate::auth::policy;
use crate::response::ApiResponse;
use crate::routes::assessments::common::{
    AssessmentResponse, CreateAssessmentRequest, error_status,
};
use crate::state::AppState;
use db::models::assessment::{Model as AssessmentModel, NewAssessment};
use db::models::course::Model as CourseModel;

/// POST /api/assessments
///
/// Create a new assessment in a course. Allowed for admins, and for
/// instructors creating in a course they own. The assessment starts
/// unpublished.
///
/// ### Request Body
/// ```json
/// {
///   "course_id": 456,
///   "title": "Prac 1",
///   "description": "First practical",
///   "instructions": "Submit your write-up",
///   "assessment_type": "assignment",
///   "max_points": 100,
///   "due_date": "2024-01-10T00:00:00Z",
///   "submission_type": "text",
///   "allow_late_submission": true,
///   "late_penalty": 20,
///   "rubric": [
///     { "criteria": "Correctness", "max_points": 60 },
///     { "criteria": "Style", "max_points": 40 }
///   ]
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created` with the created assessment
/// - `400 Bad Request` (validation failure; first violation reported)
/// - `403 Forbidden` (not the course instructor, not admin)
/// - `404 Not Found` (course does not exist)
/// - `500 Internal Server Error`
pub async fn create_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Json(req): Json<CreateAssessmentRequest>,
) -> impl IntoResponse {
    let db = state.db();

    if let Err(validation_errors) = req.validate() {
        let message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<AssessmentResponse>::error(message)),
        );
    }
    if let Err(message) = req.check_ranges() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<AssessmentResponse>::error(message)),
        );
    }

    let course = match CourseModel::get_by_id(db, req.course_id).await {
        Ok(Some(c)) => c,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<AssessmentResponse>::error("Course not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, course_id = req.course_id, "Failed to fetch course");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentResponse>::error(
                    "Failed to retrieve course",
                )),
            );
        }
    };

    if let Err(e) = policy::can_create(&claims, &course) {
        return (
            error_status(&e),
            Json(ApiResponse::<AssessmentResponse>::error(e.to_string())),
        );
    }

    let new = NewAssessment {
        course_id: course.id,
        instructor_id: course.instructor_id,
        title: req.title,
        description: req.description,
        instructions: req.instructions,
        assessment_type: req.assessment_type,
        max_points: req.max_points,
        due_date: req.due_date,
        allow_late_submission: req.allow_late_submission,
        late_penalty: req.late_penalty,
        submission_type: req.submission_type,
        allowed_file_types: req.allowed_file_types,
        max_file_size: req.max_file_size,
        rubric: req.rubric.into_iter().map(Into::into).collect(),
    };

    match AssessmentModel::create(db, new).await {
        Ok(assessment) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                AssessmentResponse::from(assessment),
                "Assessment created successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Failed to create assessment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentResponse>::error(
                    "Failed to create assessment",
                )),
            )
        }
    }
}
