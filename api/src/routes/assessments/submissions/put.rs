use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::EntityTrait;
use serde::Deserialize;
use validator::Validate;

use crate::auth::AuthUser;
use crate::auth::policy::{self, AssessmentAction};
use crate::response::ApiResponse;
use crate::routes::assessments::common::{SubmissionResponse, error_status};
use crate::state::AppState;
use db::models::assessment::Entity as AssessmentEntity;
use db::models::assessment_submission::Model as SubmissionModel;

#[derive(Debug, Deserialize, Validate)]
pub struct GradeRequest {
    /// Raw points awarded before any late penalty is applied.
    #[validate(range(min = 0.0, message = "points must not be negative"))]
    pub points: f64,
    pub feedback: Option<String>,
}

/// PUT /api/assessments/{assessment_id}/submissions/{submission_id}/grade
///
/// Grade a submission. The points given are the raw score; if the submission
/// was late and the assessment carries a late penalty, the stored grade is
/// reduced by the penalty per day late, floored at zero. Re-grading replaces
/// the previous grade. Owner or admin only.
///
/// ### Request Body
/// ```json
/// { "points": 90.0, "feedback": "Good work, but submitted late." }
/// ```
///
/// ### Responses
///
/// - `200 OK` with the graded submission
/// - `400 Bad Request` (negative points)
/// - `403 Forbidden`
/// - `404 Not Found` (assessment or submission)
/// - `500 Internal Server Error`
pub async fn grade_submission(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path((assessment_id, submission_id)): Path<(i64, i64)>,
    Json(req): Json<GradeRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<SubmissionResponse>::error(message)),
        );
    }

    let assessment = match AssessmentEntity::find_by_id(assessment_id)
        .one(state.db())
        .await
    {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<SubmissionResponse>::error(
                    "Assessment not found",
                )),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch assessment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<SubmissionResponse>::error(
                    "Failed to retrieve assessment",
                )),
            );
        }
    };

    // Resolve both resources before the authorization check: a missing
    // submission is a 404 even for a caller who could not grade it.
    let submission =
        match SubmissionModel::get_for_assessment(state.db(), assessment_id, submission_id).await {
            Ok(s) => s,
            Err(e @ db::error::AssessmentError::NotFound(_)) => {
                return (error_status(&e), Json(ApiResponse::error(e.to_string())));
            }
            Err(e) => {
                tracing::error!(error = %e, submission_id, "Failed to fetch submission");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<SubmissionResponse>::error(
                        "Failed to retrieve submission",
                    )),
                );
            }
        };

    if let Err(e) = policy::authorize(&claims, &assessment, AssessmentAction::Grade) {
        return (
            error_status(&e),
            Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
        );
    }

    match submission
        .grade(
            state.db(),
            &assessment,
            req.points,
            req.feedback,
            claims.sub,
            Utc::now(),
        )
        .await
    {
        Ok(graded) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SubmissionResponse::from(graded),
                "Submission graded successfully",
            )),
        ),
        Err(e) => (
            error_status(&e),
            Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
        ),
    }
}
