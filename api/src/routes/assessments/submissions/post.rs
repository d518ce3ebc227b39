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
use crate::response::ApiResponse;
use crate::routes::assessments::common::{SubmissionResponse, error_status};
use crate::state::AppState;
use db::models::assessment::Entity as AssessmentEntity;
use db::models::assessment_submission::{Model as SubmissionModel, SubmissionContent};

/// Request body for submitting work to an assessment. Which fields are
/// meaningful depends on the assessment's submission type, but at least one
/// content field must be present.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitRequest {
    pub content_text: Option<String>,
    #[validate(url(message = "file_url must be a valid URL"))]
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    #[validate(url(message = "github_url must be a valid URL"))]
    pub github_url: Option<String>,
    #[validate(url(message = "website_url must be a valid URL"))]
    pub website_url: Option<String>,
}

impl From<SubmitRequest> for SubmissionContent {
    fn from(req: SubmitRequest) -> Self {
        SubmissionContent {
            text: req.content_text,
            file_url: req.file_url,
            file_name: req.file_name,
            github_url: req.github_url,
            website_url: req.website_url,
        }
    }
}

/// POST /api/assessments/{assessment_id}/submissions
///
/// Submit work for an assessment as the authenticated student. Each student
/// may submit at most once per assessment. Late submissions are accepted only
/// if the assessment allows them, and are flagged for penalty at grading time.
///
/// ### Request Body
/// ```json
/// { "content_text": "My essay...", "file_url": null, "github_url": null }
/// ```
///
/// ### Responses
///
/// - `201 Created` with the stored submission
/// - `400 Bad Request` (no content, or malformed URL)
/// - `403 Forbidden` (assessment not published)
/// - `404 Not Found`
/// - `409 Conflict` (student already submitted)
/// - `422 Unprocessable Entity` (past due and late submissions not allowed)
/// - `500 Internal Server Error`
pub async fn submit_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
    Json(req): Json<SubmitRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let message = common::format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<SubmissionResponse>::error(message)),
        );
    }

    let content = SubmissionContent::from(req);
    if content.is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<SubmissionResponse>::error(
                "Submission must include content",
            )),
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

    match SubmissionModel::submit(state.db(), &assessment, claims.sub, content, Utc::now()).await {
        Ok(submission) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                SubmissionResponse::from(submission),
                "Submission received",
            )),
        ),
        Err(e) => (
            error_status(&e),
            Json(ApiResponse::<SubmissionResponse>::error(e.to_string())),
        ),
    }
}
