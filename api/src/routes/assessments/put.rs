use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use sea_orm::{ActiveModelTrait, EntityTrait, IntoActiveModel, Set};
use validator::Validate;

use crate::auth::AuthUser;
use crate::auth::policy::{self, AssessmentAction};
use crate::response::ApiResponse;
use crate::routes::assessments::common::{
    AssessmentResponse, UpdateAssessmentRequest, error_status,
};
use crate::state::AppState;
use db::models::assessment::{
    AllowedFileTypes, Entity as AssessmentEntity, Model as AssessmentModel, Rubric,
};

async fn load_owned_assessment(
    state: &AppState,
    claims: &crate::auth::Claims,
    assessment_id: i64,
    action: AssessmentAction,
) -> Result<AssessmentModel, (StatusCode, Json<ApiResponse<AssessmentResponse>>)> {
    let assessment = match AssessmentEntity::find_by_id(assessment_id)
        .one(state.db())
        .await
    {
        Ok(Some(a)) => a,
        Ok(None) => {
            return Err((
                StatusCode::NOT_FOUND,
                Json(ApiResponse::error("Assessment not found")),
            ));
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch assessment");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Failed to retrieve assessment")),
            ));
        }
    };

    if let Err(e) = policy::authorize(claims, &assessment, action) {
        return Err((error_status(&e), Json(ApiResponse::error(e.to_string()))));
    }

    Ok(assessment)
}

/// PUT /api/assessments/{assessment_id}
///
/// Partially update an assessment. Only the owning instructor or an admin may
/// edit; absent fields are left untouched. The course, owning instructor,
/// publication state, and submissions cannot be edited through this endpoint.
///
/// ### Responses
///
/// - `200 OK` with the updated assessment
/// - `400 Bad Request` (validation failure)
/// - `403 Forbidden`
/// - `404 Not Found`
/// - `500 Internal Server Error`
pub async fn edit_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
    Json(req): Json<UpdateAssessmentRequest>,
) -> impl IntoResponse {
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

    let assessment =
        match load_owned_assessment(&state, &claims, assessment_id, AssessmentAction::Update).await
        {
            Ok(a) => a,
            Err(resp) => return resp,
        };

    let mut active = assessment.into_active_model();
    if let Some(title) = req.title {
        active.title = Set(title);
    }
    if let Some(description) = req.description {
        active.description = Set(description);
    }
    if let Some(instructions) = req.instructions {
        active.instructions = Set(instructions);
    }
    if let Some(assessment_type) = req.assessment_type {
        active.assessment_type = Set(assessment_type);
    }
    if let Some(max_points) = req.max_points {
        active.max_points = Set(max_points);
    }
    if let Some(due_date) = req.due_date {
        active.due_date = Set(due_date);
    }
    if let Some(submission_type) = req.submission_type {
        active.submission_type = Set(submission_type);
    }
    if let Some(allow_late) = req.allow_late_submission {
        active.allow_late_submission = Set(allow_late);
    }
    if let Some(late_penalty) = req.late_penalty {
        active.late_penalty = Set(late_penalty);
    }
    if let Some(allowed_file_types) = req.allowed_file_types {
        active.allowed_file_types = Set(Some(AllowedFileTypes(allowed_file_types)));
    }
    if let Some(max_file_size) = req.max_file_size {
        active.max_file_size = Set(Some(max_file_size));
    }
    if let Some(rubric) = req.rubric {
        active.rubric = Set(Rubric(rubric.into_iter().map(Into::into).collect()));
    }
    active.updated_at = Set(Utc::now());

    match active.update(state.db()).await {
        Ok(updated) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                AssessmentResponse::from(updated),
                "Assessment updated successfully",
            )),
        ),
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to update assessment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentResponse>::error(
                    "Failed to update assessment",
                )),
            )
        }
    }
}

async fn set_publication(
    state: AppState,
    claims: crate::auth::Claims,
    assessment_id: i64,
    published: bool,
) -> (StatusCode, Json<ApiResponse<AssessmentResponse>>) {
    let assessment =
        match load_owned_assessment(&state, &claims, assessment_id, AssessmentAction::Update).await
        {
            Ok(a) => a,
            Err(resp) => return resp,
        };

    match assessment.set_published(state.db(), published).await {
        Ok(updated) => {
            let message = if published {
                "Assessment published successfully"
            } else {
                "Assessment unpublished successfully"
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(AssessmentResponse::from(updated), message)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, published, "Failed to change publication state");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentResponse>::error(
                    "Failed to update assessment",
                )),
            )
        }
    }
}

/// PUT /api/assessments/{assessment_id}/publish
///
/// Publish an assessment, making it visible to students and opening it for
/// submissions. Owner or admin only.
///
/// ### Responses
/// - `200 OK`, `403 Forbidden`, `404 Not Found`, `500 Internal Server Error`
pub async fn publish_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
) -> impl IntoResponse {
    set_publication(state, claims, assessment_id, true).await
}

/// PUT /api/assessments/{assessment_id}/unpublish
///
/// Unpublish an assessment, hiding it from students and closing submissions.
/// Owner or admin only. Existing submissions are kept.
///
/// ### Responses
/// - `200 OK`, `403 Forbidden`, `404 Not Found`, `500 Internal Server Error`
pub async fn unpublish_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
) -> impl IntoResponse {
    set_publication(state, claims, assessment_id, false).await
}
