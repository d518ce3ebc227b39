use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::EntityTrait;

use crate::auth::AuthUser;
use crate::auth::policy::{self, AssessmentAction};
use crate::response::ApiResponse;
use crate::routes::assessments::common::error_status;
use crate::state::AppState;
use db::models::assessment::{Entity as AssessmentEntity, Model as AssessmentModel};

/// DELETE /api/assessments/{assessment_id}
///
/// Delete an assessment and all of its submissions. Only the owning
/// instructor or an admin may delete.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// { "success": true, "data": null, "message": "Assessment deleted successfully" }
/// ```
/// - `403 Forbidden`
/// - `404 Not Found`
/// - `500 Internal Server Error`
pub async fn delete_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
) -> impl IntoResponse {
    let assessment = match AssessmentEntity::find_by_id(assessment_id)
        .one(state.db())
        .await
    {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Assessment not found")),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch assessment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to retrieve assessment")),
            );
        }
    };

    if let Err(e) = policy::authorize(&claims, &assessment, AssessmentAction::Delete) {
        return (error_status(&e), Json(ApiResponse::<()>::error(e.to_string())));
    }

    match AssessmentModel::delete_by_id(state.db(), assessment_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::<()>::success(
                (),
                "Assessment deleted successfully",
            )),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Assessment not found")),
        ),
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to delete assessment");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error("Failed to delete assessment")),
            )
        }
    }
}
