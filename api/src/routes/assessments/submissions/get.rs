use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};

use crate::auth::AuthUser;
use crate::auth::policy::{self, AssessmentAction};
use crate::response::ApiResponse;
use crate::routes::assessments::common::{SubmissionResponse, error_status};
use crate::routes::common::{Paginated, PaginationQuery};
use crate::state::AppState;
use db::models::assessment::Entity as AssessmentEntity;
use db::models::assessment_submission::{Column as SubmissionColumn, Entity as SubmissionEntity};

/// GET /api/assessments/{assessment_id}/submissions
///
/// List all submissions for an assessment, newest first. Restricted to the
/// owning instructor and admins; students see their own submission through
/// the assessment detail endpoint instead.
///
/// ### Query Parameters
/// - `page` (default 1)
/// - `limit` (default 20, max 100)
///
/// ### Responses
///
/// - `200 OK` with a paginated list
/// - `403 Forbidden`
/// - `404 Not Found`
/// - `500 Internal Server Error`
pub async fn list_submissions(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
    Query(query): Query<PaginationQuery>,
) -> impl IntoResponse {
    let assessment = match AssessmentEntity::find_by_id(assessment_id)
        .one(state.db())
        .await
    {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<Paginated<SubmissionResponse>>::error(
                    "Assessment not found",
                )),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch assessment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Paginated<SubmissionResponse>>::error(
                    "Failed to retrieve assessment",
                )),
            );
        }
    };

    if let Err(e) = policy::authorize(&claims, &assessment, AssessmentAction::ListSubmissions) {
        return (
            error_status(&e),
            Json(ApiResponse::<Paginated<SubmissionResponse>>::error(
                e.to_string(),
            )),
        );
    }

    let (page, limit) = query.normalize();
    let paginator = SubmissionEntity::find()
        .filter(SubmissionColumn::AssessmentId.eq(assessment_id))
        .order_by_desc(SubmissionColumn::SubmittedAt)
        .paginate(state.db(), limit);

    let total = match paginator.num_items().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to count submissions");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Paginated<SubmissionResponse>>::error(
                    "Failed to retrieve submissions",
                )),
            );
        }
    };

    match paginator.fetch_page(page - 1).await {
        Ok(submissions) => {
            let items = submissions
                .into_iter()
                .map(SubmissionResponse::from)
                .collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Paginated::new(items, page, limit, total),
                    "Submissions retrieved successfully",
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Paginated<SubmissionResponse>>::error(
                    "Failed to retrieve submissions",
                )),
            )
        }
    }
}
