use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder};
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::auth::policy::{self, AssessmentAction};
use crate::response::ApiResponse;
use crate::routes::assessments::common::{
    AssessmentResponse, SubmissionResponse, error_status,
};
use crate::routes::common::Paginated;
use crate::state::AppState;
use db::models::assessment::{Column as AssessmentColumn, Entity as AssessmentEntity};
use db::models::assessment_submission::{
    Column as SubmissionColumn, Entity as SubmissionEntity,
};

#[derive(Debug, Deserialize)]
pub struct FilterReq {
    pub course_id: Option<i64>,
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /api/assessments
///
/// Retrieve a paginated list of assessments, sorted by due date ascending.
///
/// Visibility is role-scoped before the query runs: students see only
/// published assessments, instructors without admin rights see only their own
/// (published or not), admins see everything.
///
/// ### Query Parameters
/// - `course_id` (optional, i64): Restrict to one course
/// - `status` (optional, string): `published` or `unpublished`
/// - `page` (optional, u64): Page number, defaults to 1, minimum 1
/// - `limit` (optional, u64): Items per page, defaults to 20, maximum 100
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "message": "Assessments retrieved successfully",
///   "data": {
///     "items": [
///       {
///         "id": 123,
///         "course_id": 456,
///         "title": "Prac 1",
///         "due_date": "2024-01-10T00:00:00+00:00",
///         "is_published": true
///       }
///     ],
///     "page": 1,
///     "limit": 20,
///     "total": 1,
///     "total_pages": 1,
///     "has_next": false,
///     "has_prev": false
///   }
/// }
/// ```
///
/// - `400 Bad Request` (invalid `status` value)
/// - `500 Internal Server Error`
pub async fn get_assessments(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Query(params): Query<FilterReq>,
) -> impl IntoResponse {
    let db = state.db();

    let status_filter = match params.status.as_deref() {
        None => None,
        Some("published") => Some(true),
        Some("unpublished") => Some(false),
        Some(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<Paginated<AssessmentResponse>>::error(
                    "Invalid status: expected 'published' or 'unpublished'",
                )),
            );
        }
    };

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(20).clamp(1, 100);

    let mut query = AssessmentEntity::find();

    if let Some(course_id) = params.course_id {
        query = query.filter(AssessmentColumn::CourseId.eq(course_id));
    }

    // Visibility scope, folded into the base filter before anything runs.
    if claims.admin {
        // Admins see everything.
    } else if claims.instructor {
        query = query.filter(AssessmentColumn::InstructorId.eq(claims.sub));
    } else {
        query = query.filter(AssessmentColumn::IsPublished.eq(true));
    }

    if let Some(published) = status_filter {
        query = query.filter(AssessmentColumn::IsPublished.eq(published));
    }

    let paginator = query
        .order_by_asc(AssessmentColumn::DueDate)
        .paginate(db, limit);

    let total = match paginator.num_items().await {
        Ok(n) => n,
        Err(e) => {
            tracing::error!(error = %e, "Failed to count assessments");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Paginated<AssessmentResponse>>::error(
                    "Failed to retrieve assessments",
                )),
            );
        }
    };

    match paginator.fetch_page(page - 1).await {
        Ok(items) => {
            let items: Vec<AssessmentResponse> =
                items.into_iter().map(AssessmentResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Paginated::new(items, page, limit, total),
                    "Assessments retrieved successfully",
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch assessments page");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<Paginated<AssessmentResponse>>::error(
                    "Failed to retrieve assessments",
                )),
            )
        }
    }
}

#[derive(Debug, serde::Serialize, Default)]
pub struct AssessmentDetailResponse {
    #[serde(flatten)]
    pub assessment: Option<AssessmentResponse>,
    pub submissions: Vec<SubmissionResponse>,
}

/// GET /api/assessments/{assessment_id}
///
/// Retrieve a specific assessment along with its submissions.
///
/// Unpublished assessments are only visible to the owning instructor or an
/// admin. For a plain student viewer, the submissions collection is redacted
/// server-side to their own submission only.
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "message": "Assessment retrieved successfully",
///   "data": {
///     "id": 123,
///     "title": "Prac 1",
///     "is_published": true,
///     "submissions": [
///       { "id": 9, "student_id": 42, "is_late": false, "status": "submitted" }
///     ]
///   }
/// }
/// ```
///
/// - `403 Forbidden` (not published and viewer is not the owner/admin)
/// - `404 Not Found`
/// - `500 Internal Server Error`
pub async fn get_assessment(
    State(state): State<AppState>,
    AuthUser(claims): AuthUser,
    Path(assessment_id): Path<i64>,
) -> impl IntoResponse {
    let db = state.db();

    let assessment = match AssessmentEntity::find_by_id(assessment_id).one(db).await {
        Ok(Some(a)) => a,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<AssessmentDetailResponse>::error(
                    "Assessment not found",
                )),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch assessment");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentDetailResponse>::error(
                    "Failed to retrieve assessment",
                )),
            );
        }
    };

    if let Err(e) = policy::authorize(&claims, &assessment, AssessmentAction::View) {
        return (
            error_status(&e),
            Json(ApiResponse::<AssessmentDetailResponse>::error(e.to_string())),
        );
    }

    let mut submissions_query = SubmissionEntity::find()
        .filter(SubmissionColumn::AssessmentId.eq(assessment.id));

    // A plain student only ever sees their own submission.
    if !policy::is_owner(&claims, &assessment) {
        submissions_query = submissions_query.filter(SubmissionColumn::StudentId.eq(claims.sub));
    }

    match submissions_query
        .order_by_asc(SubmissionColumn::Id)
        .all(db)
        .await
    {
        Ok(submissions) => {
            let response = AssessmentDetailResponse {
                assessment: Some(AssessmentResponse::from(assessment)),
                submissions: submissions
                    .into_iter()
                    .map(SubmissionResponse::from)
                    .collect(),
            };
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    response,
                    "Assessment retrieved successfully",
                )),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, assessment_id, "Failed to fetch submissions");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<AssessmentDetailResponse>::error(
                    "Failed to retrieve submissions",
                )),
            )
        }
    }
}
