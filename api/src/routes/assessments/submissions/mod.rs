//! Routes for assessment submissions, nested under
//! `/api/assessments/{assessment_id}/submissions`.

pub mod get;
pub mod post;
pub mod put;

use axum::{
    Router,
    routing::{post, put},
};

use crate::state::AppState;
use get::list_submissions;
use post::submit_assessment;
use put::grade_submission;

/// Builds the `/submissions` route group. All routes assume an authenticated
/// user; per-route policy checks happen in the handlers.
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(submit_assessment).get(list_submissions))
        .route("/{submission_id}/grade", put(grade_submission))
}
