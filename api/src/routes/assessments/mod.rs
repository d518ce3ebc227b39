//! Assessment routes module.
//!
//! Provides the `/assessments` route group:
//! - Create, read, update, delete assessments
//! - Publish/unpublish (the visibility and submission gate)
//! - Nested submission routes: submit, list, grade
//!
//! The group sits behind the `allow_authenticated` guard; per-action
//! authorization (ownership, publication visibility) is applied by the
//! policy module inside each handler.

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::state::AppState;
use delete::delete_assessment;
use get::{get_assessment, get_assessments};
use post::create_assessment;
use put::{edit_assessment, publish_assessment, unpublish_assessment};
use submissions::submission_routes;

pub mod common;
pub mod delete;
pub mod get;
pub mod post;
pub mod put;
pub mod submissions;

/// Builds and returns the `/assessments` route group.
///
/// Routes:
/// - `POST   /assessments`                            → Create a new assessment (course instructor or admin)
/// - `GET    /assessments`                            → List assessments (role-scoped visibility)
/// - `GET    /assessments/{assessment_id}`            → Get assessment details (submissions redacted per viewer)
/// - `PUT    /assessments/{assessment_id}`            → Edit assessment (owner or admin)
/// - `PUT    /assessments/{assessment_id}/publish`    → Publish (owner or admin)
/// - `PUT    /assessments/{assessment_id}/unpublish`  → Unpublish (owner or admin)
/// - `DELETE /assessments/{assessment_id}`            → Delete assessment and its submissions (owner or admin)
///
/// Nested routes:
/// - Submissions routes → `submission_routes`
pub fn assessment_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_assessment))
        .route("/", get(get_assessments))
        .route("/{assessment_id}", get(get_assessment))
        .route("/{assessment_id}", put(edit_assessment))
        .route("/{assessment_id}", delete(delete_assessment))
        .route("/{assessment_id}/publish", put(publish_assessment))
        .route("/{assessment_id}/unpublish", put(unpublish_assessment))
        .nest("/{assessment_id}/submissions", submission_routes())
}
