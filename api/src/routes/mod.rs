//! HTTP route entry point for `/api/...`.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/assessments` → Assessment lifecycle: CRUD, publication, submissions,
//!   grading (authenticated users; per-action authorization inside)

use crate::auth::guards::allow_authenticated;
use crate::routes::{assessments::assessment_routes, health::health_routes};
use crate::state::AppState;
use axum::{Router, middleware::from_fn};

pub mod assessments;
pub mod common;
pub mod health;

/// Builds the complete application router for all HTTP endpoints.
///
/// - `/health` requires no authentication.
/// - `/assessments` is gated by `allow_authenticated`; everything finer
///   grained (ownership, publication visibility) is decided per action by
///   the authorization policy inside the handlers.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest(
            "/assessments",
            assessment_routes().route_layer(from_fn(allow_authenticated)),
        )
        .with_state(app_state)
}
