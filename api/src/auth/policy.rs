//! Per-action authorization policy for assessments.
//!
//! Role branching lives here and only here: every handler asks this module
//! exactly once per action, so the rule table stays in one place instead of
//! being scattered through route code.

use crate::auth::claims::Claims;
use db::error::AssessmentError;
use db::models::{assessment, course};

/// Actions a principal can attempt against an existing assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssessmentAction {
    View,
    Update,
    Delete,
    Grade,
    ListSubmissions,
}

/// Whether the principal owns the assessment outright: admins own everything,
/// instructors own what they created.
pub fn is_owner(claims: &Claims, assessment: &assessment::Model) -> bool {
    claims.admin || claims.sub == assessment.instructor_id
}

/// Decides whether `claims` may perform `action` on `assessment`.
///
/// - `View` is allowed once published, or always for the owner/admin; the
///   denial carries the "not published" reason.
/// - `Update`/`Delete`/`Grade`/`ListSubmissions` are owner/admin only.
///
/// Submitting is deliberately absent: any authenticated principal may
/// attempt a submission, and the lifecycle engine applies the publication
/// and timing gates itself.
pub fn authorize(
    claims: &Claims,
    assessment: &assessment::Model,
    action: AssessmentAction,
) -> Result<(), AssessmentError> {
    let allowed = match action {
        AssessmentAction::View => assessment.is_published || is_owner(claims, assessment),
        AssessmentAction::Update
        | AssessmentAction::Delete
        | AssessmentAction::Grade
        | AssessmentAction::ListSubmissions => is_owner(claims, assessment),
    };

    if allowed {
        Ok(())
    } else if action == AssessmentAction::View {
        Err(AssessmentError::forbidden("Assessment is not published"))
    } else {
        Err(AssessmentError::forbidden(
            "You do not have permission to perform this action",
        ))
    }
}

/// Decides whether `claims` may create an assessment in `course`: admins
/// always, instructors only for their own course.
pub fn can_create(claims: &Claims, course: &course::Model) -> Result<(), AssessmentError> {
    if claims.admin || (claims.instructor && claims.sub == course.instructor_id) {
        Ok(())
    } else {
        Err(AssessmentError::forbidden(
            "Only the course instructor or an admin may create assessments",
        ))
    }
}
