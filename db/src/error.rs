//! Error taxonomy for the assessment lifecycle engine.
//!
//! All variants are terminal and non-retriable; handlers surface the message
//! verbatim and map each variant to a status code. Transient store failures
//! propagate unchanged through the `Db` variant.

use sea_orm::DbErr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssessmentError {
    /// Malformed or out-of-range input. No mutation was attempted.
    #[error("{0}")]
    Validation(String),

    /// Assessment, course, or submission absent.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Authorization denial, including the "not published" view denial.
    #[error("{0}")]
    Forbidden(String),

    /// Submitting against an assessment that has not been published.
    #[error("Assessment is not published")]
    NotPublished,

    /// The student already has a submission for this assessment.
    #[error("A submission already exists for this student")]
    DuplicateSubmission,

    /// Past the due date and late submissions are not allowed.
    #[error("Submissions are closed for this assessment")]
    SubmissionClosed,

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl AssessmentError {
    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
