use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, IntoActiveModel, QueryFilter, Set};
use serde::{Deserialize, Serialize};

use crate::error::AssessmentError;
use crate::models::assessment;

/// Represents the status of a submission throughout its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "submission_status_enum"
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    /// Handed in, awaiting grading.
    #[sea_orm(string_value = "submitted")]
    Submitted,
    /// Graded. Regrading overwrites the grade block but stays here.
    #[sea_orm(string_value = "graded")]
    Graded,
}

impl Default for SubmissionStatus {
    fn default() -> Self {
        Self::Submitted
    }
}

impl std::fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionStatus::Submitted => "submitted",
            SubmissionStatus::Graded => "graded",
        };
        write!(f, "{}", s)
    }
}

/// Represents one student's submission for an assessment.
///
/// At most one row exists per (assessment, student); the store enforces this
/// with a unique index. `is_late` and `submitted_at` are computed once at
/// submission time and never change afterwards.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessment_submissions")]
pub struct Model {
    /// Primary key of the submission.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the parent assessment.
    pub assessment_id: i64,
    /// ID of the student who submitted.
    pub student_id: i64,
    /// Inline text content, if any.
    pub content_text: Option<String>,
    /// Uploaded file URL, if any.
    pub file_url: Option<String>,
    /// Original filename accompanying `file_url`.
    pub file_name: Option<String>,
    /// GitHub repository URL, if any.
    pub github_url: Option<String>,
    /// Deployed-site URL, if any.
    pub website_url: Option<String>,
    /// Whether the submission arrived after the due date. Frozen at submit time.
    pub is_late: bool,
    /// When the submission arrived. Frozen at submit time.
    pub submitted_at: DateTime<Utc>,
    /// Current lifecycle status.
    pub status: SubmissionStatus,
    /// Final points after any late penalty; present only once graded.
    pub grade_points: Option<f64>,
    /// Instructor feedback, if any.
    pub grade_feedback: Option<String>,
    /// When the grade was last written.
    pub graded_at: Option<DateTime<Utc>>,
    /// ID of the grader.
    pub graded_by: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::assessment::Entity",
        from = "Column::AssessmentId",
        to = "super::assessment::Column::Id"
    )]
    Assessment,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id"
    )]
    Student,
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Content payload for a new submission. Which fields are present depends on
/// the assessment's submission type; the engine checks structural validity of
/// whatever is given, not cross-field consistency.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionContent {
    pub text: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub github_url: Option<String>,
    pub website_url: Option<String>,
}

impl SubmissionContent {
    /// At least one recognized field must be usable.
    pub fn is_empty(&self) -> bool {
        self.text.as_deref().map_or(true, |t| t.trim().is_empty())
            && self.file_url.is_none()
            && self.github_url.is_none()
            && self.website_url.is_none()
    }
}

impl Model {
    /// Accepts a submission for `assessment`, applying the publication gate,
    /// the one-submission-per-student rule, and the late policy, in that order.
    ///
    /// `is_late` is derived here (`now > due_date`) and frozen. No row is
    /// written on any failure path. A duplicate that slips past the pre-check
    /// in a concurrent race is caught by the store's unique index and
    /// reported as the same `DuplicateSubmission`.
    pub async fn submit(
        db: &DatabaseConnection,
        assessment: &assessment::Model,
        student_id: i64,
        content: SubmissionContent,
        now: DateTime<Utc>,
    ) -> Result<Self, AssessmentError> {
        if !assessment.is_published {
            return Err(AssessmentError::NotPublished);
        }

        let existing = Entity::find()
            .filter(Column::AssessmentId.eq(assessment.id))
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await?;
        if existing.is_some() {
            return Err(AssessmentError::DuplicateSubmission);
        }

        let is_late = now > assessment.due_date;
        if is_late && !assessment.allow_late_submission {
            return Err(AssessmentError::SubmissionClosed);
        }

        let submission = ActiveModel {
            assessment_id: Set(assessment.id),
            student_id: Set(student_id),
            content_text: Set(content.text),
            file_url: Set(content.file_url),
            file_name: Set(content.file_name),
            github_url: Set(content.github_url),
            website_url: Set(content.website_url),
            is_late: Set(is_late),
            submitted_at: Set(now),
            status: Set(SubmissionStatus::Submitted),
            grade_points: Set(None),
            grade_feedback: Set(None),
            graded_at: Set(None),
            graded_by: Set(None),
            ..Default::default()
        };

        match submission.insert(db).await {
            Ok(model) => {
                tracing::info!(
                    assessment_id = assessment.id,
                    student_id,
                    is_late,
                    "submission accepted"
                );
                Ok(model)
            }
            Err(e) if is_unique_violation(&e) => Err(AssessmentError::DuplicateSubmission),
            Err(e) => Err(e.into()),
        }
    }

    /// Grades (or regrades) the submission with the given raw points,
    /// applying the assessment's late penalty.
    ///
    /// The stored points are `assessment.apply_late_penalty(raw_points,
    /// submitted_at)`; since `is_late` and `submitted_at` never change,
    /// regrading with the same inputs is deterministic. Regrading overwrites
    /// the grade block in place and the status stays `graded`.
    pub async fn grade(
        self,
        db: &DatabaseConnection,
        assessment: &assessment::Model,
        raw_points: f64,
        feedback: Option<String>,
        grader_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Self, AssessmentError> {
        if raw_points < 0.0 {
            return Err(AssessmentError::validation("points must be >= 0"));
        }

        let final_points = if self.is_late {
            assessment.apply_late_penalty(raw_points, self.submitted_at)
        } else {
            raw_points
        };

        let submitted_at = self.submitted_at;
        let mut active = self.into_active_model();
        active.grade_points = Set(Some(final_points));
        active.grade_feedback = Set(feedback);
        active.graded_at = Set(Some(now));
        active.graded_by = Set(Some(grader_id));
        active.status = Set(SubmissionStatus::Graded);
        let graded = active.update(db).await?;

        tracing::info!(
            submission_id = graded.id,
            assessment_id = assessment.id,
            grader_id,
            raw_points,
            final_points,
            days_late = assessment.days_late(submitted_at),
            "submission graded"
        );

        Ok(graded)
    }

    /// Retrieve a submission by ID, scoped to an assessment.
    pub async fn get_for_assessment(
        db: &DatabaseConnection,
        assessment_id: i64,
        submission_id: i64,
    ) -> Result<Self, AssessmentError> {
        Entity::find()
            .filter(Column::Id.eq(submission_id))
            .filter(Column::AssessmentId.eq(assessment_id))
            .one(db)
            .await?
            .ok_or(AssessmentError::NotFound("Submission"))
    }
}

/// SQLite reports duplicate keys as a generic execution error; match on the
/// constraint message the same way the unique-code check does elsewhere.
fn is_unique_violation(err: &DbErr) -> bool {
    err.to_string().contains("UNIQUE constraint failed")
}
