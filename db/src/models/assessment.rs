use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, FromJsonQueryResult, IntoActiveModel, Set};
use serde::{Deserialize, Serialize};

/// Represents the kind of work an assessment asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "assessment_type_enum"
)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentType {
    #[sea_orm(string_value = "assignment")]
    Assignment,
    #[sea_orm(string_value = "project")]
    Project,
    #[sea_orm(string_value = "essay")]
    Essay,
    #[sea_orm(string_value = "coding")]
    Coding,
}

impl std::fmt::Display for AssessmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            AssessmentType::Assignment => "assignment",
            AssessmentType::Project => "project",
            AssessmentType::Essay => "essay",
            AssessmentType::Coding => "coding",
        };
        write!(f, "{}", s)
    }
}

/// How students are expected to hand work in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "submission_type_enum"
)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionType {
    #[sea_orm(string_value = "file")]
    File,
    #[sea_orm(string_value = "text")]
    Text,
    #[sea_orm(string_value = "url")]
    Url,
    #[sea_orm(string_value = "github")]
    Github,
}

impl std::fmt::Display for SubmissionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SubmissionType::File => "file",
            SubmissionType::Text => "text",
            SubmissionType::Url => "url",
            SubmissionType::Github => "github",
        };
        write!(f, "{}", s)
    }
}

/// One rubric criterion. Stored as part of the assessment's JSON rubric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RubricItem {
    pub criteria: String,
    pub max_points: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Ordered rubric for an assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult, Default)]
pub struct Rubric(pub Vec<RubricItem>);

/// Optional whitelist of file extensions for file submissions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult, Default)]
pub struct AllowedFileTypes(pub Vec<String>);

/// Represents a gradable assessment tied to one course and one owning instructor.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "assessments")]
pub struct Model {
    /// Primary key of the assessment.
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the course this assessment belongs to. Immutable after creation.
    pub course_id: i64,
    /// ID of the owning instructor. Immutable after creation.
    pub instructor_id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub assessment_type: AssessmentType,
    /// Maximum raw points; always positive.
    pub max_points: f64,
    pub due_date: DateTime<Utc>,
    /// Whether submissions past the due date are accepted at all.
    pub allow_late_submission: bool,
    /// Percentage deducted per late day, in [0, 100].
    pub late_penalty: f64,
    pub submission_type: SubmissionType,
    pub allowed_file_types: Option<AllowedFileTypes>,
    /// Maximum upload size in bytes; positive when present.
    pub max_file_size: Option<i64>,
    pub rubric: Rubric,
    /// Visibility and submission gate. Unpublished assessments are invisible
    /// to students and reject submissions.
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::course::Entity",
        from = "Column::CourseId",
        to = "super::course::Column::Id"
    )]
    Course,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InstructorId",
        to = "super::user::Column::Id"
    )]
    Instructor,
    #[sea_orm(has_many = "super::assessment_submission::Entity")]
    Submission,
}

impl Related<super::course::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Course.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::assessment_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submission.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Field bundle for [`Model::create`]. Everything the caller may set at
/// creation time; ownership and publication state are decided by the engine.
#[derive(Debug, Clone)]
pub struct NewAssessment {
    pub course_id: i64,
    pub instructor_id: i64,
    pub title: String,
    pub description: String,
    pub instructions: String,
    pub assessment_type: AssessmentType,
    pub max_points: f64,
    pub due_date: DateTime<Utc>,
    pub allow_late_submission: bool,
    pub late_penalty: f64,
    pub submission_type: SubmissionType,
    pub allowed_file_types: Option<Vec<String>>,
    pub max_file_size: Option<i64>,
    pub rubric: Vec<RubricItem>,
}

impl Model {
    /// Create a new assessment. Always starts unpublished.
    pub async fn create(db: &DatabaseConnection, new: NewAssessment) -> Result<Self, DbErr> {
        let now = Utc::now();
        let assessment = ActiveModel {
            course_id: Set(new.course_id),
            instructor_id: Set(new.instructor_id),
            title: Set(new.title),
            description: Set(new.description),
            instructions: Set(new.instructions),
            assessment_type: Set(new.assessment_type),
            max_points: Set(new.max_points),
            due_date: Set(new.due_date),
            allow_late_submission: Set(new.allow_late_submission),
            late_penalty: Set(new.late_penalty),
            submission_type: Set(new.submission_type),
            allowed_file_types: Set(new.allowed_file_types.map(AllowedFileTypes)),
            max_file_size: Set(new.max_file_size),
            rubric: Set(Rubric(new.rubric)),
            is_published: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        assessment.insert(db).await
    }

    /// Retrieve an assessment by its ID.
    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// Flip the publication gate. Publishing makes the assessment visible to
    /// students and opens it for submissions; unpublishing closes both.
    pub async fn set_published(
        self,
        db: &DatabaseConnection,
        published: bool,
    ) -> Result<Self, DbErr> {
        let mut active = self.into_active_model();
        active.is_published = Set(published);
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    /// Delete an assessment by ID; its submissions cascade with it.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete_by_id(db: &DatabaseConnection, id: i64) -> Result<bool, DbErr> {
        let res = Entity::delete_by_id(id).exec(db).await?;
        Ok(res.rows_affected > 0)
    }

    /// Whole days a submission instant is past the due date, rounding any
    /// partial day up. Any overshoot at all counts as a full day.
    ///
    /// Only meaningful for late submissions; returns 0 on or before the due
    /// date.
    pub fn days_late(&self, submitted_at: DateTime<Utc>) -> i64 {
        // Millisecond precision: is_late compares full timestamps, so even a
        // sub-second overshoot must charge a day.
        let overshoot_ms = (submitted_at - self.due_date).num_milliseconds();
        if overshoot_ms <= 0 {
            return 0;
        }
        (overshoot_ms + 86_399_999) / 86_400_000
    }

    /// Applies the per-day late penalty to a raw grade.
    ///
    /// `final = max(0, raw * (1 - late_penalty/100 * days_late))`. The
    /// fraction is intentionally not capped at 1.0; a sufficiently late
    /// submission bottoms out at the zero floor.
    pub fn apply_late_penalty(&self, raw_points: f64, submitted_at: DateTime<Utc>) -> f64 {
        let days = self.days_late(submitted_at);
        if days == 0 || self.late_penalty <= 0.0 {
            return raw_points;
        }
        let penalty_fraction = (self.late_penalty / 100.0) * days as f64;
        (raw_points * (1.0 - penalty_fraction)).max(0.0)
    }
}
