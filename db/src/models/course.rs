use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelTrait, Set};
use serde::Serialize;

/// Represents a course in the `courses` table.
///
/// Course management is a collaborator concern; the lifecycle engine only
/// ever needs `{id, instructor_id}` to decide who may create assessments.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "courses")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique course code (e.g. "CS301").
    pub code: String,
    /// Human-readable course title.
    pub title: String,
    /// ID of the instructor who owns the course.
    pub instructor_id: i64,
    /// Timestamp when the course was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp when the course was last updated.
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::InstructorId",
        to = "super::user::Column::Id"
    )]
    Instructor,
    #[sea_orm(has_many = "super::assessment::Entity")]
    Assessment,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Instructor.def()
    }
}

impl Related<super::assessment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assessment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Insert a new course owned by the given instructor.
    pub async fn create(
        db: &DatabaseConnection,
        code: &str,
        title: &str,
        instructor_id: i64,
    ) -> Result<Self, DbErr> {
        let now = Utc::now();
        let course = ActiveModel {
            code: Set(code.to_owned()),
            title: Set(title.to_owned()),
            instructor_id: Set(instructor_id),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };
        course.insert(db).await
    }

    /// Look up a course by ID.
    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }
}
