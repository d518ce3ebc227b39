use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601050004_create_assessment_submissions"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Alias::new("assessment_submissions"))
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Alias::new("id"))
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("assessment_id"))
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("student_id"))
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("content_text")).string().null())
                    .col(ColumnDef::new(Alias::new("file_url")).string().null())
                    .col(ColumnDef::new(Alias::new("file_name")).string().null())
                    .col(ColumnDef::new(Alias::new("github_url")).string().null())
                    .col(ColumnDef::new(Alias::new("website_url")).string().null())
                    .col(
                        ColumnDef::new(Alias::new("is_late"))
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Alias::new("submitted_at"))
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Alias::new("status"))
                            .enumeration(
                                Alias::new("submission_status_enum"),
                                vec![Alias::new("submitted"), Alias::new("graded")],
                            )
                            .not_null(),
                    )
                    .col(ColumnDef::new(Alias::new("grade_points")).double().null())
                    .col(ColumnDef::new(Alias::new("grade_feedback")).string().null())
                    .col(ColumnDef::new(Alias::new("graded_at")).timestamp().null())
                    .col(ColumnDef::new(Alias::new("graded_by")).integer().null())
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                Alias::new("assessment_submissions"),
                                Alias::new("assessment_id"),
                            )
                            .to(Alias::new("assessments"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(
                                Alias::new("assessment_submissions"),
                                Alias::new("student_id"),
                            )
                            .to(Alias::new("users"), Alias::new("id"))
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One submission per (assessment, student). The engine pre-checks for a
        // friendlier error, but the store is what actually guarantees it under
        // concurrent submits.
        manager
            .create_index(
                Index::create()
                    .name("uq_assessment_submissions_assessment_student")
                    .table(Alias::new("assessment_submissions"))
                    .col(Alias::new("assessment_id"))
                    .col(Alias::new("student_id"))
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("assessment_submissions"))
                    .to_owned(),
            )
            .await
    }
}
