use sea_orm_migration::prelude::*;

use crate::migrations;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(migrations::m202601050001_create_users::Migration),
            Box::new(migrations::m202601050002_create_courses::Migration),
            Box::new(migrations::m202601050003_create_assessments::Migration),
            Box::new(migrations::m202601050004_create_assessment_submissions::Migration),
        ]
    }
}
