pub use sea_orm_migration::prelude::*;

mod m20250901_000001_create_school_tables;
mod m20250901_000002_create_grading_tables;
mod m20250901_000003_single_active_semester_index;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250901_000001_create_school_tables::Migration),
            Box::new(m20250901_000002_create_grading_tables::Migration),
            Box::new(m20250901_000003_single_active_semester_index::Migration),
        ]
    }
}
