use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// Partial unique index: at most one row may carry is_active = true.
// Both Postgres and SQLite accept this form; sea-query has no builder for it.
const CREATE_INDEX: &str = "CREATE UNIQUE INDEX IF NOT EXISTS idx_semester_single_active \
     ON semester (is_active) WHERE is_active";

const DROP_INDEX: &str = "DROP INDEX IF EXISTS idx_semester_single_active";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(CREATE_INDEX)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.get_connection().execute_unprepared(DROP_INDEX).await?;

        Ok(())
    }
}
