use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(AcademicYear::Table)
                    .if_not_exists()
                    .col(pk_auto(AcademicYear::Id))
                    .col(string_uniq(AcademicYear::Label)) // e.g. "2023/2024"
                    .to_owned(),
            )
            .await?;

        // Odd / Even, seeded once at startup
        manager
            .create_table(
                Table::create()
                    .table(SemesterChoice::Table)
                    .if_not_exists()
                    .col(pk_auto(SemesterChoice::Id))
                    .col(string_uniq(SemesterChoice::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Semester::Table)
                    .if_not_exists()
                    .col(pk_auto(Semester::Id))
                    .col(integer(Semester::AcademicYearId))
                    .col(integer(Semester::SemesterChoiceId))
                    .col(string(Semester::Name))
                    .col(boolean(Semester::IsActive).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-semester-academic-year")
                            .from(Semester::Table, Semester::AcademicYearId)
                            .to(AcademicYear::Table, AcademicYear::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-semester-semester-choice")
                            .from(Semester::Table, Semester::SemesterChoiceId)
                            .to(SemesterChoice::Table, SemesterChoice::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-semester-year-choice")
                    .table(Semester::Table)
                    .col(Semester::AcademicYearId)
                    .col(Semester::SemesterChoiceId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Class::Table)
                    .if_not_exists()
                    .col(pk_auto(Class::Id))
                    .col(string(Class::Name))
                    .col(string(Class::Level)) // grade level, e.g. "10"
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-class-name-level")
                    .table(Class::Table)
                    .col(Class::Name)
                    .col(Class::Level)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Subject::Table)
                    .if_not_exists()
                    .col(pk_auto(Subject::Id))
                    .col(string(Subject::Name))
                    .col(string_uniq(Subject::Code))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(pk_auto(User::Id))
                    .col(string_uniq(User::Username))
                    .col(string(User::PasswordHash))
                    .col(
                        string(User::Role)
                            .default("teacher")
                            .check(Expr::col(User::Role).is_in(["admin", "teacher"])),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Subject::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Class::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Semester::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SemesterChoice::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AcademicYear::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AcademicYear {
    Table,
    Id,
    Label,
}

#[derive(DeriveIden)]
enum SemesterChoice {
    Table,
    Id,
    Name,
}

#[derive(DeriveIden)]
enum Semester {
    Table,
    Id,
    AcademicYearId,
    SemesterChoiceId,
    Name,
    IsActive,
}

#[derive(DeriveIden)]
enum Class {
    Table,
    Id,
    Name,
    Level,
}

#[derive(DeriveIden)]
enum Subject {
    Table,
    Id,
    Name,
    Code,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
    Username,
    PasswordHash,
    Role,
}
