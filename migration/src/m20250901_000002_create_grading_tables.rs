use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // UTS, UAS, daily assignments, practical work, ...
        manager
            .create_table(
                Table::create()
                    .table(AssessmentStage::Table)
                    .if_not_exists()
                    .col(pk_auto(AssessmentStage::Id))
                    .col(string_uniq(AssessmentStage::Name))
                    .col(string_null(AssessmentStage::Description))
                    .to_owned(),
            )
            .await?;

        // Which teacher teaches which subject to which class in which semester
        manager
            .create_table(
                Table::create()
                    .table(TeachingAssignment::Table)
                    .if_not_exists()
                    .col(pk_auto(TeachingAssignment::Id))
                    .col(integer(TeachingAssignment::UserId))
                    .col(integer(TeachingAssignment::SubjectId))
                    .col(integer(TeachingAssignment::ClassId))
                    .col(integer(TeachingAssignment::SemesterId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teaching-assignment-user")
                            .from(TeachingAssignment::Table, TeachingAssignment::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teaching-assignment-subject")
                            .from(TeachingAssignment::Table, TeachingAssignment::SubjectId)
                            .to(Subject::Table, Subject::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teaching-assignment-class")
                            .from(TeachingAssignment::Table, TeachingAssignment::ClassId)
                            .to(Class::Table, Class::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-teaching-assignment-semester")
                            .from(TeachingAssignment::Table, TeachingAssignment::SemesterId)
                            .to(Semester::Table, Semester::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-teaching-assignment-unique")
                    .table(TeachingAssignment::Table)
                    .col(TeachingAssignment::UserId)
                    .col(TeachingAssignment::SubjectId)
                    .col(TeachingAssignment::ClassId)
                    .col(TeachingAssignment::SemesterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SubjectSemesterConfig::Table)
                    .if_not_exists()
                    .col(pk_auto(SubjectSemesterConfig::Id))
                    .col(integer(SubjectSemesterConfig::SubjectId))
                    .col(integer(SubjectSemesterConfig::SemesterId))
                    .col(boolean(SubjectSemesterConfig::IsActive).default(false))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subject-semester-config-subject")
                            .from(SubjectSemesterConfig::Table, SubjectSemesterConfig::SubjectId)
                            .to(Subject::Table, Subject::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-subject-semester-config-semester")
                            .from(SubjectSemesterConfig::Table, SubjectSemesterConfig::SemesterId)
                            .to(Semester::Table, Semester::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-subject-semester-config-unique")
                    .table(SubjectSemesterConfig::Table)
                    .col(SubjectSemesterConfig::SubjectId)
                    .col(SubjectSemesterConfig::SemesterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Student::Table)
                    .if_not_exists()
                    .col(pk_auto(Student::Id))
                    .col(big_integer_uniq(Student::Nisn))
                    .col(string(Student::Name))
                    .col(integer_null(Student::ClassId))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-student-class")
                            .from(Student::Table, Student::ClassId)
                            .to(Class::Table, Class::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // teacher_id has no foreign key: grades outlive the account that recorded them
        manager
            .create_table(
                Table::create()
                    .table(Grade::Table)
                    .if_not_exists()
                    .col(pk_auto(Grade::Id))
                    .col(integer(Grade::StudentId))
                    .col(integer(Grade::SubjectId))
                    .col(integer(Grade::SemesterId))
                    .col(integer(Grade::StageId))
                    .col(double(Grade::Value).check(Expr::col(Grade::Value).between(0.0, 100.0)))
                    .col(date(Grade::EntryDate))
                    .col(integer(Grade::TeacherId))
                    .col(text_null(Grade::Note))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grade-student")
                            .from(Grade::Table, Grade::StudentId)
                            .to(Student::Table, Student::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grade-subject")
                            .from(Grade::Table, Grade::SubjectId)
                            .to(Subject::Table, Subject::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grade-semester")
                            .from(Grade::Table, Grade::SemesterId)
                            .to(Semester::Table, Semester::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-grade-stage")
                            .from(Grade::Table, Grade::StageId)
                            .to(AssessmentStage::Table, AssessmentStage::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-grade-unique")
                    .table(Grade::Table)
                    .col(Grade::StudentId)
                    .col(Grade::SubjectId)
                    .col(Grade::SemesterId)
                    .col(Grade::StageId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-grade-teacher")
                    .table(Grade::Table)
                    .col(Grade::TeacherId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop tables in reverse order due to foreign key constraints
        manager
            .drop_table(Table::drop().table(Grade::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Student::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(SubjectSemesterConfig::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TeachingAssignment::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(AssessmentStage::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum AssessmentStage {
    Table,
    Id,
    Name,
    Description,
}

#[derive(DeriveIden)]
enum TeachingAssignment {
    Table,
    Id,
    UserId,
    SubjectId,
    ClassId,
    SemesterId,
}

#[derive(DeriveIden)]
enum SubjectSemesterConfig {
    Table,
    Id,
    SubjectId,
    SemesterId,
    IsActive,
}

#[derive(DeriveIden)]
enum Student {
    Table,
    Id,
    Nisn,
    Name,
    ClassId,
}

#[derive(DeriveIden)]
enum Grade {
    Table,
    Id,
    StudentId,
    SubjectId,
    SemesterId,
    StageId,
    Value,
    EntryDate,
    TeacherId,
    Note,
}

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Subject {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Class {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Semester {
    Table,
    Id,
}
