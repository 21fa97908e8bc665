//! `SeaORM` Entity, one term of an academic year

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "semester")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub academic_year_id: i32,
    pub semester_choice_id: i32,
    /// Display name, e.g. "Odd 2023/2024"
    pub name: String,
    /// At most one row system-wide is active
    pub is_active: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::academic_year::Entity",
        from = "Column::AcademicYearId",
        to = "super::academic_year::Column::Id"
    )]
    AcademicYear,
    #[sea_orm(
        belongs_to = "super::semester_choice::Entity",
        from = "Column::SemesterChoiceId",
        to = "super::semester_choice::Column::Id"
    )]
    SemesterChoice,
}

impl Related<super::academic_year::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AcademicYear.def()
    }
}

impl Related<super::semester_choice::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SemesterChoice.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
