use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{
    academic_year, grade, prelude::*, semester, semester_choice, subject_semester_config,
    teaching_assignment,
};
use crate::error::{DbResultExt, ServiceError, ServiceResult};
use crate::services::academic_year::find_academic_year;

#[derive(Clone)]
pub struct SemesterService {
    db: DatabaseConnection,
}

/// Semester row joined with its year and term labels.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct SemesterView {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub academic_year_id: i32,
    pub academic_year: String,
    pub semester_choice_id: i32,
    pub semester_choice: String,
}

fn semester_view_query() -> Select<Semester> {
    Semester::find()
        .select_only()
        .column(semester::Column::Id)
        .column(semester::Column::Name)
        .column(semester::Column::IsActive)
        .column(semester::Column::AcademicYearId)
        .column_as(academic_year::Column::Label, "academic_year")
        .column(semester::Column::SemesterChoiceId)
        .column_as(semester_choice::Column::Name, "semester_choice")
        .join(JoinType::InnerJoin, semester::Relation::AcademicYear.def())
        .join(JoinType::InnerJoin, semester::Relation::SemesterChoice.def())
}

pub(crate) async fn find_semester<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> ServiceResult<semester::Model> {
    Semester::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Semester {id} not found")))
}

pub(crate) async fn active_semester<C: ConnectionTrait>(
    conn: &C,
) -> ServiceResult<Option<semester::Model>> {
    let active = Semester::find()
        .filter(semester::Column::IsActive.eq(true))
        .one(conn)
        .await?;
    Ok(active)
}

/// The active semester, or a validation error telling the user an
/// administrator must activate one first.
pub(crate) async fn require_active_semester<C: ConnectionTrait>(
    conn: &C,
) -> ServiceResult<semester::Model> {
    active_semester(conn).await?.ok_or_else(|| {
        ServiceError::validation(
            "No semester is currently active; an administrator must activate one first",
        )
    })
}

async fn load_view<C: ConnectionTrait>(conn: &C, id: i32) -> ServiceResult<SemesterView> {
    semester_view_query()
        .filter(semester::Column::Id.eq(id))
        .into_model::<SemesterView>()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Semester {id} not found")))
}

impl SemesterService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_semester_choices(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<semester_choice::Model>> {
        let choices = SemesterChoice::find()
            .order_by_asc(semester_choice::Column::Id)
            .all(&self.db)
            .await?;
        Ok(choices)
    }

    /// Newest academic year first, Odd before Even.
    pub async fn list_semesters(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<SemesterView>> {
        let semesters = semester_view_query()
            .order_by_desc(academic_year::Column::Label)
            .order_by_asc(semester::Column::SemesterChoiceId)
            .into_model::<SemesterView>()
            .all(&self.db)
            .await?;
        Ok(semesters)
    }

    pub async fn get_active_semester(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Option<SemesterView>> {
        let view = semester_view_query()
            .filter(semester::Column::IsActive.eq(true))
            .into_model::<SemesterView>()
            .one(&self.db)
            .await?;
        Ok(view)
    }

    /// New semesters start inactive and are named "<term> <year>".
    pub async fn create_semester(
        &self,
        caller: &AuthenticatedUser,
        academic_year_id: i32,
        semester_choice_id: i32,
    ) -> ServiceResult<SemesterView> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let year = find_academic_year(&tx, academic_year_id).await?;
        let choice = SemesterChoice::find_by_id(semester_choice_id)
            .one(&tx)
            .await?
            .ok_or_else(|| {
                ServiceError::not_found(format!("Semester choice {semester_choice_id} not found"))
            })?;

        let name = format!("{} {}", choice.name, year.label);

        let created = semester::ActiveModel {
            academic_year_id: Set(year.id),
            semester_choice_id: Set(choice.id),
            name: Set(name.clone()),
            is_active: Set(false),
            ..Default::default()
        }
        .insert(&tx)
        .await
        .or_duplicate(|| format!("Semester '{name}' already exists"))?;

        let view = load_view(&tx, created.id).await?;
        tx.commit().await?;

        info!(semester_id = view.id, "Created semester {}", view.name);
        Ok(view)
    }

    /// Inactive → Active for the target, Active → Inactive for the prior
    /// holder, in one transaction.
    pub async fn activate_semester(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
    ) -> ServiceResult<SemesterView> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let target = find_semester(&tx, id).await?;

        let deactivated = Semester::update_many()
            .col_expr(semester::Column::IsActive, Expr::value(false))
            .filter(semester::Column::IsActive.eq(true))
            .exec(&tx)
            .await?;

        let mut target_active: semester::ActiveModel = target.into();
        target_active.is_active = Set(true);
        target_active.update(&tx).await?;

        let view = load_view(&tx, id).await?;
        tx.commit().await?;

        info!(
            semester_id = id,
            previously_active = deactivated.rows_affected,
            "Activated semester {}",
            view.name
        );
        Ok(view)
    }

    /// Removes the semester with every grade, teaching assignment and
    /// subject configuration that references it.
    pub async fn delete_semester(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let target = find_semester(&tx, id).await?;

        let grades = Grade::delete_many()
            .filter(grade::Column::SemesterId.eq(id))
            .exec(&tx)
            .await?;
        let assignments = TeachingAssignment::delete_many()
            .filter(teaching_assignment::Column::SemesterId.eq(id))
            .exec(&tx)
            .await?;
        let configs = SubjectSemesterConfig::delete_many()
            .filter(subject_semester_config::Column::SemesterId.eq(id))
            .exec(&tx)
            .await?;

        Semester::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(
            semester_id = id,
            grades = grades.rows_affected,
            assignments = assignments.rows_affected,
            configs = configs.rows_affected,
            "Deleted semester {}",
            target.name
        );
        Ok(())
    }
}
