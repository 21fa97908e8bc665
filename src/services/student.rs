use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Select, Set,
    TransactionTrait,
    sea_query::{Alias, Expr, Func},
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{class, grade, prelude::*, student};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};
use crate::services::class::find_class;

#[derive(Clone)]
pub struct StudentService {
    db: DatabaseConnection,
}

/// Student with the class it currently belongs to, if any.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct StudentView {
    pub id: i32,
    pub nisn: i64,
    pub name: String,
    pub class_id: Option<i32>,
    pub class_name: Option<String>,
    pub class_level: Option<String>,
}

#[derive(Debug, Clone)]
pub struct StudentInput {
    pub nisn: i64,
    pub name: String,
    pub class_id: Option<i32>,
}

fn student_view_query() -> Select<Student> {
    Student::find()
        .select_only()
        .column(student::Column::Id)
        .column(student::Column::Nisn)
        .column(student::Column::Name)
        .column(student::Column::ClassId)
        .column_as(class::Column::Name, "class_name")
        .column_as(class::Column::Level, "class_level")
        .join(JoinType::LeftJoin, student::Relation::Class.def())
}

async fn load_view<C: ConnectionTrait>(conn: &C, id: i32) -> ServiceResult<StudentView> {
    student_view_query()
        .filter(student::Column::Id.eq(id))
        .into_model::<StudentView>()
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Student {id} not found")))
}

impl StudentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn validate<C: ConnectionTrait>(
        conn: &C,
        input: &StudentInput,
    ) -> ServiceResult<String> {
        if input.nisn <= 0 {
            return Err(ServiceError::validation("NISN must be a positive number"));
        }
        let name = required("Student name", &input.name)?;
        if let Some(class_id) = input.class_id {
            find_class(conn, class_id).await?;
        }
        Ok(name)
    }

    pub async fn create_student(
        &self,
        caller: &AuthenticatedUser,
        input: StudentInput,
    ) -> ServiceResult<StudentView> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let name = Self::validate(&tx, &input).await?;
        let nisn = input.nisn;

        let created = student::ActiveModel {
            nisn: Set(nisn),
            name: Set(name),
            class_id: Set(input.class_id),
            ..Default::default()
        }
        .insert(&tx)
        .await
        .or_duplicate(|| format!("NISN {nisn} is already registered"))?;

        let view = load_view(&tx, created.id).await?;
        tx.commit().await?;

        info!(student_id = view.id, nisn, "Registered student {}", view.name);
        Ok(view)
    }

    pub async fn update_student(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        input: StudentInput,
    ) -> ServiceResult<StudentView> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let existing = Student::find_by_id(id)
            .one(&tx)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Student {id} not found")))?;
        let name = Self::validate(&tx, &input).await?;
        let nisn = input.nisn;

        let mut student_active: student::ActiveModel = existing.into();
        student_active.nisn = Set(nisn);
        student_active.name = Set(name);
        student_active.class_id = Set(input.class_id);
        student_active
            .update(&tx)
            .await
            .or_duplicate(|| format!("NISN {nisn} is already registered to another student"))?;

        let view = load_view(&tx, id).await?;
        tx.commit().await?;
        Ok(view)
    }

    /// Removes the student and every grade recorded for them.
    pub async fn delete_student(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let existing = Student::find_by_id(id)
            .one(&tx)
            .await?
            .ok_or_else(|| ServiceError::not_found(format!("Student {id} not found")))?;

        let grades = Grade::delete_many()
            .filter(grade::Column::StudentId.eq(id))
            .exec(&tx)
            .await?;
        Student::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(
            student_id = id,
            grades = grades.rows_affected,
            "Deleted student {}",
            existing.name
        );
        Ok(())
    }

    pub async fn get_student(
        &self,
        _caller: &AuthenticatedUser,
        id: i32,
    ) -> ServiceResult<StudentView> {
        load_view(&self.db, id).await
    }

    /// Matches the term against NISN digits or the name, ordered by name.
    pub async fn search_students(
        &self,
        caller: &AuthenticatedUser,
        term: Option<&str>,
    ) -> ServiceResult<Vec<StudentView>> {
        caller.require_admin()?;

        let mut query = student_view_query();

        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = format!("%{term}%");
            let nisn_text = Func::cast_as(
                Expr::col((student::Entity, student::Column::Nisn)),
                Alias::new("TEXT"),
            );
            query = query.filter(
                Condition::any()
                    .add(Expr::expr(nisn_text).like(pattern.clone()))
                    .add(student::Column::Name.like(pattern)),
            );
        }

        let students = query
            .order_by_asc(student::Column::Name)
            .into_model::<StudentView>()
            .all(&self.db)
            .await?;
        Ok(students)
    }

    pub async fn list_students_in_class(
        &self,
        _caller: &AuthenticatedUser,
        class_id: i32,
    ) -> ServiceResult<Vec<student::Model>> {
        let students = Student::find()
            .filter(student::Column::ClassId.eq(class_id))
            .order_by_asc(student::Column::Name)
            .all(&self.db)
            .await?;
        Ok(students)
    }
}
