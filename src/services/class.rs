use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{class, prelude::*, student, teaching_assignment};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};

#[derive(Clone)]
pub struct ClassService {
    db: DatabaseConnection,
}

pub(crate) async fn find_class<C: ConnectionTrait>(conn: &C, id: i32) -> ServiceResult<class::Model> {
    Class::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Class {id} not found")))
}

impl ClassService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_classes(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<class::Model>> {
        let classes = Class::find()
            .order_by_asc(class::Column::Level)
            .order_by_asc(class::Column::Name)
            .all(&self.db)
            .await?;
        Ok(classes)
    }

    pub async fn create_class(
        &self,
        caller: &AuthenticatedUser,
        name: &str,
        level: &str,
    ) -> ServiceResult<class::Model> {
        caller.require_admin()?;
        let name = required("Class name", name)?;
        let level = required("Class level", level)?;

        let created = class::ActiveModel {
            name: Set(name.clone()),
            level: Set(level.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .or_duplicate(|| format!("Class '{level} - {name}' already exists"))?;

        info!(class_id = created.id, "Created class {}", created.display_name());
        Ok(created)
    }

    pub async fn update_class(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        name: &str,
        level: &str,
    ) -> ServiceResult<class::Model> {
        caller.require_admin()?;
        let name = required("Class name", name)?;
        let level = required("Class level", level)?;

        let existing = find_class(&self.db, id).await?;
        let mut class_active: class::ActiveModel = existing.into();
        class_active.name = Set(name.clone());
        class_active.level = Set(level.clone());

        let updated = class_active
            .update(&self.db)
            .await
            .or_duplicate(|| format!("Class '{level} - {name}' already exists"))?;
        Ok(updated)
    }

    /// Students of the class become unassigned; its teaching assignments go.
    pub async fn delete_class(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let existing = find_class(&tx, id).await?;

        let detached = Student::update_many()
            .col_expr(student::Column::ClassId, Expr::value(Option::<i32>::None))
            .filter(student::Column::ClassId.eq(id))
            .exec(&tx)
            .await?;
        let assignments = TeachingAssignment::delete_many()
            .filter(teaching_assignment::Column::ClassId.eq(id))
            .exec(&tx)
            .await?;

        Class::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(
            class_id = id,
            students_detached = detached.rows_affected,
            assignments = assignments.rows_affected,
            "Deleted class {}",
            existing.display_name()
        );
        Ok(())
    }
}
