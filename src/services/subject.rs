use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{grade, prelude::*, subject, subject_semester_config, teaching_assignment};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};

#[derive(Clone)]
pub struct SubjectService {
    db: DatabaseConnection,
}

pub(crate) async fn find_subject<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> ServiceResult<subject::Model> {
    Subject::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Subject {id} not found")))
}

impl SubjectService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_subjects(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<subject::Model>> {
        let subjects = Subject::find()
            .order_by_asc(subject::Column::Name)
            .all(&self.db)
            .await?;
        Ok(subjects)
    }

    pub async fn create_subject(
        &self,
        caller: &AuthenticatedUser,
        name: &str,
        code: &str,
    ) -> ServiceResult<subject::Model> {
        caller.require_admin()?;
        let name = required("Subject name", name)?;
        let code = required("Subject code", code)?;

        let created = subject::ActiveModel {
            name: Set(name),
            code: Set(code.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .or_duplicate(|| format!("Subject code '{code}' is already in use"))?;

        info!(subject_id = created.id, "Created subject {} ({})", created.name, created.code);
        Ok(created)
    }

    pub async fn update_subject(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        name: &str,
        code: &str,
    ) -> ServiceResult<subject::Model> {
        caller.require_admin()?;
        let name = required("Subject name", name)?;
        let code = required("Subject code", code)?;

        let existing = find_subject(&self.db, id).await?;
        let mut subject_active: subject::ActiveModel = existing.into();
        subject_active.name = Set(name);
        subject_active.code = Set(code.clone());

        let updated = subject_active
            .update(&self.db)
            .await
            .or_duplicate(|| format!("Subject code '{code}' is already in use"))?;
        Ok(updated)
    }

    /// Drops the subject together with its grades, assignments and
    /// semester configurations.
    pub async fn delete_subject(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let existing = find_subject(&tx, id).await?;

        let grades = Grade::delete_many()
            .filter(grade::Column::SubjectId.eq(id))
            .exec(&tx)
            .await?;
        TeachingAssignment::delete_many()
            .filter(teaching_assignment::Column::SubjectId.eq(id))
            .exec(&tx)
            .await?;
        SubjectSemesterConfig::delete_many()
            .filter(subject_semester_config::Column::SubjectId.eq(id))
            .exec(&tx)
            .await?;

        Subject::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(
            subject_id = id,
            grades = grades.rows_affected,
            "Deleted subject {}",
            existing.name
        );
        Ok(())
    }
}
