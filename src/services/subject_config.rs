use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::OnConflict,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{prelude::*, subject_semester_config};
use crate::error::{ServiceError, ServiceResult};
use crate::services::semester::find_semester;
use crate::services::subject::find_subject;

/// Per-semester on/off switch for subjects.
#[derive(Clone)]
pub struct SubjectConfigService {
    db: DatabaseConnection,
}

impl SubjectConfigService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Upsert keyed on (subject, semester).
    pub async fn set_subject_active(
        &self,
        caller: &AuthenticatedUser,
        subject_id: i32,
        semester_id: i32,
        is_active: bool,
    ) -> ServiceResult<subject_semester_config::Model> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let subject = find_subject(&tx, subject_id).await?;
        let semester = find_semester(&tx, semester_id).await?;

        let config = subject_semester_config::ActiveModel {
            subject_id: Set(subject.id),
            semester_id: Set(semester.id),
            is_active: Set(is_active),
            ..Default::default()
        };

        SubjectSemesterConfig::insert(config)
            .on_conflict(
                OnConflict::columns([
                    subject_semester_config::Column::SubjectId,
                    subject_semester_config::Column::SemesterId,
                ])
                .update_column(subject_semester_config::Column::IsActive)
                .to_owned(),
            )
            .exec(&tx)
            .await?;

        let stored = SubjectSemesterConfig::find()
            .filter(subject_semester_config::Column::SubjectId.eq(subject.id))
            .filter(subject_semester_config::Column::SemesterId.eq(semester.id))
            .one(&tx)
            .await?
            .ok_or_else(|| {
                ServiceError::Internal("subject configuration missing after upsert".to_string())
            })?;

        tx.commit().await?;

        info!(
            subject_id,
            semester_id,
            is_active,
            "Set {} {} for {}",
            subject.name,
            if is_active { "active" } else { "inactive" },
            semester.name
        );
        Ok(stored)
    }

    pub async fn list_configs_for_semester(
        &self,
        caller: &AuthenticatedUser,
        semester_id: i32,
    ) -> ServiceResult<Vec<subject_semester_config::Model>> {
        caller.require_admin()?;

        let configs = SubjectSemesterConfig::find()
            .filter(subject_semester_config::Column::SemesterId.eq(semester_id))
            .order_by_asc(subject_semester_config::Column::SubjectId)
            .all(&self.db)
            .await?;
        Ok(configs)
    }

    pub async fn list_configs_for_subject(
        &self,
        caller: &AuthenticatedUser,
        subject_id: i32,
    ) -> ServiceResult<Vec<subject_semester_config::Model>> {
        caller.require_admin()?;

        let configs = SubjectSemesterConfig::find()
            .filter(subject_semester_config::Column::SubjectId.eq(subject_id))
            .order_by_asc(subject_semester_config::Column::SemesterId)
            .all(&self.db)
            .await?;
        Ok(configs)
    }
}
