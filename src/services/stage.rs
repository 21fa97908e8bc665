use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{assessment_stage, grade, prelude::*};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};

#[derive(Clone)]
pub struct AssessmentStageService {
    db: DatabaseConnection,
}

pub(crate) async fn find_stage<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> ServiceResult<assessment_stage::Model> {
    AssessmentStage::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Assessment stage {id} not found")))
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

impl AssessmentStageService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_stages(
        &self,
        _caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<assessment_stage::Model>> {
        let stages = AssessmentStage::find()
            .order_by_asc(assessment_stage::Column::Name)
            .all(&self.db)
            .await?;
        Ok(stages)
    }

    pub async fn create_stage(
        &self,
        caller: &AuthenticatedUser,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<assessment_stage::Model> {
        caller.require_admin()?;
        let name = required("Assessment stage name", name)?;

        let created = assessment_stage::ActiveModel {
            name: Set(name.clone()),
            description: Set(optional_text(description)),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .or_duplicate(|| format!("Assessment stage '{name}' already exists"))?;

        info!(stage_id = created.id, "Created assessment stage {}", created.name);
        Ok(created)
    }

    pub async fn update_stage(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        name: &str,
        description: Option<String>,
    ) -> ServiceResult<assessment_stage::Model> {
        caller.require_admin()?;
        let name = required("Assessment stage name", name)?;

        let existing = find_stage(&self.db, id).await?;
        let mut stage_active: assessment_stage::ActiveModel = existing.into();
        stage_active.name = Set(name.clone());
        stage_active.description = Set(optional_text(description));

        let updated = stage_active
            .update(&self.db)
            .await
            .or_duplicate(|| format!("Assessment stage '{name}' already exists"))?;
        Ok(updated)
    }

    /// Refused while grades are recorded against the stage.
    pub async fn delete_stage(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let existing = find_stage(&tx, id).await?;

        let grades = Grade::find()
            .filter(grade::Column::StageId.eq(id))
            .count(&tx)
            .await?;
        if grades > 0 {
            return Err(ServiceError::ReferentialBlock(format!(
                "Assessment stage '{}' is used by {} grade(s) and cannot be deleted",
                existing.name, grades
            )));
        }

        AssessmentStage::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(stage_id = id, "Deleted assessment stage {}", existing.name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::optional_text;

    #[test]
    fn blank_descriptions_are_dropped() {
        assert_eq!(optional_text(Some("  ".into())), None);
        assert_eq!(optional_text(None), None);
        assert_eq!(
            optional_text(Some(" Final exam ".into())),
            Some("Final exam".to_string())
        );
    }
}
