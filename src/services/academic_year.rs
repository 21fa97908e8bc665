use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{academic_year, prelude::*, semester};
use crate::error::{DbResultExt, ServiceError, ServiceResult, required};

#[derive(Clone)]
pub struct AcademicYearService {
    db: DatabaseConnection,
}

pub(crate) async fn find_academic_year<C: ConnectionTrait>(
    conn: &C,
    id: i32,
) -> ServiceResult<academic_year::Model> {
    AcademicYear::find_by_id(id)
        .one(conn)
        .await?
        .ok_or_else(|| ServiceError::not_found(format!("Academic year {id} not found")))
}

impl AcademicYearService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Newest label first
    pub async fn list_academic_years(
        &self,
        caller: &AuthenticatedUser,
    ) -> ServiceResult<Vec<academic_year::Model>> {
        caller.require_admin()?;

        let years = AcademicYear::find()
            .order_by_desc(academic_year::Column::Label)
            .all(&self.db)
            .await?;
        Ok(years)
    }

    pub async fn create_academic_year(
        &self,
        caller: &AuthenticatedUser,
        label: &str,
    ) -> ServiceResult<academic_year::Model> {
        caller.require_admin()?;
        let label = required("Academic year label", label)?;

        let year = academic_year::ActiveModel {
            label: Set(label.clone()),
            ..Default::default()
        }
        .insert(&self.db)
        .await
        .or_duplicate(|| format!("Academic year '{label}' already exists"))?;

        info!(academic_year_id = year.id, "Created academic year {}", year.label);
        Ok(year)
    }

    pub async fn update_academic_year(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
        label: &str,
    ) -> ServiceResult<academic_year::Model> {
        caller.require_admin()?;
        let label = required("Academic year label", label)?;

        let year = find_academic_year(&self.db, id).await?;
        let mut year_active: academic_year::ActiveModel = year.into();
        year_active.label = Set(label.clone());

        let updated = year_active
            .update(&self.db)
            .await
            .or_duplicate(|| format!("Academic year '{label}' already exists"))?;
        Ok(updated)
    }

    /// Refused while any semester still belongs to the year.
    pub async fn delete_academic_year(
        &self,
        caller: &AuthenticatedUser,
        id: i32,
    ) -> ServiceResult<()> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let year = find_academic_year(&tx, id).await?;

        let semesters = Semester::find()
            .filter(semester::Column::AcademicYearId.eq(id))
            .count(&tx)
            .await?;
        if semesters > 0 {
            return Err(ServiceError::ReferentialBlock(format!(
                "Academic year '{}' still has {} semester(s); delete them first",
                year.label, semesters
            )));
        }

        AcademicYear::delete_by_id(id).exec(&tx).await?;
        tx.commit().await?;

        info!(academic_year_id = id, "Deleted academic year {}", year.label);
        Ok(())
    }
}
