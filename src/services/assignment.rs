use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    FromQueryResult, JoinType, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait, Set, TransactionTrait,
};
use tracing::info;

use crate::auth::AuthenticatedUser;
use crate::entities::{
    class, prelude::*, semester, subject, subject_semester_config, teaching_assignment,
    user::{self, UserRole},
};
use crate::error::{DbResultExt, ServiceError, ServiceResult};
use crate::services::class::find_class;
use crate::services::semester::{find_semester, require_active_semester};
use crate::services::subject::find_subject;
use crate::services::user::find_user;

#[derive(Clone)]
pub struct AssignmentService {
    db: DatabaseConnection,
}

/// Teaching assignment with the names of everything it points at.
#[derive(Debug, Clone, PartialEq, Eq, FromQueryResult)]
pub struct AssignmentView {
    pub id: i32,
    pub user_id: i32,
    pub teacher_username: String,
    pub subject_id: i32,
    pub subject_name: String,
    pub subject_code: String,
    pub class_id: i32,
    pub class_name: String,
    pub class_level: String,
    pub semester_id: i32,
    pub semester_name: String,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub user_id: Option<i32>,
    pub semester_id: Option<i32>,
    pub class_id: Option<i32>,
}

/// True when the teacher is assigned to (subject, class, semester) and the
/// subject is switched on for that semester.
pub(crate) async fn subject_open_to_teacher<C: ConnectionTrait>(
    conn: &C,
    teacher_id: i32,
    subject_id: i32,
    class_id: i32,
    semester_id: i32,
) -> ServiceResult<bool> {
    let assigned = TeachingAssignment::find()
        .filter(teaching_assignment::Column::UserId.eq(teacher_id))
        .filter(teaching_assignment::Column::SubjectId.eq(subject_id))
        .filter(teaching_assignment::Column::ClassId.eq(class_id))
        .filter(teaching_assignment::Column::SemesterId.eq(semester_id))
        .count(conn)
        .await?;
    if assigned == 0 {
        return Ok(false);
    }

    let enabled = SubjectSemesterConfig::find()
        .filter(subject_semester_config::Column::SubjectId.eq(subject_id))
        .filter(subject_semester_config::Column::SemesterId.eq(semester_id))
        .filter(subject_semester_config::Column::IsActive.eq(true))
        .count(conn)
        .await?;
    Ok(enabled > 0)
}

impl AssignmentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn create_assignment(
        &self,
        caller: &AuthenticatedUser,
        user_id: i32,
        subject_id: i32,
        class_id: i32,
        semester_id: i32,
    ) -> ServiceResult<AssignmentView> {
        caller.require_admin()?;

        let tx = self.db.begin().await?;

        let teacher = find_user(&tx, user_id).await?;
        if teacher.role != UserRole::Teacher {
            return Err(ServiceError::validation(format!(
                "User '{}' is not a teacher and cannot be assigned to teach",
                teacher.username
            )));
        }
        let subject = find_subject(&tx, subject_id).await?;
        let class = find_class(&tx, class_id).await?;
        let semester = find_semester(&tx, semester_id).await?;

        let created = teaching_assignment::ActiveModel {
            user_id: Set(teacher.id),
            subject_id: Set(subject.id),
            class_id: Set(class.id),
            semester_id: Set(semester.id),
            ..Default::default()
        }
        .insert(&tx)
        .await
        .or_duplicate(|| {
            format!(
                "{} already teaches {} to {} in {}",
                teacher.username,
                subject.name,
                class.display_name(),
                semester.name
            )
        })?;

        tx.commit().await?;

        info!(
            assignment_id = created.id,
            "Assigned {} to teach {} for {} in {}",
            teacher.username,
            subject.name,
            class.display_name(),
            semester.name
        );

        Ok(AssignmentView {
            id: created.id,
            user_id: teacher.id,
            teacher_username: teacher.username,
            subject_id: subject.id,
            subject_name: subject.name,
            subject_code: subject.code,
            class_id: class.id,
            class_name: class.name,
            class_level: class.level,
            semester_id: semester.id,
            semester_name: semester.name,
        })
    }

    pub async fn delete_assignment(&self, caller: &AuthenticatedUser, id: i32) -> ServiceResult<()> {
        caller.require_admin()?;

        let result = TeachingAssignment::delete_by_id(id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found(format!(
                "Teaching assignment {id} not found"
            )));
        }

        info!(assignment_id = id, "Deleted teaching assignment");
        Ok(())
    }

    /// Administrators see every assignment; teachers only their own.
    pub async fn list_assignments(
        &self,
        caller: &AuthenticatedUser,
        filter: AssignmentFilter,
    ) -> ServiceResult<Vec<AssignmentView>> {
        let user_id = if caller.is_admin() {
            filter.user_id
        } else {
            Some(caller.id)
        };

        let mut query = TeachingAssignment::find()
            .select_only()
            .column(teaching_assignment::Column::Id)
            .column(teaching_assignment::Column::UserId)
            .column_as(user::Column::Username, "teacher_username")
            .column(teaching_assignment::Column::SubjectId)
            .column_as(subject::Column::Name, "subject_name")
            .column_as(subject::Column::Code, "subject_code")
            .column(teaching_assignment::Column::ClassId)
            .column_as(class::Column::Name, "class_name")
            .column_as(class::Column::Level, "class_level")
            .column(teaching_assignment::Column::SemesterId)
            .column_as(semester::Column::Name, "semester_name")
            .join(JoinType::InnerJoin, teaching_assignment::Relation::User.def())
            .join(JoinType::InnerJoin, teaching_assignment::Relation::Subject.def())
            .join(JoinType::InnerJoin, teaching_assignment::Relation::Class.def())
            .join(JoinType::InnerJoin, teaching_assignment::Relation::Semester.def());

        if let Some(user_id) = user_id {
            query = query.filter(teaching_assignment::Column::UserId.eq(user_id));
        }
        if let Some(semester_id) = filter.semester_id {
            query = query.filter(teaching_assignment::Column::SemesterId.eq(semester_id));
        }
        if let Some(class_id) = filter.class_id {
            query = query.filter(teaching_assignment::Column::ClassId.eq(class_id));
        }

        let assignments = query
            .order_by_asc(user::Column::Username)
            .order_by_desc(teaching_assignment::Column::SemesterId)
            .order_by_asc(class::Column::Level)
            .order_by_asc(class::Column::Name)
            .order_by_asc(subject::Column::Name)
            .into_model::<AssignmentView>()
            .all(&self.db)
            .await?;
        Ok(assignments)
    }

    /// Classes the calling teacher is assigned to in the active semester.
    pub async fn my_classes(&self, caller: &AuthenticatedUser) -> ServiceResult<Vec<class::Model>> {
        caller.require_teacher()?;
        let active = require_active_semester(&self.db).await?;

        let classes = Class::find()
            .join(
                JoinType::InnerJoin,
                teaching_assignment::Relation::Class.def().rev(),
            )
            .filter(teaching_assignment::Column::UserId.eq(caller.id))
            .filter(teaching_assignment::Column::SemesterId.eq(active.id))
            .distinct()
            .order_by_asc(class::Column::Level)
            .order_by_asc(class::Column::Name)
            .all(&self.db)
            .await?;
        Ok(classes)
    }

    /// Subjects the calling teacher may grade for a class: assigned in the
    /// active semester and switched on for it.
    pub async fn my_subjects(
        &self,
        caller: &AuthenticatedUser,
        class_id: i32,
    ) -> ServiceResult<Vec<subject::Model>> {
        caller.require_teacher()?;
        let active = require_active_semester(&self.db).await?;

        let subjects = Subject::find()
            .join(
                JoinType::InnerJoin,
                teaching_assignment::Relation::Subject.def().rev(),
            )
            .join(
                JoinType::InnerJoin,
                subject_semester_config::Relation::Subject.def().rev(),
            )
            .filter(teaching_assignment::Column::UserId.eq(caller.id))
            .filter(teaching_assignment::Column::ClassId.eq(class_id))
            .filter(teaching_assignment::Column::SemesterId.eq(active.id))
            .filter(subject_semester_config::Column::SemesterId.eq(active.id))
            .filter(subject_semester_config::Column::IsActive.eq(true))
            .distinct()
            .order_by_asc(subject::Column::Name)
            .all(&self.db)
            .await?;
        Ok(subjects)
    }
}
