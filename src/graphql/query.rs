use async_graphql::*;

use crate::auth::require_auth;
use crate::entities::user::UserRole;
use crate::error::ServiceError;
use crate::graphql::types::{
    AcademicYear, AssessmentStage, AssignmentFilterInput, ClassMember, GradeHistoryEntry,
    GradeHistoryFilterInput, GradeSheetRow, SchoolClass, Semester, SemesterChoice, Student,
    Subject, SubjectSemesterConfig, TeachingAssignment, User,
};
use crate::services::{
    AcademicYearService, AssessmentStageService, AssignmentService, ClassService, GradeService,
    SemesterService, StudentService, SubjectConfigService, SubjectService, UserService,
};

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    async fn me(&self, ctx: &Context<'_>) -> Result<User> {
        let caller = require_auth(ctx)?;
        let user_service = ctx.data::<UserService>()?;

        let user = user_service
            .find_user_by_id(caller.id)
            .await
            .map_err(|e| e.extend())?
            .ok_or_else(|| ServiceError::not_found("Account no longer exists").extend())?;

        Ok(user.into())
    }

    async fn health(&self) -> &str {
        "OK"
    }

    async fn academic_years(&self, ctx: &Context<'_>) -> Result<Vec<AcademicYear>> {
        let caller = require_auth(ctx)?;
        let years = ctx
            .data::<AcademicYearService>()?
            .list_academic_years(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(years.into_iter().map(Into::into).collect())
    }

    async fn semester_choices(&self, ctx: &Context<'_>) -> Result<Vec<SemesterChoice>> {
        let caller = require_auth(ctx)?;
        let choices = ctx
            .data::<SemesterService>()?
            .list_semester_choices(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(choices.into_iter().map(Into::into).collect())
    }

    async fn semesters(&self, ctx: &Context<'_>) -> Result<Vec<Semester>> {
        let caller = require_auth(ctx)?;
        let semesters = ctx
            .data::<SemesterService>()?
            .list_semesters(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(semesters.into_iter().map(Into::into).collect())
    }

    async fn active_semester(&self, ctx: &Context<'_>) -> Result<Option<Semester>> {
        let caller = require_auth(ctx)?;
        let active = ctx
            .data::<SemesterService>()?
            .get_active_semester(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(active.map(Into::into))
    }

    async fn classes(&self, ctx: &Context<'_>) -> Result<Vec<SchoolClass>> {
        let caller = require_auth(ctx)?;
        let classes = ctx
            .data::<ClassService>()?
            .list_classes(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(classes.into_iter().map(Into::into).collect())
    }

    async fn subjects(&self, ctx: &Context<'_>) -> Result<Vec<Subject>> {
        let caller = require_auth(ctx)?;
        let subjects = ctx
            .data::<SubjectService>()?
            .list_subjects(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(subjects.into_iter().map(Into::into).collect())
    }

    async fn assessment_stages(&self, ctx: &Context<'_>) -> Result<Vec<AssessmentStage>> {
        let caller = require_auth(ctx)?;
        let stages = ctx
            .data::<AssessmentStageService>()?
            .list_stages(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(stages.into_iter().map(Into::into).collect())
    }

    async fn subject_configs_for_semester(
        &self,
        ctx: &Context<'_>,
        semester_id: i32,
    ) -> Result<Vec<SubjectSemesterConfig>> {
        let caller = require_auth(ctx)?;
        let configs = ctx
            .data::<SubjectConfigService>()?
            .list_configs_for_semester(caller, semester_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(configs.into_iter().map(Into::into).collect())
    }

    async fn subject_configs_for_subject(
        &self,
        ctx: &Context<'_>,
        subject_id: i32,
    ) -> Result<Vec<SubjectSemesterConfig>> {
        let caller = require_auth(ctx)?;
        let configs = ctx
            .data::<SubjectConfigService>()?
            .list_configs_for_subject(caller, subject_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(configs.into_iter().map(Into::into).collect())
    }

    // Admin-only account listing
    async fn users(&self, ctx: &Context<'_>, role: Option<UserRole>) -> Result<Vec<User>> {
        let caller = require_auth(ctx)?;
        let users = ctx
            .data::<UserService>()?
            .list_users(caller, role)
            .await
            .map_err(|e| e.extend())?;

        Ok(users.into_iter().map(Into::into).collect())
    }

    async fn teaching_assignments(
        &self,
        ctx: &Context<'_>,
        filter: Option<AssignmentFilterInput>,
    ) -> Result<Vec<TeachingAssignment>> {
        let caller = require_auth(ctx)?;
        let assignments = ctx
            .data::<AssignmentService>()?
            .list_assignments(caller, filter.unwrap_or_default().into())
            .await
            .map_err(|e| e.extend())?;

        Ok(assignments.into_iter().map(Into::into).collect())
    }

    async fn students(&self, ctx: &Context<'_>, search: Option<String>) -> Result<Vec<Student>> {
        let caller = require_auth(ctx)?;
        let students = ctx
            .data::<StudentService>()?
            .search_students(caller, search.as_deref())
            .await
            .map_err(|e| e.extend())?;

        Ok(students.into_iter().map(Into::into).collect())
    }

    async fn student(&self, ctx: &Context<'_>, id: i32) -> Result<Student> {
        let caller = require_auth(ctx)?;
        let student = ctx
            .data::<StudentService>()?
            .get_student(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(student.into())
    }

    async fn class_students(&self, ctx: &Context<'_>, class_id: i32) -> Result<Vec<ClassMember>> {
        let caller = require_auth(ctx)?;
        let students = ctx
            .data::<StudentService>()?
            .list_students_in_class(caller, class_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(students.into_iter().map(Into::into).collect())
    }

    // Teacher scope, always relative to the active semester
    async fn my_classes(&self, ctx: &Context<'_>) -> Result<Vec<SchoolClass>> {
        let caller = require_auth(ctx)?;
        let classes = ctx
            .data::<AssignmentService>()?
            .my_classes(caller)
            .await
            .map_err(|e| e.extend())?;

        Ok(classes.into_iter().map(Into::into).collect())
    }

    async fn my_subjects(&self, ctx: &Context<'_>, class_id: i32) -> Result<Vec<Subject>> {
        let caller = require_auth(ctx)?;
        let subjects = ctx
            .data::<AssignmentService>()?
            .my_subjects(caller, class_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(subjects.into_iter().map(Into::into).collect())
    }

    async fn grade_sheet(
        &self,
        ctx: &Context<'_>,
        class_id: i32,
        subject_id: i32,
        stage_id: i32,
    ) -> Result<Vec<GradeSheetRow>> {
        let caller = require_auth(ctx)?;
        let rows = ctx
            .data::<GradeService>()?
            .grade_sheet(caller, class_id, subject_id, stage_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn grade_history(
        &self,
        ctx: &Context<'_>,
        filter: Option<GradeHistoryFilterInput>,
    ) -> Result<Vec<GradeHistoryEntry>> {
        let caller = require_auth(ctx)?;
        let entries = ctx
            .data::<GradeService>()?
            .grade_history(caller, filter.unwrap_or_default().into())
            .await
            .map_err(|e| e.extend())?;

        Ok(entries.into_iter().map(Into::into).collect())
    }
}
