use async_graphql::*;

use crate::auth::require_auth;
use crate::graphql::types::{
    AcademicYear, AssessmentStage, AssessmentStageInput, AuthPayload, ClassInput,
    CreateAssignmentInput, CreateSemesterInput, CreateUserInput, EnterGradesInput,
    EnterGradesPayload, Grade, LoginInput, MessageResponse, SchoolClass, Semester,
    SetSubjectActiveInput, Student, StudentInput, Subject, SubjectInput, SubjectSemesterConfig,
    TeachingAssignment, UpdateGradeInput, UpdateUserInput, User,
};
use crate::services::{
    AcademicYearService, AssessmentStageService, AssignmentService, ClassService, GradeService,
    SemesterService, StudentService, SubjectConfigService, SubjectService, UserService,
};

pub struct MutationRoot;

#[Object]
impl MutationRoot {
    async fn login(&self, ctx: &Context<'_>, input: LoginInput) -> Result<AuthPayload> {
        let user_service = ctx.data::<UserService>()?;

        let (user, access_token) = user_service
            .authenticate(&input.username, &input.password)
            .await
            .map_err(|e| e.extend())?;

        Ok(AuthPayload {
            user: user.into(),
            access_token,
        })
    }

    // Academic years

    async fn create_academic_year(&self, ctx: &Context<'_>, label: String) -> Result<AcademicYear> {
        let caller = require_auth(ctx)?;
        let year = ctx
            .data::<AcademicYearService>()?
            .create_academic_year(caller, &label)
            .await
            .map_err(|e| e.extend())?;

        Ok(year.into())
    }

    async fn update_academic_year(
        &self,
        ctx: &Context<'_>,
        id: i32,
        label: String,
    ) -> Result<AcademicYear> {
        let caller = require_auth(ctx)?;
        let year = ctx
            .data::<AcademicYearService>()?
            .update_academic_year(caller, id, &label)
            .await
            .map_err(|e| e.extend())?;

        Ok(year.into())
    }

    async fn delete_academic_year(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<AcademicYearService>()?
            .delete_academic_year(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Academic year deleted"))
    }

    // Semesters

    async fn create_semester(
        &self,
        ctx: &Context<'_>,
        input: CreateSemesterInput,
    ) -> Result<Semester> {
        let caller = require_auth(ctx)?;
        let semester = ctx
            .data::<SemesterService>()?
            .create_semester(caller, input.academic_year_id, input.semester_choice_id)
            .await
            .map_err(|e| e.extend())?;

        Ok(semester.into())
    }

    async fn activate_semester(&self, ctx: &Context<'_>, id: i32) -> Result<Semester> {
        let caller = require_auth(ctx)?;
        let semester = ctx
            .data::<SemesterService>()?
            .activate_semester(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(semester.into())
    }

    async fn delete_semester(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<SemesterService>()?
            .delete_semester(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new(
            "Semester deleted together with its grades, assignments and subject settings",
        ))
    }

    // Classes

    async fn create_class(&self, ctx: &Context<'_>, input: ClassInput) -> Result<SchoolClass> {
        let caller = require_auth(ctx)?;
        let class = ctx
            .data::<ClassService>()?
            .create_class(caller, &input.name, &input.level)
            .await
            .map_err(|e| e.extend())?;

        Ok(class.into())
    }

    async fn update_class(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: ClassInput,
    ) -> Result<SchoolClass> {
        let caller = require_auth(ctx)?;
        let class = ctx
            .data::<ClassService>()?
            .update_class(caller, id, &input.name, &input.level)
            .await
            .map_err(|e| e.extend())?;

        Ok(class.into())
    }

    async fn delete_class(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<ClassService>()?
            .delete_class(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Class deleted; its students are now unassigned"))
    }

    // Subjects

    async fn create_subject(&self, ctx: &Context<'_>, input: SubjectInput) -> Result<Subject> {
        let caller = require_auth(ctx)?;
        let subject = ctx
            .data::<SubjectService>()?
            .create_subject(caller, &input.name, &input.code)
            .await
            .map_err(|e| e.extend())?;

        Ok(subject.into())
    }

    async fn update_subject(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: SubjectInput,
    ) -> Result<Subject> {
        let caller = require_auth(ctx)?;
        let subject = ctx
            .data::<SubjectService>()?
            .update_subject(caller, id, &input.name, &input.code)
            .await
            .map_err(|e| e.extend())?;

        Ok(subject.into())
    }

    async fn delete_subject(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<SubjectService>()?
            .delete_subject(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Subject deleted"))
    }

    async fn set_subject_active(
        &self,
        ctx: &Context<'_>,
        input: SetSubjectActiveInput,
    ) -> Result<SubjectSemesterConfig> {
        let caller = require_auth(ctx)?;
        let config = ctx
            .data::<SubjectConfigService>()?
            .set_subject_active(caller, input.subject_id, input.semester_id, input.is_active)
            .await
            .map_err(|e| e.extend())?;

        Ok(config.into())
    }

    // Assessment stages

    async fn create_assessment_stage(
        &self,
        ctx: &Context<'_>,
        input: AssessmentStageInput,
    ) -> Result<AssessmentStage> {
        let caller = require_auth(ctx)?;
        let stage = ctx
            .data::<AssessmentStageService>()?
            .create_stage(caller, &input.name, input.description)
            .await
            .map_err(|e| e.extend())?;

        Ok(stage.into())
    }

    async fn update_assessment_stage(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: AssessmentStageInput,
    ) -> Result<AssessmentStage> {
        let caller = require_auth(ctx)?;
        let stage = ctx
            .data::<AssessmentStageService>()?
            .update_stage(caller, id, &input.name, input.description)
            .await
            .map_err(|e| e.extend())?;

        Ok(stage.into())
    }

    async fn delete_assessment_stage(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<AssessmentStageService>()?
            .delete_stage(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Assessment stage deleted"))
    }

    // Accounts

    async fn create_user(&self, ctx: &Context<'_>, input: CreateUserInput) -> Result<User> {
        let caller = require_auth(ctx)?;
        let user = ctx
            .data::<UserService>()?
            .create_user(caller, &input.username, &input.password, input.role)
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }

    async fn update_user(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: UpdateUserInput,
    ) -> Result<User> {
        let caller = require_auth(ctx)?;
        let user = ctx
            .data::<UserService>()?
            .update_user(
                caller,
                id,
                &input.username,
                input.password.as_deref(),
                input.role,
            )
            .await
            .map_err(|e| e.extend())?;

        Ok(user.into())
    }

    async fn delete_user(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<UserService>()?
            .delete_user(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("User deleted"))
    }

    // Teaching assignments

    async fn create_teaching_assignment(
        &self,
        ctx: &Context<'_>,
        input: CreateAssignmentInput,
    ) -> Result<TeachingAssignment> {
        let caller = require_auth(ctx)?;
        let assignment = ctx
            .data::<AssignmentService>()?
            .create_assignment(
                caller,
                input.user_id,
                input.subject_id,
                input.class_id,
                input.semester_id,
            )
            .await
            .map_err(|e| e.extend())?;

        Ok(assignment.into())
    }

    async fn delete_teaching_assignment(
        &self,
        ctx: &Context<'_>,
        id: i32,
    ) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<AssignmentService>()?
            .delete_assignment(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Teaching assignment deleted"))
    }

    // Students

    async fn create_student(&self, ctx: &Context<'_>, input: StudentInput) -> Result<Student> {
        let caller = require_auth(ctx)?;
        let student = ctx
            .data::<StudentService>()?
            .create_student(caller, input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(student.into())
    }

    async fn update_student(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: StudentInput,
    ) -> Result<Student> {
        let caller = require_auth(ctx)?;
        let student = ctx
            .data::<StudentService>()?
            .update_student(caller, id, input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(student.into())
    }

    async fn delete_student(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<StudentService>()?
            .delete_student(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Student and their grades deleted"))
    }

    // Grades

    async fn enter_grades(
        &self,
        ctx: &Context<'_>,
        input: EnterGradesInput,
    ) -> Result<EnterGradesPayload> {
        let caller = require_auth(ctx)?;
        let inserted = ctx
            .data::<GradeService>()?
            .enter_grades(caller, input.into())
            .await
            .map_err(|e| e.extend())?;

        Ok(EnterGradesPayload { inserted })
    }

    async fn update_grade(
        &self,
        ctx: &Context<'_>,
        id: i32,
        input: UpdateGradeInput,
    ) -> Result<Grade> {
        let caller = require_auth(ctx)?;
        let grade = ctx
            .data::<GradeService>()?
            .update_grade(caller, id, input.value, input.note)
            .await
            .map_err(|e| e.extend())?;

        Ok(grade.into())
    }

    async fn delete_grade(&self, ctx: &Context<'_>, id: i32) -> Result<MessageResponse> {
        let caller = require_auth(ctx)?;
        ctx.data::<GradeService>()?
            .delete_grade(caller, id)
            .await
            .map_err(|e| e.extend())?;

        Ok(MessageResponse::new("Grade deleted"))
    }
}
