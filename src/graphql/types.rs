use async_graphql::*;
use chrono::NaiveDate;

use crate::entities::{self, user::UserRole};
use crate::services;

fn class_label(level: Option<&str>, name: Option<&str>) -> Option<String> {
    match (level, name) {
        (Some(level), Some(name)) => Some(format!("{level} - {name}")),
        _ => None,
    }
}

#[derive(SimpleObject)]
pub struct AcademicYear {
    pub id: i32,
    pub label: String,
}

impl From<entities::academic_year::Model> for AcademicYear {
    fn from(year: entities::academic_year::Model) -> Self {
        Self {
            id: year.id,
            label: year.label,
        }
    }
}

#[derive(SimpleObject)]
pub struct SemesterChoice {
    pub id: i32,
    pub name: String,
}

impl From<entities::semester_choice::Model> for SemesterChoice {
    fn from(choice: entities::semester_choice::Model) -> Self {
        Self {
            id: choice.id,
            name: choice.name,
        }
    }
}

#[derive(SimpleObject)]
pub struct Semester {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub academic_year_id: i32,
    pub academic_year: String,
    pub semester_choice_id: i32,
    pub semester_choice: String,
}

impl From<services::SemesterView> for Semester {
    fn from(view: services::SemesterView) -> Self {
        Self {
            id: view.id,
            name: view.name,
            is_active: view.is_active,
            academic_year_id: view.academic_year_id,
            academic_year: view.academic_year,
            semester_choice_id: view.semester_choice_id,
            semester_choice: view.semester_choice,
        }
    }
}

#[derive(SimpleObject)]
#[graphql(complex, name = "Class")]
pub struct SchoolClass {
    pub id: i32,
    pub name: String,
    pub level: String,
}

#[ComplexObject]
impl SchoolClass {
    /// "<level> - <name>"
    async fn display_name(&self) -> String {
        format!("{} - {}", self.level, self.name)
    }
}

impl From<entities::class::Model> for SchoolClass {
    fn from(class: entities::class::Model) -> Self {
        Self {
            id: class.id,
            name: class.name,
            level: class.level,
        }
    }
}

#[derive(SimpleObject)]
pub struct Subject {
    pub id: i32,
    pub name: String,
    pub code: String,
}

impl From<entities::subject::Model> for Subject {
    fn from(subject: entities::subject::Model) -> Self {
        Self {
            id: subject.id,
            name: subject.name,
            code: subject.code,
        }
    }
}

#[derive(SimpleObject)]
pub struct AssessmentStage {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
}

impl From<entities::assessment_stage::Model> for AssessmentStage {
    fn from(stage: entities::assessment_stage::Model) -> Self {
        Self {
            id: stage.id,
            name: stage.name,
            description: stage.description,
        }
    }
}

#[derive(SimpleObject)]
pub struct SubjectSemesterConfig {
    pub id: i32,
    pub subject_id: i32,
    pub semester_id: i32,
    pub is_active: bool,
}

impl From<entities::subject_semester_config::Model> for SubjectSemesterConfig {
    fn from(config: entities::subject_semester_config::Model) -> Self {
        Self {
            id: config.id,
            subject_id: config.subject_id,
            semester_id: config.semester_id,
            is_active: config.is_active,
        }
    }
}

/// Account without its credential.
#[derive(SimpleObject)]
pub struct User {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

impl From<entities::user::Model> for User {
    fn from(user: entities::user::Model) -> Self {
        Self {
            id: user.id,
            username: user.username,
            role: user.role,
        }
    }
}

#[derive(SimpleObject)]
pub struct TeachingAssignment {
    pub id: i32,
    pub user_id: i32,
    pub teacher_username: String,
    pub subject_id: i32,
    pub subject_name: String,
    pub subject_code: String,
    pub class_id: i32,
    pub class_name: String,
    pub semester_id: i32,
    pub semester_name: String,
}

impl From<services::AssignmentView> for TeachingAssignment {
    fn from(view: services::AssignmentView) -> Self {
        Self {
            id: view.id,
            user_id: view.user_id,
            teacher_username: view.teacher_username,
            subject_id: view.subject_id,
            subject_name: view.subject_name,
            subject_code: view.subject_code,
            class_id: view.class_id,
            class_name: format!("{} - {}", view.class_level, view.class_name),
            semester_id: view.semester_id,
            semester_name: view.semester_name,
        }
    }
}

#[derive(SimpleObject)]
pub struct Student {
    pub id: i32,
    /// National student identification number
    pub nisn: i64,
    pub name: String,
    pub class_id: Option<i32>,
    /// `None` when the student is not placed in a class
    pub class_name: Option<String>,
}

impl From<services::StudentView> for Student {
    fn from(view: services::StudentView) -> Self {
        Self {
            id: view.id,
            nisn: view.nisn,
            name: view.name,
            class_id: view.class_id,
            class_name: class_label(view.class_level.as_deref(), view.class_name.as_deref()),
        }
    }
}

#[derive(SimpleObject)]
pub struct ClassMember {
    pub id: i32,
    pub nisn: i64,
    pub name: String,
}

impl From<entities::student::Model> for ClassMember {
    fn from(student: entities::student::Model) -> Self {
        Self {
            id: student.id,
            nisn: student.nisn,
            name: student.name,
        }
    }
}

#[derive(SimpleObject)]
pub struct Grade {
    pub id: i32,
    pub student_id: i32,
    pub subject_id: i32,
    pub semester_id: i32,
    pub stage_id: i32,
    pub value: f64,
    pub entry_date: NaiveDate,
    pub teacher_id: i32,
    pub note: Option<String>,
}

impl From<entities::grade::Model> for Grade {
    fn from(grade: entities::grade::Model) -> Self {
        Self {
            id: grade.id,
            student_id: grade.student_id,
            subject_id: grade.subject_id,
            semester_id: grade.semester_id,
            stage_id: grade.stage_id,
            value: grade.value,
            entry_date: grade.entry_date,
            teacher_id: grade.teacher_id,
            note: grade.note,
        }
    }
}

#[derive(SimpleObject)]
pub struct GradeSheetRow {
    pub student_id: i32,
    pub nisn: i64,
    pub name: String,
    /// Set when the student already has a grade for this stage
    pub grade_id: Option<i32>,
    pub value: Option<f64>,
}

impl From<services::GradeSheetRow> for GradeSheetRow {
    fn from(row: services::GradeSheetRow) -> Self {
        Self {
            student_id: row.student_id,
            nisn: row.nisn,
            name: row.name,
            grade_id: row.grade_id,
            value: row.value,
        }
    }
}

#[derive(SimpleObject)]
pub struct GradeHistoryEntry {
    pub grade_id: i32,
    pub student_id: i32,
    pub nisn: i64,
    pub student_name: String,
    pub class_name: Option<String>,
    pub subject_id: i32,
    pub subject_name: String,
    pub semester_id: i32,
    pub semester_name: String,
    pub stage_id: i32,
    pub stage_name: String,
    pub value: f64,
    pub entry_date: NaiveDate,
    pub note: Option<String>,
}

impl From<services::GradeHistoryEntry> for GradeHistoryEntry {
    fn from(entry: services::GradeHistoryEntry) -> Self {
        Self {
            class_name: class_label(entry.class_level.as_deref(), entry.class_name.as_deref()),
            grade_id: entry.grade_id,
            student_id: entry.student_id,
            nisn: entry.nisn,
            student_name: entry.student_name,
            subject_id: entry.subject_id,
            subject_name: entry.subject_name,
            semester_id: entry.semester_id,
            semester_name: entry.semester_name,
            stage_id: entry.stage_id,
            stage_name: entry.stage_name,
            value: entry.value,
            entry_date: entry.entry_date,
            note: entry.note,
        }
    }
}

#[derive(SimpleObject)]
pub struct EnterGradesPayload {
    pub inserted: u64,
}

#[derive(SimpleObject)]
pub struct AuthPayload {
    pub user: User,
    pub access_token: String,
}

#[derive(SimpleObject)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

// Inputs

#[derive(InputObject)]
pub struct LoginInput {
    pub username: String,
    pub password: String,
}

#[derive(InputObject)]
pub struct CreateSemesterInput {
    pub academic_year_id: i32,
    pub semester_choice_id: i32,
}

#[derive(InputObject)]
pub struct ClassInput {
    pub name: String,
    pub level: String,
}

#[derive(InputObject)]
pub struct SubjectInput {
    pub name: String,
    pub code: String,
}

#[derive(InputObject)]
pub struct AssessmentStageInput {
    pub name: String,
    pub description: Option<String>,
}

#[derive(InputObject)]
pub struct SetSubjectActiveInput {
    pub subject_id: i32,
    pub semester_id: i32,
    pub is_active: bool,
}

#[derive(InputObject)]
pub struct CreateUserInput {
    pub username: String,
    pub password: String,
    pub role: UserRole,
}

#[derive(InputObject)]
pub struct UpdateUserInput {
    pub username: String,
    /// Leave empty to keep the current password
    pub password: Option<String>,
    pub role: UserRole,
}

#[derive(InputObject)]
pub struct CreateAssignmentInput {
    pub user_id: i32,
    pub subject_id: i32,
    pub class_id: i32,
    pub semester_id: i32,
}

#[derive(InputObject, Default)]
pub struct AssignmentFilterInput {
    pub user_id: Option<i32>,
    pub semester_id: Option<i32>,
    pub class_id: Option<i32>,
}

impl From<AssignmentFilterInput> for services::AssignmentFilter {
    fn from(input: AssignmentFilterInput) -> Self {
        Self {
            user_id: input.user_id,
            semester_id: input.semester_id,
            class_id: input.class_id,
        }
    }
}

#[derive(InputObject)]
pub struct StudentInput {
    pub nisn: i64,
    pub name: String,
    pub class_id: Option<i32>,
}

impl From<StudentInput> for services::StudentInput {
    fn from(input: StudentInput) -> Self {
        Self {
            nisn: input.nisn,
            name: input.name,
            class_id: input.class_id,
        }
    }
}

#[derive(InputObject)]
pub struct EnterGradesInput {
    pub student_ids: Vec<i32>,
    pub subject_id: i32,
    pub semester_id: i32,
    pub stage_id: i32,
    /// One value per student, same order as `studentIds`
    pub values: Vec<f64>,
    pub note: Option<String>,
}

impl From<EnterGradesInput> for services::GradeBatch {
    fn from(input: EnterGradesInput) -> Self {
        Self {
            subject_id: input.subject_id,
            semester_id: input.semester_id,
            stage_id: input.stage_id,
            student_ids: input.student_ids,
            values: input.values,
            note: input.note,
        }
    }
}

#[derive(InputObject)]
pub struct UpdateGradeInput {
    pub value: f64,
    pub note: Option<String>,
}

#[derive(InputObject, Default)]
pub struct GradeHistoryFilterInput {
    pub class_id: Option<i32>,
    pub subject_id: Option<i32>,
    pub semester_id: Option<i32>,
    pub stage_id: Option<i32>,
}

impl From<GradeHistoryFilterInput> for services::GradeHistoryFilter {
    fn from(input: GradeHistoryFilterInput) -> Self {
        Self {
            class_id: input.class_id,
            subject_id: input.subject_id,
            semester_id: input.semester_id,
            stage_id: input.stage_id,
        }
    }
}
