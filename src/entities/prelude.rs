pub use super::academic_year::Entity as AcademicYear;
pub use super::assessment_stage::Entity as AssessmentStage;
pub use super::class::Entity as Class;
pub use super::grade::Entity as Grade;
pub use super::semester::Entity as Semester;
pub use super::semester_choice::Entity as SemesterChoice;
pub use super::student::Entity as Student;
pub use super::subject::Entity as Subject;
pub use super::subject_semester_config::Entity as SubjectSemesterConfig;
pub use super::teaching_assignment::Entity as TeachingAssignment;
pub use super::user::Entity as User;
