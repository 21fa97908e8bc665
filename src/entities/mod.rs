pub mod prelude;

pub mod academic_year;
pub mod assessment_stage;
pub mod class;
pub mod grade;
pub mod semester;
pub mod semester_choice;
pub mod student;
pub mod subject;
pub mod subject_semester_config;
pub mod teaching_assignment;
pub mod user;
