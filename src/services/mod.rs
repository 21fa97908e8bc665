pub mod academic_year;
pub mod assignment;
pub mod class;
pub mod grade;
pub mod semester;
pub mod stage;
pub mod student;
pub mod subject;
pub mod subject_config;
pub mod user;

pub use academic_year::*;
pub use assignment::*;
pub use class::*;
pub use grade::*;
pub use semester::*;
pub use stage::*;
pub use student::*;
pub use subject::*;
pub use subject_config::*;
pub use user::*;
