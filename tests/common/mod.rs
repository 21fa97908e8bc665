//! Shared fixture: a migrated, seeded in-memory SQLite store plus every
//! service wired to it.

#![allow(dead_code, clippy::unwrap_used)]

use gradebook::auth::{AuthenticatedUser, JwtService};
use gradebook::config::SeedAccounts;
use gradebook::entities::{prelude::*, user};
use gradebook::entities::user::UserRole;
use gradebook::seed::seed_defaults;
use gradebook::services::*;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ColumnTrait, ConnectOptions, Database, DatabaseConnection, EntityTrait, QueryFilter};

pub const JWT_SECRET: &str = "test-secret";

pub struct TestApp {
    pub db: DatabaseConnection,
    pub admin: AuthenticatedUser,
    pub teacher: AuthenticatedUser,
    pub academic_years: AcademicYearService,
    pub semesters: SemesterService,
    pub classes: ClassService,
    pub subjects: SubjectService,
    pub stages: AssessmentStageService,
    pub subject_configs: SubjectConfigService,
    pub users: UserService,
    pub assignments: AssignmentService,
    pub students: StudentService,
    pub grades: GradeService,
}

/// Ids of a ready-to-grade setup: active semester, the seeded teacher
/// assigned to Mathematics for class "10 - A", Mathematics switched on,
/// and three students in the class.
pub struct GradingFixture {
    pub semester_id: i32,
    pub subject_id: i32,
    pub class_id: i32,
    pub stage_id: i32,
    pub other_stage_id: i32,
    pub students: Vec<i32>,
}

pub async fn connect() -> DatabaseConnection {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).min_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

async fn caller(db: &DatabaseConnection, username: &str) -> AuthenticatedUser {
    let account = User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .unwrap()
        .unwrap();
    AuthenticatedUser::from(&account)
}

pub async fn setup() -> TestApp {
    let db = connect().await;
    let accounts = SeedAccounts::default();
    seed_defaults(&db, &accounts, 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */).await.unwrap();

    let admin = caller(&db, &accounts.admin_username).await;
    let teacher = caller(&db, &accounts.teacher_username).await;
    let jwt = JwtService::new(JWT_SECRET, 1);

    TestApp {
        admin,
        teacher,
        academic_years: AcademicYearService::new(db.clone()),
        semesters: SemesterService::new(db.clone()),
        classes: ClassService::new(db.clone()),
        subjects: SubjectService::new(db.clone()),
        stages: AssessmentStageService::new(db.clone()),
        subject_configs: SubjectConfigService::new(db.clone()),
        users: UserService::new(db.clone(), jwt, 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */),
        assignments: AssignmentService::new(db.clone()),
        students: StudentService::new(db.clone()),
        grades: GradeService::new(db.clone()),
        db,
    }
}

impl TestApp {
    pub async fn new_semester(&self, year: &str, choice: &str) -> SemesterView {
        let years = self.academic_years.list_academic_years(&self.admin).await.unwrap();
        let year_id = match years.iter().find(|y| y.label == year) {
            Some(existing) => existing.id,
            None => {
                self.academic_years
                    .create_academic_year(&self.admin, year)
                    .await
                    .unwrap()
                    .id
            }
        };
        let choice_id = self
            .semesters
            .list_semester_choices(&self.admin)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.name == choice)
            .unwrap()
            .id;

        self.semesters
            .create_semester(&self.admin, year_id, choice_id)
            .await
            .unwrap()
    }

    pub async fn new_teacher(&self, username: &str) -> AuthenticatedUser {
        let account = self
            .users
            .create_user(&self.admin, username, "secret", UserRole::Teacher)
            .await
            .unwrap();
        AuthenticatedUser::from(&account)
    }

    pub async fn class_id(&self, level: &str, name: &str) -> i32 {
        self.classes
            .list_classes(&self.admin)
            .await
            .unwrap()
            .into_iter()
            .find(|c| c.level == level && c.name == name)
            .unwrap()
            .id
    }

    pub async fn subject_id(&self, code: &str) -> i32 {
        self.subjects
            .list_subjects(&self.admin)
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.code == code)
            .unwrap()
            .id
    }

    pub async fn stage_id(&self, name: &str) -> i32 {
        self.stages
            .list_stages(&self.admin)
            .await
            .unwrap()
            .into_iter()
            .find(|s| s.name == name)
            .unwrap()
            .id
    }

    pub async fn add_student(&self, nisn: i64, name: &str, class_id: Option<i32>) -> i32 {
        self.students
            .create_student(
                &self.admin,
                StudentInput {
                    nisn,
                    name: name.to_string(),
                    class_id,
                },
            )
            .await
            .unwrap()
            .id
    }

    pub async fn grading_fixture(&self) -> GradingFixture {
        let semester = self.new_semester("2025/2026", "Odd").await;
        self.semesters
            .activate_semester(&self.admin, semester.id)
            .await
            .unwrap();

        let class_id = self.class_id("10", "A").await;
        let subject_id = self.subject_id("MATH-X").await;

        self.assignments
            .create_assignment(&self.admin, self.teacher.id, subject_id, class_id, semester.id)
            .await
            .unwrap();
        self.subject_configs
            .set_subject_active(&self.admin, subject_id, semester.id, true)
            .await
            .unwrap();

        let students = vec![
            self.add_student(1001, "Budi", Some(class_id)).await,
            self.add_student(1002, "Ani", Some(class_id)).await,
            self.add_student(1003, "Citra", Some(class_id)).await,
        ];

        GradingFixture {
            semester_id: semester.id,
            subject_id,
            class_id,
            stage_id: self.stage_id("UTS").await,
            other_stage_id: self.stage_id("UAS").await,
            students,
        }
    }

    pub fn batch(&self, fx: &GradingFixture, student_ids: Vec<i32>, values: Vec<f64>) -> GradeBatch {
        GradeBatch {
            subject_id: fx.subject_id,
            semester_id: fx.semester_id,
            stage_id: fx.stage_id,
            student_ids,
            values,
            note: None,
        }
    }
}
