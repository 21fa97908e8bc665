//! First-start reference data. Each table is filled only while it is empty,
//! so running this on every startup is harmless.

use sea_orm::{
    ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::auth::hash_password;
use crate::config::SeedAccounts;
use crate::entities::{
    assessment_stage, class, prelude::*, semester_choice, subject,
    user::{self, UserRole},
};
use crate::error::ServiceResult;

pub const SEMESTER_CHOICES: [&str; 2] = ["Odd", "Even"];

/// (name, level)
pub const DEFAULT_CLASSES: [(&str, &str); 5] =
    [("A", "10"), ("B", "10"), ("C", "10"), ("A", "11"), ("B", "11")];

/// (name, code)
pub const DEFAULT_SUBJECTS: [(&str, &str); 4] = [
    ("Mathematics", "MATH-X"),
    ("Indonesian Language", "BINDO-X"),
    ("Physics", "PHYS-X"),
    ("Chemistry", "CHEM-X"),
];

/// (name, description)
pub const DEFAULT_STAGES: [(&str, &str); 4] = [
    ("UTS", "Midterm exam"),
    ("UAS", "Final exam"),
    ("Daily", "Daily assignments"),
    ("Practical", "Practical work"),
];

/// Rows inserted per table by one run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub semester_choices: usize,
    pub users: usize,
    pub classes: usize,
    pub subjects: usize,
    pub stages: usize,
}

impl SeedReport {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

pub async fn seed_defaults(
    db: &DatabaseConnection,
    accounts: &SeedAccounts,
    bcrypt_cost: u32,
) -> ServiceResult<SeedReport> {
    let mut report = SeedReport::default();
    let tx = db.begin().await?;

    if SemesterChoice::find().count(&tx).await? == 0 {
        for name in SEMESTER_CHOICES {
            semester_choice::ActiveModel {
                name: Set(name.to_string()),
                ..Default::default()
            }
            .insert(&tx)
            .await?;
        }
        report.semester_choices = SEMESTER_CHOICES.len();
    }

    if User::find().count(&tx).await? == 0 {
        let placeholders = [
            (&accounts.admin_username, &accounts.admin_password, UserRole::Admin),
            (&accounts.teacher_username, &accounts.teacher_password, UserRole::Teacher),
        ];
        for (username, password, role) in placeholders {
            user::ActiveModel {
                username: Set(username.clone()),
                password_hash: Set(hash_password(password, bcrypt_cost)?),
                role: Set(role),
                ..Default::default()
            }
            .insert(&tx)
            .await?;
        }
        report.users = placeholders.len();
    }

    if Class::find().count(&tx).await? == 0 {
        for (name, level) in DEFAULT_CLASSES {
            class::ActiveModel {
                name: Set(name.to_string()),
                level: Set(level.to_string()),
                ..Default::default()
            }
            .insert(&tx)
            .await?;
        }
        report.classes = DEFAULT_CLASSES.len();
    }

    if Subject::find().count(&tx).await? == 0 {
        for (name, code) in DEFAULT_SUBJECTS {
            subject::ActiveModel {
                name: Set(name.to_string()),
                code: Set(code.to_string()),
                ..Default::default()
            }
            .insert(&tx)
            .await?;
        }
        report.subjects = DEFAULT_SUBJECTS.len();
    }

    if AssessmentStage::find().count(&tx).await? == 0 {
        for (name, description) in DEFAULT_STAGES {
            assessment_stage::ActiveModel {
                name: Set(name.to_string()),
                description: Set(Some(description.to_string())),
                ..Default::default()
            }
            .insert(&tx)
            .await?;
        }
        report.stages = DEFAULT_STAGES.len();
    }

    tx.commit().await?;

    if report.is_empty() {
        debug!("Seed data already present");
    } else {
        info!(
            semester_choices = report.semester_choices,
            users = report.users,
            classes = report.classes,
            subjects = report.subjects,
            stages = report.stages,
            "Inserted seed data"
        );
    }
    Ok(report)
}
