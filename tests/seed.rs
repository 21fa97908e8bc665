#![allow(clippy::unwrap_used)]

mod common;

use gradebook::config::SeedAccounts;
use gradebook::entities::prelude::*;
use gradebook::entities::user::UserRole;
use gradebook::seed::{DEFAULT_CLASSES, DEFAULT_STAGES, DEFAULT_SUBJECTS, seed_defaults};
use sea_orm::{EntityTrait, PaginatorTrait};

#[tokio::test]
async fn first_run_fills_every_reference_table() {
    let db = common::connect().await;

    let report = seed_defaults(&db, &SeedAccounts::default(), 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */)
        .await
        .unwrap();

    assert_eq!(report.semester_choices, 2);
    assert_eq!(report.users, 2);
    assert_eq!(report.classes, DEFAULT_CLASSES.len());
    assert_eq!(report.subjects, DEFAULT_SUBJECTS.len());
    assert_eq!(report.stages, DEFAULT_STAGES.len());

    let choices: Vec<String> = SemesterChoice::find()
        .all(&db)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(choices, vec!["Odd", "Even"]);
}

#[tokio::test]
async fn rerunning_inserts_nothing() {
    let db = common::connect().await;
    let accounts = SeedAccounts::default();

    seed_defaults(&db, &accounts, 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */).await.unwrap();
    let second = seed_defaults(&db, &accounts, 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */).await.unwrap();

    assert!(second.is_empty());
    assert_eq!(User::find().count(&db).await.unwrap(), 2);
    assert_eq!(
        Class::find().count(&db).await.unwrap(),
        DEFAULT_CLASSES.len() as u64
    );
}

#[tokio::test]
async fn only_empty_tables_are_seeded() {
    let app = common::setup().await;

    app.subjects.delete_subject(&app.admin, app.subject_id("CHEM-X").await).await.unwrap();
    for class in app.classes.list_classes(&app.admin).await.unwrap() {
        app.classes.delete_class(&app.admin, class.id).await.unwrap();
    }

    let report = seed_defaults(&app.db, &SeedAccounts::default(), 4 /* bcrypt MIN_COST (private in bcrypt 0.17) */)
        .await
        .unwrap();

    assert_eq!(report.classes, DEFAULT_CLASSES.len());
    assert_eq!(report.subjects, 0);
    assert_eq!(
        Subject::find().count(&app.db).await.unwrap(),
        DEFAULT_SUBJECTS.len() as u64 - 1
    );
}

#[tokio::test]
async fn placeholder_accounts_can_sign_in() {
    let app = common::setup().await;

    let (admin, token) = app.users.authenticate("admin", "admin").await.unwrap();
    assert_eq!(admin.role, UserRole::Admin);
    assert!(!token.is_empty());

    let (teacher, _) = app.users.authenticate("teacher", "teacher").await.unwrap();
    assert_eq!(teacher.role, UserRole::Teacher);
    assert_ne!(teacher.password_hash, "teacher");
}
