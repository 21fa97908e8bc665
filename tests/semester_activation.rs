#![allow(clippy::unwrap_used)]

mod common;

use gradebook::entities::{prelude::*, semester};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

async fn active_count(app: &common::TestApp) -> u64 {
    Semester::find()
        .filter(semester::Column::IsActive.eq(true))
        .count(&app.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn new_semesters_are_named_and_inactive() {
    let app = common::setup().await;

    let created = app.new_semester("2025/2026", "Even").await;

    assert_eq!(created.name, "Even 2025/2026");
    assert_eq!(created.academic_year, "2025/2026");
    assert_eq!(created.semester_choice, "Even");
    assert!(!created.is_active);
    assert_eq!(active_count(&app).await, 0);
}

#[tokio::test]
async fn exactly_one_semester_stays_active_across_activations() {
    let app = common::setup().await;

    let semesters = vec![
        app.new_semester("2024/2025", "Odd").await,
        app.new_semester("2024/2025", "Even").await,
        app.new_semester("2025/2026", "Odd").await,
    ];

    for target in semesters.iter().chain(semesters.iter().rev()) {
        let activated = app.semesters.activate_semester(&app.admin, target.id).await.unwrap();
        assert!(activated.is_active);
        assert_eq!(active_count(&app).await, 1);

        let active = app
            .semesters
            .get_active_semester(&app.teacher)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(active.id, target.id);
    }
}

#[tokio::test]
async fn reactivating_the_active_semester_keeps_it_active() {
    let app = common::setup().await;
    let only = app.new_semester("2025/2026", "Odd").await;

    app.semesters.activate_semester(&app.admin, only.id).await.unwrap();
    app.semesters.activate_semester(&app.admin, only.id).await.unwrap();

    assert_eq!(active_count(&app).await, 1);
}

#[tokio::test]
async fn failed_activation_leaves_current_semester_active() {
    let app = common::setup().await;
    let current = app.new_semester("2025/2026", "Odd").await;
    app.semesters.activate_semester(&app.admin, current.id).await.unwrap();

    let err = app.semesters.activate_semester(&app.admin, 9999).await.unwrap_err();
    assert_eq!(err.code(), "NOT_FOUND");

    let err = app.semesters.activate_semester(&app.teacher, current.id).await.unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");

    let active = app.semesters.get_active_semester(&app.admin).await.unwrap().unwrap();
    assert_eq!(active.id, current.id);
}

#[tokio::test]
async fn semesters_list_newest_year_first() {
    let app = common::setup().await;
    app.new_semester("2024/2025", "Even").await;
    app.new_semester("2025/2026", "Even").await;
    app.new_semester("2024/2025", "Odd").await;
    app.new_semester("2025/2026", "Odd").await;

    let names: Vec<String> = app
        .semesters
        .list_semesters(&app.teacher)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();

    assert_eq!(
        names,
        vec!["Odd 2025/2026", "Even 2025/2026", "Odd 2024/2025", "Even 2024/2025"]
    );
}

#[tokio::test]
async fn same_year_and_term_twice_is_a_duplicate() {
    let app = common::setup().await;
    let first = app.new_semester("2025/2026", "Odd").await;

    let err = app
        .semesters
        .create_semester(&app.admin, first.academic_year_id, first.semester_choice_id)
        .await
        .unwrap_err();

    assert!(err.is_duplicate());
    assert_eq!(err.to_string(), "Semester 'Odd 2025/2026' already exists");
}
