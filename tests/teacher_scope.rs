#![allow(clippy::unwrap_used)]

mod common;

use gradebook::services::AssignmentFilter;

#[tokio::test]
async fn assigned_and_enabled_subjects_are_visible() {
    let app = common::setup().await;
    let fx = app.grading_fixture().await;

    let classes = app.assignments.my_classes(&app.teacher).await.unwrap();
    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].display_name(), "10 - A");

    let subjects = app.assignments.my_subjects(&app.teacher, fx.class_id).await.unwrap();
    let codes: Vec<&str> = subjects.iter().map(|s| s.code.as_str()).collect();
    assert_eq!(codes, vec!["MATH-X"]);
}

#[tokio::test]
async fn subject_without_active_config_is_hidden() {
    let app = common::setup().await;
    let fx = app.grading_fixture().await;
    let physics = app.subject_id("PHYS-X").await;
    app.assignments
        .create_assignment(&app.admin, app.teacher.id, physics, fx.class_id, fx.semester_id)
        .await
        .unwrap();

    let subjects = app.assignments.my_subjects(&app.teacher, fx.class_id).await.unwrap();
    assert!(subjects.iter().all(|s| s.id != physics));

    app.subject_configs
        .set_subject_active(&app.admin, physics, fx.semester_id, true)
        .await
        .unwrap();
    let subjects = app.assignments.my_subjects(&app.teacher, fx.class_id).await.unwrap();
    assert!(subjects.iter().any(|s| s.id == physics));
}

#[tokio::test]
async fn config_toggle_is_an_upsert() {
    let app = common::setup().await;
    let fx = app.grading_fixture().await;

    let off = app
        .subject_configs
        .set_subject_active(&app.admin, fx.subject_id, fx.semester_id, false)
        .await
        .unwrap();
    let on = app
        .subject_configs
        .set_subject_active(&app.admin, fx.subject_id, fx.semester_id, true)
        .await
        .unwrap();

    assert_eq!(off.id, on.id);
    assert!(on.is_active);
    let configs = app
        .subject_configs
        .list_configs_for_semester(&app.admin, fx.semester_id)
        .await
        .unwrap();
    assert_eq!(configs.len(), 1);
}

#[tokio::test]
async fn scope_follows_the_active_semester() {
    let app = common::setup().await;
    app.grading_fixture().await;
    let next = app.new_semester("2025/2026", "Even").await;
    app.semesters.activate_semester(&app.admin, next.id).await.unwrap();

    let classes = app.assignments.my_classes(&app.teacher).await.unwrap();
    assert!(classes.is_empty());
}

#[tokio::test]
async fn no_active_semester_is_reported() {
    let app = common::setup().await;

    let err = app.assignments.my_classes(&app.teacher).await.unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");
}

#[tokio::test]
async fn only_teachers_can_be_assigned() {
    let app = common::setup().await;
    let fx = app.grading_fixture().await;

    let err = app
        .assignments
        .create_assignment(&app.admin, app.admin.id, fx.subject_id, fx.class_id, fx.semester_id)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let err = app
        .assignments
        .create_assignment(&app.admin, app.teacher.id, fx.subject_id, fx.class_id, fx.semester_id)
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
}

#[tokio::test]
async fn teachers_list_only_their_assignments() {
    let app = common::setup().await;
    let fx = app.grading_fixture().await;
    let rahmat = app.new_teacher("rahmat").await;
    let physics = app.subject_id("PHYS-X").await;
    app.assignments
        .create_assignment(&app.admin, rahmat.id, physics, fx.class_id, fx.semester_id)
        .await
        .unwrap();

    let everything = app
        .assignments
        .list_assignments(&app.admin, AssignmentFilter::default())
        .await
        .unwrap();
    assert_eq!(everything.len(), 2);
    assert_eq!(everything[0].teacher_username, "rahmat");

    let own = app
        .assignments
        .list_assignments(
            &app.teacher,
            AssignmentFilter {
                user_id: Some(rahmat.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].teacher_username, "teacher");
    assert_eq!(own[0].subject_name, "Mathematics");
    assert_eq!(own[0].semester_name, "Odd 2025/2026");
}
