#![allow(clippy::unwrap_used)]

mod common;

use gradebook::auth::{AuthenticatedUser, JwtService};
use gradebook::entities::user::UserRole;

#[tokio::test]
async fn wrong_password_and_unknown_user_look_the_same() {
    let app = common::setup().await;

    let wrong = app.users.authenticate("admin", "nope").await.unwrap_err();
    let unknown = app.users.authenticate("ghost", "admin").await.unwrap_err();

    assert_eq!(wrong.code(), "UNAUTHENTICATED");
    assert_eq!(wrong.to_string(), unknown.to_string());
}

#[tokio::test]
async fn issued_token_identifies_the_caller() {
    let app = common::setup().await;

    let (account, token) = app.users.authenticate("teacher", "teacher").await.unwrap();
    let claims = JwtService::new(common::JWT_SECRET, 1).verify_token(&token).unwrap();
    let caller = AuthenticatedUser::try_from(claims).unwrap();

    assert_eq!(caller.id, account.id);
    assert_eq!(caller.role, UserRole::Teacher);
}

#[tokio::test]
async fn duplicate_username_is_reported() {
    let app = common::setup().await;
    app.new_teacher("siti").await;

    let err = app
        .users
        .create_user(&app.admin, "siti", "other", UserRole::Teacher)
        .await
        .unwrap_err();

    assert!(err.is_duplicate());
    assert_eq!(err.to_string(), "Username 'siti' is already taken");
}

#[tokio::test]
async fn password_change_is_optional_on_update() {
    let app = common::setup().await;
    let siti = app.new_teacher("siti").await;

    app.users
        .update_user(&app.admin, siti.id, "siti", Some("  "), UserRole::Teacher)
        .await
        .unwrap();
    app.users.authenticate("siti", "secret").await.unwrap();

    app.users
        .update_user(&app.admin, siti.id, "siti", Some("siti123"), UserRole::Teacher)
        .await
        .unwrap();
    assert!(app.users.authenticate("siti", "secret").await.is_err());
    app.users.authenticate("siti", "siti123").await.unwrap();
}

#[tokio::test]
async fn admins_cannot_delete_themselves() {
    let app = common::setup().await;

    let err = app.users.delete_user(&app.admin, app.admin.id).await.unwrap_err();

    assert_eq!(err.code(), "VALIDATION_ERROR");
    assert!(app.users.find_user_by_id(app.admin.id).await.unwrap().is_some());
}

#[tokio::test]
async fn teachers_cannot_manage_master_data() {
    let app = common::setup().await;

    let checks = [
        app.users
            .create_user(&app.teacher, "x", "y", UserRole::Admin)
            .await
            .map(|_| ()),
        app.classes.create_class(&app.teacher, "D", "10").await.map(|_| ()),
        app.subjects
            .create_subject(&app.teacher, "Biology", "BIO-X")
            .await
            .map(|_| ()),
        app.academic_years
            .create_academic_year(&app.teacher, "2030/2031")
            .await
            .map(|_| ()),
        app.users.list_users(&app.teacher, None).await.map(|_| ()),
    ];

    for result in checks {
        assert_eq!(result.unwrap_err().code(), "FORBIDDEN");
    }
}

#[tokio::test]
async fn list_users_filters_by_role() {
    let app = common::setup().await;
    app.new_teacher("budi").await;

    let teachers: Vec<String> = app
        .users
        .list_users(&app.admin, Some(UserRole::Teacher))
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.username)
        .collect();

    assert_eq!(teachers, vec!["budi", "teacher"]);
}

#[tokio::test]
async fn duplicate_codes_and_nisn_are_reported() {
    let app = common::setup().await;

    let err = app
        .subjects
        .create_subject(&app.admin, "Maths again", "MATH-X")
        .await
        .unwrap_err();
    assert!(err.is_duplicate());

    let err = app.classes.create_class(&app.admin, "A", "10").await.unwrap_err();
    assert!(err.is_duplicate());

    app.add_student(555, "Eka", None).await;
    let err = app
        .students
        .create_student(
            &app.admin,
            gradebook::services::StudentInput {
                nisn: 555,
                name: "Fajar".into(),
                class_id: None,
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_duplicate());
    assert_eq!(err.to_string(), "NISN 555 is already registered");
}

#[tokio::test]
async fn student_input_is_validated() {
    let app = common::setup().await;

    let bad = [
        (0, "Gita", None),
        (777, "   ", None),
        (778, "Hadi", Some(9999)),
    ];
    let codes: Vec<&str> = {
        let mut codes = Vec::new();
        for (nisn, name, class_id) in bad {
            let err = app
                .students
                .create_student(
                    &app.admin,
                    gradebook::services::StudentInput {
                        nisn,
                        name: name.into(),
                        class_id,
                    },
                )
                .await
                .unwrap_err();
            codes.push(err.code());
        }
        codes
    };

    assert_eq!(codes, vec!["VALIDATION_ERROR", "VALIDATION_ERROR", "NOT_FOUND"]);
}

#[tokio::test]
async fn student_search_matches_nisn_or_name() {
    let app = common::setup().await;
    let class_id = app.class_id("10", "B").await;
    app.add_student(123456, "Zahra", Some(class_id)).await;
    app.add_student(987654, "Bayu", None).await;
    app.add_student(111222, "Yusuf Bayu", None).await;

    let by_nisn = app.students.search_students(&app.admin, Some("3456")).await.unwrap();
    assert_eq!(by_nisn.len(), 1);
    assert_eq!(by_nisn[0].name, "Zahra");
    assert_eq!(by_nisn[0].class_name.as_deref(), Some("B"));
    assert_eq!(by_nisn[0].class_level.as_deref(), Some("10"));

    let by_name: Vec<String> = app
        .students
        .search_students(&app.admin, Some("Bayu"))
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(by_name, vec!["Bayu", "Yusuf Bayu"]);

    let everyone = app.students.search_students(&app.admin, None).await.unwrap();
    assert_eq!(everyone.len(), 3);
}

async fn caller_from_token(app: &common::TestApp, token: &str) -> AuthenticatedUser {
    let claims = JwtService::new(common::JWT_SECRET, 1).verify_token(token).unwrap();
    let claimed = AuthenticatedUser::try_from(claims).unwrap();
    app.users.resolve_caller(&claimed).await.unwrap().unwrap()
}

#[tokio::test]
async fn demoted_admin_loses_rights_before_token_expiry() {
    let app = common::setup().await;
    let principal = app
        .users
        .create_user(&app.admin, "kepala", "secret", UserRole::Admin)
        .await
        .unwrap();
    let (_, token) = app.users.authenticate("kepala", "secret").await.unwrap();

    let before = caller_from_token(&app, &token).await;
    app.academic_years
        .create_academic_year(&before, "2030/2031")
        .await
        .unwrap();

    app.users
        .update_user(&app.admin, principal.id, "kepala", None, UserRole::Teacher)
        .await
        .unwrap();

    let after = caller_from_token(&app, &token).await;
    assert_eq!(after.role, UserRole::Teacher);
    let err = app
        .academic_years
        .create_academic_year(&after, "2031/2032")
        .await
        .unwrap_err();
    assert_eq!(err.code(), "FORBIDDEN");
}

#[tokio::test]
async fn deleted_account_token_resolves_to_nobody() {
    let app = common::setup().await;
    let siti = app.new_teacher("siti").await;
    let (_, token) = app.users.authenticate("siti", "secret").await.unwrap();
    let claims = JwtService::new(common::JWT_SECRET, 1).verify_token(&token).unwrap();
    let claimed = AuthenticatedUser::try_from(claims).unwrap();

    app.users.delete_user(&app.admin, siti.id).await.unwrap();

    assert!(app.users.resolve_caller(&claimed).await.unwrap().is_none());
}

#[tokio::test]
async fn admins_cannot_change_their_own_role() {
    let app = common::setup().await;

    let err = app
        .users
        .update_user(&app.admin, app.admin.id, "admin", None, UserRole::Teacher)
        .await
        .unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let renamed = app
        .users
        .update_user(&app.admin, app.admin.id, "headmaster", None, UserRole::Admin)
        .await
        .unwrap();
    assert_eq!(renamed.username, "headmaster");
    assert_eq!(renamed.role, UserRole::Admin);
}

#[tokio::test]
async fn promoting_a_teacher_drops_their_assignments() {
    let app = common::setup().await;
    app.grading_fixture().await;

    app.users
        .update_user(&app.admin, app.teacher.id, "teacher", None, UserRole::Admin)
        .await
        .unwrap();

    let remaining = app
        .assignments
        .list_assignments(
            &app.admin,
            gradebook::services::AssignmentFilter {
                user_id: Some(app.teacher.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(remaining.is_empty());
}
