//! End-to-end journeys through the HTTP API.

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use serde_json::json;

use crate::{
    api::models::{
        auth::LoginResponse,
        classes::ClassResponse,
        grades::{GradeCreated, StudentGradeResponse},
        lessons::{CalendarEntryResponse, LessonAttendanceResponse, LessonCreated},
        reports::ReportCardResponse,
        students::StudentResponse,
    },
    test_utils::{create_test_app, create_test_pool, create_test_teacher},
};

/// Log in through the API and return the authorization header to use afterwards.
async fn login(app: &TestServer, email: &str, password: &str) -> (String, String) {
    let response = app.post("/login").json(&json!({"email": email, "password": password})).await;
    response.assert_status_ok();
    let body: LoginResponse = response.json();
    ("authorization".to_string(), format!("Bearer {}", body.token))
}

#[test_log::test(tokio::test)]
async fn test_e2e_lesson_attendance_journey() {
    let (pool, _dir) = create_test_pool().await;
    create_test_teacher(&pool, "ana@x.com", "pw123").await;
    let app = create_test_app(pool.clone()).await;

    let (name, value) = login(&app, "ana@x.com", "pw123").await;

    let response = app
        .post("/classes")
        .add_header(name.clone(), value.clone())
        .json(&json!({"year": 2024, "grade_level": "5", "subject": "Math"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let class: ClassResponse = response.json();
    assert_eq!(class.progress, 0);

    let response = app
        .post(&format!("/classes/{}/students", class.id))
        .add_header(name.clone(), value.clone())
        .json(&json!({"name": "Joao"}))
        .await;
    response.assert_status(StatusCode::CREATED);
    let joao: StudentResponse = response.json();

    let response = app
        .post("/lessons")
        .add_header(name.clone(), value.clone())
        .json(&json!({
            "class_id": class.id,
            "topic": "Fractions",
            "attendance": [{"student_id": joao.id, "present": false}]
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let created: LessonCreated = response.json();

    let response = app
        .get(&format!("/reports/attendance/{}", class.id))
        .add_header(name.clone(), value.clone())
        .await;
    response.assert_status_ok();
    let report: Vec<LessonAttendanceResponse> = response.json();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].lesson_id, created.lesson_id);
    assert_eq!(report[0].topic.as_deref(), Some("Fractions"));
    assert_eq!(report[0].attendance.len(), 1);
    assert_eq!(report[0].attendance[0].student_name, "Joao");
    assert!(!report[0].attendance[0].present);

    // The lesson now counts towards the class progress and shows up in the calendar
    let classes: Vec<ClassResponse> = app.get("/classes").add_header(name.clone(), value.clone()).await.json();
    assert_eq!(classes[0].lessons_held, 1);
    let calendar: Vec<CalendarEntryResponse> = app.get("/calendar").add_header(name.clone(), value.clone()).await.json();
    assert_eq!(calendar.len(), 1);
    assert_eq!(calendar[0].subject, "Math");

    // Deleting the lesson takes its attendance with it
    app.delete(&format!("/lessons/{}", created.lesson_id))
        .add_header(name.clone(), value.clone())
        .await
        .assert_status(StatusCode::NO_CONTENT);
    let report: Vec<LessonAttendanceResponse> = app
        .get(&format!("/reports/attendance/{}", class.id))
        .add_header(name, value)
        .await
        .json();
    assert!(report.is_empty());

    let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM attendance").fetch_one(&pool).await.unwrap();
    assert_eq!(remaining, 0);
}

#[test_log::test(tokio::test)]
async fn test_e2e_grades_and_report_card() {
    let (pool, _dir) = create_test_pool().await;
    create_test_teacher(&pool, "ana@x.com", "pw123").await;
    let app = create_test_app(pool).await;

    let (name, value) = login(&app, "ana@x.com", "pw123").await;

    let class: ClassResponse = app
        .post("/classes")
        .add_header(name.clone(), value.clone())
        .json(&json!({"year": 2024, "grade_level": "5", "subject": "Math"}))
        .await
        .json();
    let joao: StudentResponse = app
        .post(&format!("/classes/{}/students", class.id))
        .add_header(name.clone(), value.clone())
        .json(&json!({"name": "Joao"}))
        .await
        .json();

    for (term, grade) in [(1, 7.0), (2, 9.0)] {
        let response = app
            .post("/grades")
            .add_header(name.clone(), value.clone())
            .json(&json!({"student_id": joao.id, "class_id": class.id, "term": term, "value": grade}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let _: GradeCreated = response.json();
    }

    // Same term twice is rejected
    app.post("/grades")
        .add_header(name.clone(), value.clone())
        .json(&json!({"student_id": joao.id, "class_id": class.id, "term": 2, "value": 5.0}))
        .await
        .assert_status(StatusCode::CONFLICT);

    let grades: Vec<StudentGradeResponse> = app
        .get(&format!("/grades/{}", joao.id))
        .add_header(name.clone(), value.clone())
        .await
        .json();
    assert_eq!(grades.len(), 2);
    assert!(grades.iter().all(|grade| grade.final_average == Decimal::new(80, 1)));

    let card: ReportCardResponse = app
        .get(&format!("/reports/report-card/{}", joao.id))
        .add_header(name, value)
        .await
        .json();
    assert_eq!(card.student.name, "Joao");
    assert_eq!(card.classes.len(), 1);
    assert_eq!(card.classes[0].final_average, Some(Decimal::new(80, 1)));
    assert_eq!(card.classes[0].grades.len(), 2);
}

#[test_log::test(tokio::test)]
async fn test_e2e_teachers_cannot_see_each_other() {
    let (pool, _dir) = create_test_pool().await;
    create_test_teacher(&pool, "ana@x.com", "pw123").await;
    create_test_teacher(&pool, "bia@x.com", "pw456").await;
    let app = create_test_app(pool).await;

    let (ana_name, ana_value) = login(&app, "ana@x.com", "pw123").await;
    let (bia_name, bia_value) = login(&app, "bia@x.com", "pw456").await;

    let class: ClassResponse = app
        .post("/classes")
        .add_header(ana_name.clone(), ana_value.clone())
        .json(&json!({"year": 2024, "grade_level": "5", "subject": "Math"}))
        .await
        .json();

    let classes: Vec<ClassResponse> = app.get("/classes").add_header(bia_name.clone(), bia_value.clone()).await.json();
    assert!(classes.is_empty());

    app.get(&format!("/classes/{}/students", class.id))
        .add_header(bia_name.clone(), bia_value.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);

    app.post("/lessons")
        .add_header(bia_name, bia_value)
        .json(&json!({"class_id": class.id, "topic": "Intrusion", "attendance": []}))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    let calendar: Vec<CalendarEntryResponse> = app.get("/calendar").add_header(ana_name, ana_value).await.json();
    assert!(calendar.is_empty());
}
