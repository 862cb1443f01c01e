use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    api::extractors::{Json, Path},
    api::models::{
        classes::{ClassCreate, ClassResponse},
        students::{StudentCreate, StudentResponse},
        teachers::CurrentTeacher,
    },
    db::{
        handlers::{Classes, Repository, Students, classes::ClassFilter, students::StudentFilter},
        models::{classes::ClassCreateDBRequest, students::StudentCreateDBRequest},
    },
    errors::{Error, Result},
    types::ClassId,
};

pub(crate) fn class_not_found(class_id: ClassId) -> Error {
    Error::NotFound {
        resource: "Class".to_string(),
        id: class_id.to_string(),
    }
}

#[utoipa::path(
    get,
    path = "/classes",
    tag = "classes",
    summary = "List the caller's classes",
    responses(
        (status = 200, description = "Classes owned by the caller", body = Vec<ClassResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id))]
pub async fn list_classes(State(state): State<AppState>, current_teacher: CurrentTeacher) -> Result<Json<Vec<ClassResponse>>> {
    let mut pool_conn = state.db.acquire().await?;
    let classes = Classes::new(&mut pool_conn).list(&ClassFilter::new(current_teacher.id)).await?;

    let expected_lessons = state.config.classes.expected_lessons;
    Ok(Json(
        classes.into_iter().map(|class| ClassResponse::new(class, expected_lessons)).collect(),
    ))
}

#[utoipa::path(
    post,
    path = "/classes",
    request_body = ClassCreate,
    tag = "classes",
    summary = "Create a class",
    responses(
        (status = 201, description = "Class created", body = ClassResponse),
        (status = 400, description = "Invalid class data", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id))]
pub async fn create_class(
    State(state): State<AppState>,
    current_teacher: CurrentTeacher,
    Json(create): Json<ClassCreate>,
) -> Result<(StatusCode, Json<ClassResponse>)> {
    create.validate()?;

    let mut pool_conn = state.db.acquire().await?;
    let class = Classes::new(&mut pool_conn)
        .create(&ClassCreateDBRequest::new(current_teacher.id, create))
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ClassResponse::new(class, state.config.classes.expected_lessons)),
    ))
}

#[utoipa::path(
    get,
    path = "/classes/{class_id}/students",
    tag = "classes",
    summary = "List students of a class",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Students ordered by name", body = Vec<StudentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Class not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, class_id = class_id))]
pub async fn list_students(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    current_teacher: CurrentTeacher,
) -> Result<Json<Vec<StudentResponse>>> {
    let mut pool_conn = state.db.acquire().await?;

    Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, class_id)
        .await?
        .ok_or_else(|| class_not_found(class_id))?;

    let students = Students::new(&mut pool_conn).list(&StudentFilter::new(class_id)).await?;
    Ok(Json(students.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    post,
    path = "/classes/{class_id}/students",
    request_body = StudentCreate,
    tag = "classes",
    summary = "Enroll a student in a class",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses(
        (status = 201, description = "Student created", body = StudentResponse),
        (status = 400, description = "Invalid student data", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Class not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, class_id = class_id))]
pub async fn create_student(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    current_teacher: CurrentTeacher,
    Json(create): Json<StudentCreate>,
) -> Result<(StatusCode, Json<StudentResponse>)> {
    create.validate()?;

    let mut pool_conn = state.db.acquire().await?;

    Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, class_id)
        .await?
        .ok_or_else(|| class_not_found(class_id))?;

    let student = Students::new(&mut pool_conn)
        .create(&StudentCreateDBRequest::new(class_id, create))
        .await?;

    Ok((StatusCode::CREATED, Json(student.into())))
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::{classes::ClassResponse, students::StudentResponse},
        errors::ErrorBody,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_create_and_list_classes() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        create_test_class(&pool, bia.id, 2024, "History").await;
        let app = create_test_app(pool.clone()).await;
        let (name, value) = auth_header(&ana);

        let response = app
            .post("/classes")
            .add_header(name.clone(), value.clone())
            .json(&json!({"year": 2024, "grade_level": "5", "subject": "Math"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created: ClassResponse = response.json();
        assert_eq!(created.progress, 0);

        create_test_lesson(&pool, created.id, "Fractions").await;

        let response = app.get("/classes").add_header(name, value).await;
        response.assert_status_ok();
        let classes: Vec<ClassResponse> = response.json();
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].subject, "Math");
        assert_eq!(classes[0].lessons_held, 1);
        // One lesson out of the 40 expected
        assert_eq!(classes[0].progress, 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_class_validation() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        let response = app
            .post("/classes")
            .add_header(name, value)
            .json(&json!({"year": 2024, "grade_level": "5A", "subject": "Math"}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.code, "validation_error");
    }

    #[test_log::test(tokio::test)]
    async fn test_students_of_foreign_class_are_not_found() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;

        let (name, value) = auth_header(&bia);
        app.get(&format!("/classes/{}/students", class.id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.post(&format!("/classes/{}/students", class.id))
            .add_header(name, value)
            .json(&json!({"name": "Intruder"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let (name, value) = auth_header(&ana);
        app.get("/classes/9999/students")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_create_and_list_students() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        for body in [
            json!({"name": "Maria", "photo_url": "https://img.example.com/maria.png"}),
            json!({"name": "Joao"}),
        ] {
            app.post(&format!("/classes/{}/students", class.id))
                .add_header(name.clone(), value.clone())
                .json(&body)
                .await
                .assert_status(StatusCode::CREATED);
        }

        let students: Vec<StudentResponse> = app
            .get(&format!("/classes/{}/students", class.id))
            .add_header(name, value)
            .await
            .json();
        assert_eq!(students.len(), 2);
        assert_eq!(students[0].name, "Joao");
        assert_eq!(students[0].photo_url, "");
        assert_eq!(students[1].photo_url, "https://img.example.com/maria.png");
    }
}
