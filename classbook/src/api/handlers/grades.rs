use axum::{extract::State, http::StatusCode};

use crate::{
    AppState,
    api::extractors::{Json, Path},
    api::models::{
        grades::{GradeCreate, GradeCreated, GradeResponse, GradeUpdate, StudentGradeResponse},
        teachers::CurrentTeacher,
    },
    db::{
        handlers::{Classes, Grades, Repository, Students, grades::GradeFilter},
        models::grades::GradeCreateDBRequest,
    },
    errors::{Error, Result},
    types::{GradeId, StudentId},
};

fn grade_not_found(grade_id: GradeId) -> Error {
    Error::NotFound {
        resource: "Grade".to_string(),
        id: grade_id.to_string(),
    }
}

pub(crate) fn student_not_found(student_id: StudentId) -> Error {
    Error::NotFound {
        resource: "Student".to_string(),
        id: student_id.to_string(),
    }
}

#[utoipa::path(
    post,
    path = "/grades",
    request_body = GradeCreate,
    tag = "grades",
    summary = "Record a grade",
    responses(
        (status = 201, description = "Grade recorded", body = GradeCreated),
        (status = 400, description = "Invalid grade", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 409, description = "Grade already recorded for this term", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id))]
pub async fn create_grade(
    State(state): State<AppState>,
    current_teacher: CurrentTeacher,
    Json(create): Json<GradeCreate>,
) -> Result<(StatusCode, Json<GradeCreated>)> {
    create.validate()?;

    let mut pool_conn = state.db.acquire().await?;

    if Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, create.class_id)
        .await?
        .is_none()
    {
        return Err(Error::BadRequest {
            message: format!("Class {} does not exist", create.class_id),
        });
    }

    let grade = Grades::new(&mut pool_conn).create(&GradeCreateDBRequest::from(create)).await?;

    Ok((StatusCode::CREATED, Json(GradeCreated { grade_id: grade.id })))
}

#[utoipa::path(
    get,
    path = "/grades/{id}",
    tag = "grades",
    summary = "List a student's grades with final averages",
    params(("id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Grades ordered by class and term", body = Vec<StudentGradeResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Student not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, student_id = student_id))]
pub async fn list_student_grades(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    current_teacher: CurrentTeacher,
) -> Result<Json<Vec<StudentGradeResponse>>> {
    let mut pool_conn = state.db.acquire().await?;

    Students::new(&mut pool_conn)
        .get_owned(current_teacher.id, student_id)
        .await?
        .ok_or_else(|| student_not_found(student_id))?;

    let grades = Grades::new(&mut pool_conn).list(&GradeFilter::new(student_id)).await?;

    Ok(Json(StudentGradeResponse::for_student(&grades)))
}

#[utoipa::path(
    put,
    path = "/grades/{id}",
    request_body = GradeUpdate,
    tag = "grades",
    summary = "Update a grade",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 200, description = "Grade updated", body = GradeResponse),
        (status = 400, description = "Invalid grade", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Grade not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, grade_id = grade_id))]
pub async fn update_grade(
    State(state): State<AppState>,
    Path(grade_id): Path<GradeId>,
    current_teacher: CurrentTeacher,
    Json(update): Json<GradeUpdate>,
) -> Result<Json<GradeResponse>> {
    update.validate()?;

    let mut pool_conn = state.db.acquire().await?;
    let mut repo = Grades::new(&mut pool_conn);

    repo.get_owned(current_teacher.id, grade_id)
        .await?
        .ok_or_else(|| grade_not_found(grade_id))?;

    let grade = repo.update(grade_id, &update.into()).await?;
    Ok(Json(grade.into()))
}

#[utoipa::path(
    delete,
    path = "/grades/{id}",
    tag = "grades",
    summary = "Delete a grade",
    params(("id" = i64, Path, description = "Grade ID")),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Grade not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, grade_id = grade_id))]
pub async fn delete_grade(
    State(state): State<AppState>,
    Path(grade_id): Path<GradeId>,
    current_teacher: CurrentTeacher,
) -> Result<StatusCode> {
    let mut pool_conn = state.db.acquire().await?;
    let mut repo = Grades::new(&mut pool_conn);

    repo.get_owned(current_teacher.id, grade_id)
        .await?
        .ok_or_else(|| grade_not_found(grade_id))?;

    if repo.delete(grade_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(grade_not_found(grade_id))
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        api::models::grades::{GradeCreated, GradeResponse, StudentGradeResponse},
        errors::ErrorBody,
        test_utils::*,
    };
    use axum::http::StatusCode;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[test_log::test(tokio::test)]
    async fn test_final_average_per_class() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        for (term, grade) in [(1, 7.0), (2, 9.0)] {
            app.post("/grades")
                .add_header(name.clone(), value.clone())
                .json(&json!({"student_id": joao.id, "class_id": class.id, "term": term, "value": grade}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let grades: Vec<StudentGradeResponse> = app
            .get(&format!("/grades/{}", joao.id))
            .add_header(name, value)
            .await
            .json();
        assert_eq!(grades.len(), 2);
        assert_eq!(grades[0].term, 1);
        assert!(grades.iter().all(|g| g.final_average == Decimal::new(80, 1)));
    }

    #[test_log::test(tokio::test)]
    async fn test_final_average_rounds_exact_midpoint_up() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        // (0.1 + 4.6) / 2 is exactly 2.35
        for (term, grade) in [(1, 0.1), (2, 4.6)] {
            app.post("/grades")
                .add_header(name.clone(), value.clone())
                .json(&json!({"student_id": joao.id, "class_id": class.id, "term": term, "value": grade}))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app.get(&format!("/grades/{}", joao.id)).add_header(name, value).await;
        response.assert_status_ok();
        let body: serde_json::Value = response.json();
        assert_eq!(body[0]["final_average"], json!(2.4));
        assert_eq!(body[0]["value"], json!(0.1));
        assert_eq!(body[1]["value"], json!(4.6));
    }

    #[test_log::test(tokio::test)]
    async fn test_malformed_requests_are_validation_errors() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        // Missing term
        let response = app
            .post("/grades")
            .add_header(name.clone(), value.clone())
            .json(&json!({"student_id": joao.id, "class_id": class.id, "value": 7.0}))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.code, "validation_error");

        // Not JSON at all
        let response = app
            .post("/grades")
            .add_header(name.clone(), value.clone())
            .text("{not json")
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.code, "validation_error");

        let response = app.get("/grades/abc").add_header(name, value).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: ErrorBody = response.json();
        assert_eq!(body.code, "validation_error");
    }

    #[test_log::test(tokio::test)]
    async fn test_create_grade_rejections() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let foreign = create_test_class(&pool, bia.id, 2024, "History").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        let post = |body: serde_json::Value| {
            app.post("/grades").add_header(name.clone(), value.clone()).json(&body)
        };

        post(json!({"student_id": joao.id, "class_id": class.id, "term": 5, "value": 7.0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        post(json!({"student_id": joao.id, "class_id": class.id, "term": 1, "value": 7.25}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        post(json!({"student_id": joao.id, "class_id": class.id, "term": 1, "value": 10.5}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        post(json!({"student_id": joao.id, "class_id": foreign.id, "term": 1, "value": 7.0}))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        post(json!({"student_id": joao.id, "class_id": class.id, "term": 1, "value": 7.0}))
            .await
            .assert_status(StatusCode::CREATED);
        let response = post(json!({"student_id": joao.id, "class_id": class.id, "term": 1, "value": 8.0})).await;
        response.assert_status(StatusCode::CONFLICT);
        let body: ErrorBody = response.json();
        assert_eq!(body.code, "conflict");
    }

    #[test_log::test(tokio::test)]
    async fn test_update_and_delete_grade() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;
        let (name, value) = auth_header(&ana);

        let created: GradeCreated = app
            .post("/grades")
            .add_header(name.clone(), value.clone())
            .json(&json!({"student_id": joao.id, "class_id": class.id, "term": 1, "value": 7.0}))
            .await
            .json();
        let path = format!("/grades/{}", created.grade_id);

        // Empty update leaves the value alone
        let unchanged: GradeResponse = app.put(&path).add_header(name.clone(), value.clone()).json(&json!({})).await.json();
        assert_eq!(unchanged.value, Decimal::new(70, 1));

        let updated: GradeResponse = app
            .put(&path)
            .add_header(name.clone(), value.clone())
            .json(&json!({"value": 9.5}))
            .await
            .json();
        assert_eq!(updated.value, Decimal::new(95, 1));

        let (other_name, other_value) = auth_header(&bia);
        app.put(&path)
            .add_header(other_name.clone(), other_value.clone())
            .json(&json!({"value": 1.0}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.delete(&path)
            .add_header(other_name, other_value)
            .await
            .assert_status(StatusCode::NOT_FOUND);

        app.delete(&path)
            .add_header(name.clone(), value.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.put(&path)
            .add_header(name, value)
            .json(&json!({"value": 5.0}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[test_log::test(tokio::test)]
    async fn test_grades_of_foreign_student_not_found() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;
        let app = create_test_app(pool).await;

        let (name, value) = auth_header(&bia);
        app.get(&format!("/grades/{}", joao.id))
            .add_header(name, value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}
