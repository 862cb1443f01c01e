use axum::{extract::State, http::StatusCode};
use chrono::Utc;

use crate::{
    AppState,
    api::extractors::{Json, Path},
    api::models::{
        lessons::{LessonCreate, LessonCreated},
        teachers::CurrentTeacher,
    },
    db::handlers::{Classes, Lessons, Repository},
    errors::{Error, Result},
    types::LessonId,
};

/// Record a lesson and its attendance in one transaction.
///
/// An unknown or foreign `class_id` is a validation error, as is any attendance
/// entry that repeats a student or names a student outside the class. Nothing is
/// stored when the request fails.
#[utoipa::path(
    post,
    path = "/lessons",
    request_body = LessonCreate,
    tag = "lessons",
    summary = "Create a lesson with attendance",
    responses(
        (status = 201, description = "Lesson created", body = LessonCreated),
        (status = 400, description = "Invalid lesson or attendance", body = crate::errors::ErrorBody),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id))]
pub async fn create_lesson(
    State(state): State<AppState>,
    current_teacher: CurrentTeacher,
    Json(create): Json<LessonCreate>,
) -> Result<(StatusCode, Json<LessonCreated>)> {
    let request = create.into_db_request(Utc::now().date_naive())?;

    let mut pool_conn = state.db.acquire().await?;

    if Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, request.class_id)
        .await?
        .is_none()
    {
        return Err(Error::BadRequest {
            message: format!("Class {} does not exist", request.class_id),
        });
    }

    let lesson = Lessons::new(&mut pool_conn).create(&request).await?;
    tracing::debug!(lesson_id = lesson.id, marks = request.attendance.len(), "Lesson recorded");

    Ok((StatusCode::CREATED, Json(LessonCreated { lesson_id: lesson.id })))
}

#[utoipa::path(
    delete,
    path = "/lessons/{lesson_id}",
    tag = "lessons",
    summary = "Delete a lesson and its attendance",
    params(("lesson_id" = i64, Path, description = "Lesson ID")),
    responses(
        (status = 204, description = "Lesson deleted"),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Lesson not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, lesson_id = lesson_id))]
pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(lesson_id): Path<LessonId>,
    current_teacher: CurrentTeacher,
) -> Result<StatusCode> {
    let not_found = || Error::NotFound {
        resource: "Lesson".to_string(),
        id: lesson_id.to_string(),
    };

    let mut pool_conn = state.db.acquire().await?;
    let mut repo = Lessons::new(&mut pool_conn);

    repo.get_owned(current_teacher.id, lesson_id).await?.ok_or_else(not_found)?;

    if repo.delete(lesson_id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found())
    }
}
