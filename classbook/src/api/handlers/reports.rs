//! Read-only report views.

use axum::extract::State;

use super::{classes::class_not_found, grades::student_not_found};
use crate::{
    AppState,
    api::extractors::{Json, Path},
    api::models::{
        lessons::{CalendarEntryResponse, LessonAttendanceResponse, LessonContentResponse},
        reports::ReportCardResponse,
        teachers::CurrentTeacher,
    },
    db::handlers::{Classes, Lessons, Reports, Repository, Students, lessons::LessonFilter},
    errors::Result,
    types::{ClassId, StudentId},
};

#[utoipa::path(
    get,
    path = "/reports/report-card/{student_id}",
    tag = "reports",
    summary = "Student report card",
    params(("student_id" = i64, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Grades, final averages and attendance per class", body = ReportCardResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Student not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, student_id = student_id))]
pub async fn report_card(
    State(state): State<AppState>,
    Path(student_id): Path<StudentId>,
    current_teacher: CurrentTeacher,
) -> Result<Json<ReportCardResponse>> {
    let mut pool_conn = state.db.acquire().await?;

    Students::new(&mut pool_conn)
        .get_owned(current_teacher.id, student_id)
        .await?
        .ok_or_else(|| student_not_found(student_id))?;

    let card = Reports::new(&mut pool_conn)
        .report_card(student_id)
        .await?
        .ok_or_else(|| student_not_found(student_id))?;

    Ok(Json(card.into()))
}

#[utoipa::path(
    get,
    path = "/reports/attendance/{class_id}",
    tag = "reports",
    summary = "Attendance history of a class",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Lessons oldest first, each with its attendance", body = Vec<LessonAttendanceResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Class not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, class_id = class_id))]
pub async fn attendance_report(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    current_teacher: CurrentTeacher,
) -> Result<Json<Vec<LessonAttendanceResponse>>> {
    let mut pool_conn = state.db.acquire().await?;

    Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, class_id)
        .await?
        .ok_or_else(|| class_not_found(class_id))?;

    let lessons = Lessons::new(&mut pool_conn).list_attendance(class_id).await?;
    Ok(Json(lessons.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/reports/content/{class_id}",
    tag = "reports",
    summary = "Content history of a class",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses(
        (status = 200, description = "Lessons most recent first", body = Vec<LessonContentResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
        (status = 404, description = "Class not found", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id, class_id = class_id))]
pub async fn content_report(
    State(state): State<AppState>,
    Path(class_id): Path<ClassId>,
    current_teacher: CurrentTeacher,
) -> Result<Json<Vec<LessonContentResponse>>> {
    let mut pool_conn = state.db.acquire().await?;

    Classes::new(&mut pool_conn)
        .get_owned(current_teacher.id, class_id)
        .await?
        .ok_or_else(|| class_not_found(class_id))?;

    let lessons = Lessons::new(&mut pool_conn).list(&LessonFilter::new(class_id)).await?;
    Ok(Json(lessons.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/calendar",
    tag = "reports",
    summary = "Lesson calendar across the caller's classes",
    responses(
        (status = 200, description = "Lessons oldest first with their class subject", body = Vec<CalendarEntryResponse>),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all, fields(teacher_id = current_teacher.id))]
pub async fn calendar(State(state): State<AppState>, current_teacher: CurrentTeacher) -> Result<Json<Vec<CalendarEntryResponse>>> {
    let mut pool_conn = state.db.acquire().await?;
    let entries = Lessons::new(&mut pool_conn).calendar(current_teacher.id).await?;

    Ok(Json(entries.into_iter().map(Into::into).collect()))
}
