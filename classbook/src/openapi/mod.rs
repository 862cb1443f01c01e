//! OpenAPI documentation for the classbook API.
//!
//! [`ApiDoc`] collects every handler annotated with `#[utoipa::path]`. It is served as JSON at
//! `/openapi.json` and rendered with Scalar at `/docs`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, errors};

/// Bearer JWT issued by `POST /login`.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token returned by `POST /login`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        api::handlers::auth::login,
        api::handlers::auth::get_me,
        api::handlers::classes::list_classes,
        api::handlers::classes::create_class,
        api::handlers::classes::list_students,
        api::handlers::classes::create_student,
        api::handlers::lessons::create_lesson,
        api::handlers::lessons::delete_lesson,
        api::handlers::grades::create_grade,
        api::handlers::grades::list_student_grades,
        api::handlers::grades::update_grade,
        api::handlers::grades::delete_grade,
        api::handlers::reports::report_card,
        api::handlers::reports::attendance_report,
        api::handlers::reports::content_report,
        api::handlers::reports::calendar,
    ),
    components(
        schemas(
            errors::ErrorBody,
            api::models::auth::LoginRequest,
            api::models::auth::LoginResponse,
            api::models::teachers::TeacherResponse,
            api::models::classes::ClassCreate,
            api::models::classes::ClassResponse,
            api::models::students::StudentCreate,
            api::models::students::StudentResponse,
            api::models::lessons::AttendanceEntry,
            api::models::lessons::LessonCreate,
            api::models::lessons::LessonCreated,
            api::models::lessons::AttendanceRecordResponse,
            api::models::lessons::LessonAttendanceResponse,
            api::models::lessons::LessonContentResponse,
            api::models::lessons::CalendarEntryResponse,
            api::models::grades::GradeCreate,
            api::models::grades::GradeCreated,
            api::models::grades::GradeUpdate,
            api::models::grades::GradeResponse,
            api::models::grades::StudentGradeResponse,
            api::models::reports::ReportCardResponse,
            api::models::reports::ReportCardStudent,
            api::models::reports::ReportCardClass,
            api::models::reports::TermGrade,
            api::models::reports::AttendanceSummary,
        )
    ),
    tags(
        (name = "authentication", description = "Teacher login. Teachers are provisioned by the operator, not through the API."),
        (name = "classes", description = "Classes owned by the authenticated teacher and the students enrolled in them."),
        (name = "lessons", description = "Lessons and the attendance taken at them. A lesson and its attendance are stored together or not at all."),
        (name = "grades", description = "Term grades (bimesters 1 to 4) on a 0.0 to 10.0 scale with one decimal place."),
        (name = "reports", description = "Read-only views: report card, attendance history, content history and calendar."),
    ),
    info(
        title = "Classbook API",
        description = "School diary for teachers: classes, students, lessons, attendance, grades and reports.",
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_is_complete() {
        let doc = ApiDoc::openapi();

        for path in [
            "/login",
            "/me",
            "/classes",
            "/classes/{class_id}/students",
            "/lessons",
            "/lessons/{lesson_id}",
            "/grades",
            "/grades/{id}",
            "/reports/report-card/{student_id}",
            "/reports/attendance/{class_id}",
            "/reports/content/{class_id}",
            "/calendar",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing path {path}");
        }

        let components = doc.components.expect("components are generated");
        assert!(components.security_schemes.contains_key("BearerAuth"));
    }
}
