//! API models for teachers.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::teachers::TeacherDBResponse;
use crate::types::TeacherId;

/// The authenticated teacher, as carried in the session token.
///
/// Used as an extractor argument on every protected handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrentTeacher {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
}

/// Public teacher details (never includes the password hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherResponse {
    pub id: TeacherId,
    #[schema(example = "Ana")]
    pub name: String,
    #[schema(example = "ana@x.com")]
    pub email: String,
}

impl From<TeacherDBResponse> for TeacherResponse {
    fn from(db: TeacherDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
        }
    }
}

impl From<TeacherResponse> for CurrentTeacher {
    fn from(teacher: TeacherResponse) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            email: teacher.email,
        }
    }
}
