//! Database models for teachers.

use crate::types::TeacherId;

/// Database request for creating a new teacher
#[derive(Debug, Clone)]
pub struct TeacherCreateDBRequest {
    pub name: String,
    pub email: String,
    pub password_hash: String,
}

/// Database response for a teacher
#[derive(Debug, Clone)]
pub struct TeacherDBResponse {
    pub id: TeacherId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
}
