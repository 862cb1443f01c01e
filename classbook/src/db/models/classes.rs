//! Database models for classes.

use crate::api::models::classes::ClassCreate;
use crate::types::{ClassId, TeacherId};

/// Database request for creating a new class
#[derive(Debug, Clone)]
pub struct ClassCreateDBRequest {
    pub teacher_id: TeacherId,
    pub year: i64,
    pub grade_level: String,
    pub subject: String,
}

impl ClassCreateDBRequest {
    pub fn new(teacher_id: TeacherId, create: ClassCreate) -> Self {
        Self {
            teacher_id,
            year: create.year,
            grade_level: create.grade_level.trim().to_string(),
            subject: create.subject.trim().to_string(),
        }
    }
}

/// Database response for a class
#[derive(Debug, Clone)]
pub struct ClassDBResponse {
    pub id: ClassId,
    pub year: i64,
    pub grade_level: String,
    pub subject: String,
    pub teacher_id: TeacherId,
    /// Number of lessons recorded for the class so far
    pub lessons_held: i64,
}
