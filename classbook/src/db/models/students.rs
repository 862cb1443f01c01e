//! Database models for students.

use crate::api::models::students::StudentCreate;
use crate::types::{ClassId, StudentId};

/// Database request for enrolling a student in a class
#[derive(Debug, Clone)]
pub struct StudentCreateDBRequest {
    pub class_id: ClassId,
    pub name: String,
    pub photo_url: Option<String>,
}

impl StudentCreateDBRequest {
    pub fn new(class_id: ClassId, create: StudentCreate) -> Self {
        Self {
            class_id,
            name: create.name.trim().to_string(),
            // Blank URLs are stored as absent
            photo_url: create.photo_url.map(|url| url.trim().to_string()).filter(|url| !url.is_empty()),
        }
    }
}

/// Database response for a student
#[derive(Debug, Clone)]
pub struct StudentDBResponse {
    pub id: StudentId,
    pub name: String,
    pub photo_url: Option<String>,
    pub class_id: ClassId,
}
