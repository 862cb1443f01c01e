//! API models for students.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::students::StudentDBResponse;
use crate::errors::{Error, Result};
use crate::types::{ClassId, StudentId};

/// Request body for enrolling a student in a class
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentCreate {
    #[schema(example = "Joao")]
    pub name: String,
    #[serde(default)]
    pub photo_url: Option<String>,
}

impl StudentCreate {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "name must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StudentResponse {
    pub id: StudentId,
    pub name: String,
    /// Empty string when the student has no photo
    pub photo_url: String,
    pub class_id: ClassId,
}

impl From<StudentDBResponse> for StudentResponse {
    fn from(db: StudentDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            photo_url: db.photo_url.unwrap_or_default(),
            class_id: db.class_id,
        }
    }
}
