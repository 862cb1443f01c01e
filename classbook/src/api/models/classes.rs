//! API models for classes.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::classes::ClassDBResponse;
use crate::errors::{Error, Result};
use crate::types::ClassId;

/// Accepted range for a class's school year.
const YEARS: std::ops::RangeInclusive<i64> = 1900..=2200;

/// Request body for creating a class owned by the caller
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassCreate {
    #[schema(example = 2024)]
    pub year: i64,
    /// Single alphanumeric character, e.g. "5" or "B"
    #[schema(example = "5")]
    pub grade_level: String,
    #[schema(example = "Math")]
    pub subject: String,
}

impl ClassCreate {
    pub fn validate(&self) -> Result<()> {
        if !YEARS.contains(&self.year) {
            return Err(Error::BadRequest {
                message: format!("year must be between {} and {}", YEARS.start(), YEARS.end()),
            });
        }

        let mut chars = self.grade_level.trim().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphanumeric() => {}
            _ => {
                return Err(Error::BadRequest {
                    message: "grade_level must be a single letter or digit".to_string(),
                });
            }
        }

        if self.subject.trim().is_empty() {
            return Err(Error::BadRequest {
                message: "subject must not be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// A class with its lesson progress
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ClassResponse {
    pub id: ClassId,
    pub year: i64,
    pub grade_level: String,
    pub subject: String,
    /// Lessons recorded so far
    pub lessons_held: i64,
    /// Share of the expected lessons already held, 0 to 100
    #[schema(example = 25)]
    pub progress: u8,
}

impl ClassResponse {
    pub fn new(db: ClassDBResponse, expected_lessons: u32) -> Self {
        Self {
            progress: progress(db.lessons_held, expected_lessons),
            id: db.id,
            year: db.year,
            grade_level: db.grade_level,
            subject: db.subject,
            lessons_held: db.lessons_held,
        }
    }
}

/// `min(100, round(100 * held / expected))`
fn progress(lessons_held: i64, expected_lessons: u32) -> u8 {
    if expected_lessons == 0 {
        return 100;
    }
    let percent = (100.0 * lessons_held as f64 / f64::from(expected_lessons)).round();
    percent.clamp(0.0, 100.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(year: i64, grade_level: &str, subject: &str) -> ClassCreate {
        ClassCreate {
            year,
            grade_level: grade_level.to_string(),
            subject: subject.to_string(),
        }
    }

    #[test]
    fn test_validate_class_create() {
        assert!(create(2024, "5", "Math").validate().is_ok());
        assert!(create(2024, "B", "Math").validate().is_ok());
        assert!(create(2024, "10", "Math").validate().is_err());
        assert!(create(2024, "", "Math").validate().is_err());
        assert!(create(2024, "-", "Math").validate().is_err());
        assert!(create(2024, "5", "  ").validate().is_err());
        assert!(create(1066, "5", "Math").validate().is_err());
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(0, 40), 0);
        assert_eq!(progress(10, 40), 25);
        assert_eq!(progress(1, 3), 33);
        assert_eq!(progress(2, 3), 67);
        assert_eq!(progress(55, 40), 100);
    }
}
