//! API models for lessons, attendance and the calendar.

use std::collections::HashSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::lessons::{
    AttendanceDBRecord, AttendanceMark, CalendarEntryDBResponse, LessonAttendanceDBResponse, LessonCreateDBRequest, LessonDBResponse,
};
use crate::errors::{Error, Result};
use crate::types::{ClassId, LessonId, StudentId};

/// Topic shown on the calendar for lessons without one.
pub const UNTITLED_TOPIC: &str = "Untitled";

fn default_present() -> bool {
    true
}

/// Attendance mark sent with a new lesson
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceEntry {
    pub student_id: StudentId,
    /// Defaults to true
    #[serde(default = "default_present")]
    pub present: bool,
}

/// Request body for recording a lesson together with its attendance
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonCreate {
    pub class_id: Option<ClassId>,
    /// Defaults to today (UTC)
    #[serde(default)]
    #[schema(example = "2024-03-01")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    #[schema(example = "Fractions")]
    pub topic: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub attendance: Vec<AttendanceEntry>,
}

impl LessonCreate {
    /// Check the body and convert it into a repository request.
    ///
    /// Does not check that the class exists or belongs to the caller.
    pub fn into_db_request(self, today: NaiveDate) -> Result<LessonCreateDBRequest> {
        let class_id = self.class_id.ok_or_else(|| Error::BadRequest {
            message: "class_id is required".to_string(),
        })?;

        let mut seen = HashSet::new();
        for entry in &self.attendance {
            if !seen.insert(entry.student_id) {
                return Err(Error::BadRequest {
                    message: format!("Student {} appears more than once in attendance", entry.student_id),
                });
            }
        }

        Ok(LessonCreateDBRequest {
            class_id,
            date: self.date.unwrap_or(today),
            topic: self.topic,
            content: self.content,
            attendance: self
                .attendance
                .into_iter()
                .map(|entry| AttendanceMark {
                    student_id: entry.student_id,
                    present: entry.present,
                })
                .collect(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonCreated {
    pub lesson_id: LessonId,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AttendanceRecordResponse {
    pub student_id: StudentId,
    pub student_name: String,
    pub present: bool,
}

impl From<AttendanceDBRecord> for AttendanceRecordResponse {
    fn from(db: AttendanceDBRecord) -> Self {
        Self {
            student_id: db.student_id,
            student_name: db.student_name,
            present: db.present,
        }
    }
}

/// A lesson with the attendance taken at it
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonAttendanceResponse {
    pub lesson_id: LessonId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub attendance: Vec<AttendanceRecordResponse>,
}

impl From<LessonAttendanceDBResponse> for LessonAttendanceResponse {
    fn from(db: LessonAttendanceDBResponse) -> Self {
        Self {
            lesson_id: db.lesson_id,
            date: db.date,
            topic: db.topic,
            attendance: db.attendance.into_iter().map(Into::into).collect(),
        }
    }
}

/// What was taught in a lesson
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LessonContentResponse {
    pub lesson_id: LessonId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub content: Option<String>,
}

impl From<LessonDBResponse> for LessonContentResponse {
    fn from(db: LessonDBResponse) -> Self {
        Self {
            lesson_id: db.id,
            date: db.date,
            topic: db.topic,
            content: db.content,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CalendarEntryResponse {
    pub lesson_id: LessonId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    /// "Untitled" when the lesson has no topic
    pub topic: String,
    pub subject: String,
}

impl From<CalendarEntryDBResponse> for CalendarEntryResponse {
    fn from(db: CalendarEntryDBResponse) -> Self {
        Self {
            lesson_id: db.lesson_id,
            class_id: db.class_id,
            date: db.date,
            topic: db
                .topic
                .filter(|topic| !topic.trim().is_empty())
                .unwrap_or_else(|| UNTITLED_TOPIC.to_string()),
            subject: db.subject,
        }
    }
}
