//! Database models for lessons and attendance.

use chrono::NaiveDate;

use crate::types::{ClassId, LessonId, StudentId};

/// One attendance mark recorded together with a lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceMark {
    pub student_id: StudentId,
    pub present: bool,
}

/// Database request for creating a lesson with its attendance
#[derive(Debug, Clone)]
pub struct LessonCreateDBRequest {
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub content: Option<String>,
    pub attendance: Vec<AttendanceMark>,
}

/// Database response for a lesson
#[derive(Debug, Clone)]
pub struct LessonDBResponse {
    pub id: LessonId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub content: Option<String>,
}

/// Attendance of one student at one lesson, joined with the student's name
#[derive(Debug, Clone)]
pub struct AttendanceDBRecord {
    pub student_id: StudentId,
    pub student_name: String,
    pub present: bool,
}

/// A lesson with every attendance mark taken at it
#[derive(Debug, Clone)]
pub struct LessonAttendanceDBResponse {
    pub lesson_id: LessonId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub attendance: Vec<AttendanceDBRecord>,
}

/// A lesson joined with the subject of its class
#[derive(Debug, Clone)]
pub struct CalendarEntryDBResponse {
    pub lesson_id: LessonId,
    pub class_id: ClassId,
    pub date: NaiveDate,
    pub topic: Option<String>,
    pub subject: String,
}
