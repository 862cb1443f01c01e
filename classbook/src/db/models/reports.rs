//! Database models for report views.

use rust_decimal::Decimal;

use crate::types::{ClassId, StudentId};

/// A term grade as shown on a report card
#[derive(Debug, Clone, PartialEq)]
pub struct TermGradeDBRecord {
    pub term: i64,
    pub value: Decimal,
}

/// Attendance counts of one student in one class
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AttendanceTotals {
    pub lessons: i64,
    pub present: i64,
}

/// One class row on a student's report card
#[derive(Debug, Clone)]
pub struct ReportCardClassDBRecord {
    pub class_id: ClassId,
    pub subject: String,
    pub year: i64,
    pub grade_level: String,
    /// Ordered by term
    pub grades: Vec<TermGradeDBRecord>,
    pub attendance: AttendanceTotals,
}

/// Report card for a student across every class they are enrolled in or graded in
#[derive(Debug, Clone)]
pub struct ReportCardDBResponse {
    pub student_id: StudentId,
    pub student_name: String,
    pub class_id: ClassId,
    pub classes: Vec<ReportCardClassDBRecord>,
}
