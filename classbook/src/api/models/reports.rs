//! API models for the student report card.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::db::models::reports::{AttendanceTotals, ReportCardClassDBRecord, ReportCardDBResponse, TermGradeDBRecord};
use crate::types::{ClassId, StudentId, mean_to_tenth, round_to_tenth};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCardStudent {
    pub id: StudentId,
    pub name: String,
    pub class_id: ClassId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TermGrade {
    pub term: i64,
    #[schema(value_type = f64)]
    #[serde(with = "rust_decimal::serde::float")]
    pub value: Decimal,
}

impl From<TermGradeDBRecord> for TermGrade {
    fn from(db: TermGradeDBRecord) -> Self {
        Self {
            term: db.term,
            value: db.value,
        }
    }
}

/// Attendance of the student in one class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceSummary {
    /// Lessons with attendance recorded for the student
    pub lessons: i64,
    pub present: i64,
    pub absent: i64,
    /// Percentage present, one decimal. Null when nothing was recorded.
    #[schema(value_type = Option<f64>, example = 75.0)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub rate: Option<Decimal>,
}

impl From<AttendanceTotals> for AttendanceSummary {
    fn from(totals: AttendanceTotals) -> Self {
        let rate = (totals.lessons > 0)
            .then(|| round_to_tenth(Decimal::from(totals.present * 100) / Decimal::from(totals.lessons)));
        Self {
            lessons: totals.lessons,
            present: totals.present,
            absent: totals.lessons - totals.present,
            rate,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCardClass {
    pub class_id: ClassId,
    pub subject: String,
    pub year: i64,
    pub grade_level: String,
    /// Ordered by term
    pub grades: Vec<TermGrade>,
    /// Mean of `grades`, one decimal. Null when there are no grades.
    #[schema(value_type = Option<f64>)]
    #[serde(with = "rust_decimal::serde::float_option")]
    pub final_average: Option<Decimal>,
    pub attendance: AttendanceSummary,
}

impl From<ReportCardClassDBRecord> for ReportCardClass {
    fn from(db: ReportCardClassDBRecord) -> Self {
        let final_average = mean_to_tenth(db.grades.iter().map(|grade| grade.value));
        Self {
            class_id: db.class_id,
            subject: db.subject,
            year: db.year,
            grade_level: db.grade_level,
            grades: db.grades.into_iter().map(Into::into).collect(),
            final_average,
            attendance: db.attendance.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportCardResponse {
    pub student: ReportCardStudent,
    pub classes: Vec<ReportCardClass>,
}

impl From<ReportCardDBResponse> for ReportCardResponse {
    fn from(db: ReportCardDBResponse) -> Self {
        Self {
            student: ReportCardStudent {
                id: db.student_id,
                name: db.student_name,
                class_id: db.class_id,
            },
            classes: db.classes.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_summary() {
        let summary = AttendanceSummary::from(AttendanceTotals { lessons: 3, present: 2 });
        assert_eq!(summary.absent, 1);
        assert_eq!(summary.rate, Some(Decimal::new(667, 1)));

        let summary = AttendanceSummary::from(AttendanceTotals { lessons: 8, present: 7 });
        assert_eq!(summary.rate, Some(Decimal::new(875, 1)));

        let empty = AttendanceSummary::from(AttendanceTotals::default());
        assert_eq!(empty.rate, None);
        assert_eq!(empty.absent, 0);
    }

    fn class_record(grades: &[(i64, i64)]) -> ReportCardClassDBRecord {
        ReportCardClassDBRecord {
            class_id: 1,
            subject: "Math".to_string(),
            year: 2024,
            grade_level: "5".to_string(),
            grades: grades
                .iter()
                .map(|&(term, tenths)| TermGradeDBRecord {
                    term,
                    value: Decimal::new(tenths, 1),
                })
                .collect(),
            attendance: AttendanceTotals::default(),
        }
    }

    #[test]
    fn test_final_average_rounds_half_up() {
        let class = ReportCardClass::from(class_record(&[(1, 1), (2, 46)]));
        assert_eq!(class.final_average, Some(Decimal::new(24, 1)));

        let class = ReportCardClass::from(class_record(&[]));
        assert_eq!(class.final_average, None);
        assert!(class.grades.is_empty());
    }
}
