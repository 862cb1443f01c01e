//! Read-only report queries spanning several tables.

use std::collections::HashMap;

use sqlx::{Connection, FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::{Students, repository::Repository},
        models::reports::{AttendanceTotals, ReportCardClassDBRecord, ReportCardDBResponse, TermGradeDBRecord},
    },
    types::{ClassId, StudentId, grade_from_tenths},
};

#[derive(Debug, Clone, FromRow)]
struct ReportClass {
    id: ClassId,
    subject: String,
    year: i64,
    grade_level: String,
}

#[derive(Debug, Clone, FromRow)]
struct TermGrade {
    class_id: ClassId,
    term: i64,
    value_tenths: i64,
}

#[derive(Debug, Clone, FromRow)]
struct AttendanceCount {
    class_id: ClassId,
    lessons: i64,
    present: i64,
}

pub struct Reports<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Reports<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Build the report card of a student, or `None` if the student does not exist.
    ///
    /// Covers the class the student is enrolled in plus any class they hold grades in.
    #[instrument(skip(self), err)]
    pub async fn report_card(&mut self, student_id: StudentId) -> Result<Option<ReportCardDBResponse>> {
        // Read everything from one snapshot
        let mut tx = self.db.begin().await?;

        let Some(student) = Students::new(&mut tx).get_by_id(student_id).await? else {
            return Ok(None);
        };

        let classes = sqlx::query_as::<_, ReportClass>(
            r#"
            SELECT c.id, c.subject, c.year, c.grade_level
            FROM classes c
            WHERE c.id = ? OR c.id IN (SELECT g.class_id FROM grades g WHERE g.student_id = ?)
            ORDER BY c.year DESC, c.subject ASC, c.id ASC
            "#,
        )
        .bind(student.class_id)
        .bind(student_id)
        .fetch_all(&mut *tx)
        .await?;

        let grades = sqlx::query_as::<_, TermGrade>("SELECT class_id, term, value_tenths FROM grades WHERE student_id = ? ORDER BY class_id, term")
            .bind(student_id)
            .fetch_all(&mut *tx)
            .await?;

        let attendance = sqlx::query_as::<_, AttendanceCount>(
            r#"
            SELECT l.class_id,
                   COUNT(*) AS lessons,
                   COALESCE(SUM(CASE WHEN a.present THEN 1 ELSE 0 END), 0) AS present
            FROM attendance a
            JOIN lessons l ON l.id = a.lesson_id
            WHERE a.student_id = ?
            GROUP BY l.class_id
            "#,
        )
        .bind(student_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut grades_by_class: HashMap<ClassId, Vec<TermGradeDBRecord>> = HashMap::new();
        for grade in grades {
            grades_by_class.entry(grade.class_id).or_default().push(TermGradeDBRecord {
                term: grade.term,
                value: grade_from_tenths(grade.value_tenths),
            });
        }

        let attendance_by_class: HashMap<ClassId, AttendanceTotals> = attendance
            .into_iter()
            .map(|count| {
                (
                    count.class_id,
                    AttendanceTotals {
                        lessons: count.lessons,
                        present: count.present,
                    },
                )
            })
            .collect();

        let classes = classes
            .into_iter()
            .map(|class| ReportCardClassDBRecord {
                grades: grades_by_class.remove(&class.id).unwrap_or_default(),
                attendance: attendance_by_class.get(&class.id).copied().unwrap_or_default(),
                class_id: class.id,
                subject: class.subject,
                year: class.year,
                grade_level: class.grade_level,
            })
            .collect();

        Ok(Some(ReportCardDBResponse {
            student_id: student.id,
            student_name: student.name,
            class_id: student.class_id,
            classes,
        }))
    }
}
