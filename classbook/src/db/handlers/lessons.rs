//! Database repository for lessons and their attendance.

use chrono::NaiveDate;
use sqlx::{Connection, FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{Classes, repository::Repository},
        models::lessons::{
            AttendanceDBRecord, CalendarEntryDBResponse, LessonAttendanceDBResponse, LessonCreateDBRequest, LessonDBResponse,
        },
    },
    types::{ClassId, LessonId, StudentId, TeacherId},
};

/// Filter for listing lessons
#[derive(Debug, Clone)]
pub struct LessonFilter {
    pub class_id: ClassId,
}

impl LessonFilter {
    pub fn new(class_id: ClassId) -> Self {
        Self { class_id }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Lesson {
    id: LessonId,
    class_id: ClassId,
    date: NaiveDate,
    topic: Option<String>,
    content: Option<String>,
}

impl From<Lesson> for LessonDBResponse {
    fn from(lesson: Lesson) -> Self {
        Self {
            id: lesson.id,
            class_id: lesson.class_id,
            date: lesson.date,
            topic: lesson.topic,
            content: lesson.content,
        }
    }
}

/// One row of the lesson/attendance outer join
#[derive(Debug, Clone, FromRow)]
struct LessonAttendanceRow {
    lesson_id: LessonId,
    date: NaiveDate,
    topic: Option<String>,
    student_id: Option<StudentId>,
    student_name: Option<String>,
    present: Option<bool>,
}

#[derive(Debug, Clone, FromRow)]
struct CalendarEntry {
    lesson_id: LessonId,
    class_id: ClassId,
    date: NaiveDate,
    topic: Option<String>,
    subject: String,
}

impl From<CalendarEntry> for CalendarEntryDBResponse {
    fn from(entry: CalendarEntry) -> Self {
        Self {
            lesson_id: entry.lesson_id,
            class_id: entry.class_id,
            date: entry.date,
            topic: entry.topic,
            subject: entry.subject,
        }
    }
}

pub struct Lessons<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Lessons<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Fetch a lesson only if its class is owned by `teacher_id`.
    #[instrument(skip(self), err)]
    pub async fn get_owned(&mut self, teacher_id: TeacherId, lesson_id: LessonId) -> Result<Option<LessonDBResponse>> {
        let Some(lesson) = self.get_by_id(lesson_id).await? else {
            return Ok(None);
        };

        let owned = Classes::new(&mut *self.db).get_owned(teacher_id, lesson.class_id).await?.is_some();
        Ok(owned.then_some(lesson))
    }

    /// Delete a lesson. Its attendance rows go with it (ON DELETE CASCADE).
    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: LessonId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM lessons WHERE id = ?")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Every lesson of a class with its attendance marks, oldest first.
    ///
    /// Lessons without any attendance recorded are included with an empty list.
    #[instrument(skip(self), err)]
    pub async fn list_attendance(&mut self, class_id: ClassId) -> Result<Vec<LessonAttendanceDBResponse>> {
        let rows = sqlx::query_as::<_, LessonAttendanceRow>(
            r#"
            SELECT l.id AS lesson_id, l.date, l.topic,
                   a.student_id, s.name AS student_name, a.present
            FROM lessons l
            LEFT JOIN attendance a ON a.lesson_id = l.id
            LEFT JOIN students s ON s.id = a.student_id
            WHERE l.class_id = ?
            ORDER BY l.date ASC, l.id ASC, s.name ASC, a.student_id ASC
            "#,
        )
        .bind(class_id)
        .fetch_all(&mut *self.db)
        .await?;

        let mut lessons: Vec<LessonAttendanceDBResponse> = Vec::new();
        for row in rows {
            // Rows arrive grouped by lesson
            if lessons.last().is_none_or(|lesson| lesson.lesson_id != row.lesson_id) {
                lessons.push(LessonAttendanceDBResponse {
                    lesson_id: row.lesson_id,
                    date: row.date,
                    topic: row.topic,
                    attendance: Vec::new(),
                });
            }

            if let (Some(student_id), Some(student_name), Some(present), Some(lesson)) =
                (row.student_id, row.student_name, row.present, lessons.last_mut())
            {
                lesson.attendance.push(AttendanceDBRecord {
                    student_id,
                    student_name,
                    present,
                });
            }
        }

        Ok(lessons)
    }

    /// Lessons across all of a teacher's classes, oldest first
    #[instrument(skip(self), err)]
    pub async fn calendar(&mut self, teacher_id: TeacherId) -> Result<Vec<CalendarEntryDBResponse>> {
        let entries = sqlx::query_as::<_, CalendarEntry>(
            r#"
            SELECT l.id AS lesson_id, l.class_id, l.date, l.topic, c.subject
            FROM lessons l
            JOIN classes c ON c.id = l.class_id
            WHERE c.teacher_id = ?
            ORDER BY l.date ASC, l.id ASC
            "#,
        )
        .bind(teacher_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(entries.into_iter().map(Into::into).collect())
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Lessons<'c> {
    type CreateRequest = LessonCreateDBRequest;
    type Response = LessonDBResponse;
    type Id = LessonId;
    type Filter = LessonFilter;

    /// Insert the lesson and all of its attendance marks atomically.
    ///
    /// A mark for a student outside the lesson's class aborts the whole insert.
    #[instrument(skip(self, request), fields(class_id = request.class_id, marks = request.attendance.len()), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let mut tx = self.db.begin().await?;

        let lesson = sqlx::query_as::<_, Lesson>(
            "INSERT INTO lessons (date, topic, content, class_id) VALUES (?, ?, ?, ?) RETURNING id, class_id, date, topic, content",
        )
        .bind(request.date)
        .bind(&request.topic)
        .bind(&request.content)
        .bind(request.class_id)
        .fetch_one(&mut *tx)
        .await?;

        for mark in &request.attendance {
            // Inserts nothing when the student is not enrolled in the class
            let result = sqlx::query(
                r#"
                INSERT INTO attendance (lesson_id, student_id, present)
                SELECT ?, s.id, ? FROM students s WHERE s.id = ? AND s.class_id = ?
                "#,
            )
            .bind(lesson.id)
            .bind(mark.present)
            .bind(mark.student_id)
            .bind(request.class_id)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() != 1 {
                // Dropping the transaction rolls back the lesson and earlier marks
                return Err(DbError::ForeignKeyViolation {
                    constraint: None,
                    table: Some("attendance".to_string()),
                    message: format!("Student {} does not belong to class {}", mark.student_id, request.class_id),
                });
            }
        }

        tx.commit().await?;

        Ok(lesson.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let lesson = sqlx::query_as::<_, Lesson>("SELECT id, class_id, date, topic, content FROM lessons WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(lesson.map(Into::into))
    }

    /// Lessons of one class, most recent first
    #[instrument(skip(self), fields(class_id = filter.class_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let lessons = sqlx::query_as::<_, Lesson>(
            "SELECT id, class_id, date, topic, content FROM lessons WHERE class_id = ? ORDER BY date DESC, id DESC",
        )
        .bind(filter.class_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(lessons.into_iter().map(Into::into).collect())
    }
}
