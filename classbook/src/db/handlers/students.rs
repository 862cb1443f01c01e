//! Database repository for students.

use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::{Classes, repository::Repository},
        models::students::{StudentCreateDBRequest, StudentDBResponse},
    },
    types::{ClassId, StudentId, TeacherId},
};

/// Filter for listing students
#[derive(Debug, Clone)]
pub struct StudentFilter {
    pub class_id: ClassId,
}

impl StudentFilter {
    pub fn new(class_id: ClassId) -> Self {
        Self { class_id }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Student {
    id: StudentId,
    name: String,
    photo_url: Option<String>,
    class_id: ClassId,
}

impl From<Student> for StudentDBResponse {
    fn from(student: Student) -> Self {
        Self {
            id: student.id,
            name: student.name,
            photo_url: student.photo_url,
            class_id: student.class_id,
        }
    }
}

pub struct Students<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Students<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Fetch a student only if they are enrolled in a class owned by `teacher_id`.
    #[instrument(skip(self), err)]
    pub async fn get_owned(&mut self, teacher_id: TeacherId, student_id: StudentId) -> Result<Option<StudentDBResponse>> {
        let Some(student) = self.get_by_id(student_id).await? else {
            return Ok(None);
        };

        let owned = Classes::new(&mut *self.db).get_owned(teacher_id, student.class_id).await?.is_some();
        Ok(owned.then_some(student))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Students<'c> {
    type CreateRequest = StudentCreateDBRequest;
    type Response = StudentDBResponse;
    type Id = StudentId;
    type Filter = StudentFilter;

    #[instrument(skip(self, request), fields(class_id = request.class_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let student = sqlx::query_as::<_, Student>(
            "INSERT INTO students (name, photo_url, class_id) VALUES (?, ?, ?) RETURNING id, name, photo_url, class_id",
        )
        .bind(&request.name)
        .bind(&request.photo_url)
        .bind(request.class_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(student.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let student = sqlx::query_as::<_, Student>("SELECT id, name, photo_url, class_id FROM students WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(student.map(Into::into))
    }

    /// Students of one class, ordered by name
    #[instrument(skip(self), fields(class_id = filter.class_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let students =
            sqlx::query_as::<_, Student>("SELECT id, name, photo_url, class_id FROM students WHERE class_id = ? ORDER BY name ASC, id ASC")
                .bind(filter.class_id)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(students.into_iter().map(Into::into).collect())
    }
}
