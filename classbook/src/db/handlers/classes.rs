//! Database repository for classes.

use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        handlers::repository::Repository,
        models::classes::{ClassCreateDBRequest, ClassDBResponse},
    },
    types::{ClassId, TeacherId},
};

/// Filter for listing classes
#[derive(Debug, Clone)]
pub struct ClassFilter {
    pub teacher_id: TeacherId,
}

impl ClassFilter {
    pub fn new(teacher_id: TeacherId) -> Self {
        Self { teacher_id }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Class {
    id: ClassId,
    year: i64,
    grade_level: String,
    subject: String,
    teacher_id: TeacherId,
    lessons_held: i64,
}

impl From<Class> for ClassDBResponse {
    fn from(class: Class) -> Self {
        Self {
            id: class.id,
            year: class.year,
            grade_level: class.grade_level,
            subject: class.subject,
            teacher_id: class.teacher_id,
            lessons_held: class.lessons_held,
        }
    }
}

const SELECT_CLASS: &str = r#"
    SELECT c.id, c.year, c.grade_level, c.subject, c.teacher_id,
           (SELECT COUNT(*) FROM lessons l WHERE l.class_id = c.id) AS lessons_held
    FROM classes c
"#;

pub struct Classes<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Classes<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Fetch a class only if `teacher_id` owns it.
    ///
    /// Foreign classes are indistinguishable from missing ones.
    #[instrument(skip(self), err)]
    pub async fn get_owned(&mut self, teacher_id: TeacherId, class_id: ClassId) -> Result<Option<ClassDBResponse>> {
        Ok(self.get_by_id(class_id).await?.filter(|class| class.teacher_id == teacher_id))
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Classes<'c> {
    type CreateRequest = ClassCreateDBRequest;
    type Response = ClassDBResponse;
    type Id = ClassId;
    type Filter = ClassFilter;

    #[instrument(skip(self, request), fields(teacher_id = request.teacher_id, subject = %request.subject), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let class = sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (year, grade_level, subject, teacher_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, year, grade_level, subject, teacher_id, 0 AS lessons_held
            "#,
        )
        .bind(request.year)
        .bind(&request.grade_level)
        .bind(&request.subject)
        .bind(request.teacher_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(class.into())
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let class = sqlx::query_as::<_, Class>(&format!("{SELECT_CLASS} WHERE c.id = ?"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(class.map(Into::into))
    }

    /// Classes of one teacher, newest year first
    #[instrument(skip(self), fields(teacher_id = filter.teacher_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let classes = sqlx::query_as::<_, Class>(&format!(
            "{SELECT_CLASS} WHERE c.teacher_id = ? ORDER BY c.year DESC, c.subject ASC, c.id ASC"
        ))
        .bind(filter.teacher_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(classes.into_iter().map(Into::into).collect())
    }
}
