//! Database repository for grades.

use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::{DbError, Result},
        handlers::{Classes, repository::Repository},
        models::grades::{GradeCreateDBRequest, GradeDBResponse, GradeUpdateDBRequest},
    },
    types::{ClassId, GradeId, StudentId, TeacherId, grade_from_tenths, grade_to_tenths},
};

/// Filter for listing grades
#[derive(Debug, Clone)]
pub struct GradeFilter {
    pub student_id: StudentId,
}

impl GradeFilter {
    pub fn new(student_id: StudentId) -> Self {
        Self { student_id }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Grade {
    id: GradeId,
    student_id: StudentId,
    class_id: ClassId,
    term: i64,
    value_tenths: i64,
}

impl From<Grade> for GradeDBResponse {
    fn from(grade: Grade) -> Self {
        Self {
            id: grade.id,
            student_id: grade.student_id,
            class_id: grade.class_id,
            term: grade.term,
            value: grade_from_tenths(grade.value_tenths),
        }
    }
}

pub struct Grades<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Grades<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// Fetch a grade only if it was given in a class owned by `teacher_id`.
    #[instrument(skip(self), err)]
    pub async fn get_owned(&mut self, teacher_id: TeacherId, grade_id: GradeId) -> Result<Option<GradeDBResponse>> {
        let Some(grade) = self.get_by_id(grade_id).await? else {
            return Ok(None);
        };

        let owned = Classes::new(&mut *self.db).get_owned(teacher_id, grade.class_id).await?.is_some();
        Ok(owned.then_some(grade))
    }

    /// Apply a partial update. Fails with [`DbError::NotFound`] if the grade does not exist.
    #[instrument(skip(self, request), err)]
    pub async fn update(&mut self, id: GradeId, request: &GradeUpdateDBRequest) -> Result<GradeDBResponse> {
        let grade = sqlx::query_as::<_, Grade>(
            r#"
            UPDATE grades SET value_tenths = COALESCE(?, value_tenths)
            WHERE id = ?
            RETURNING id, student_id, class_id, term, value_tenths
            "#,
        )
        .bind(request.value.map(grade_to_tenths))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(grade.into())
    }

    #[instrument(skip(self), err)]
    pub async fn delete(&mut self, id: GradeId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM grades WHERE id = ?").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Grades<'c> {
    type CreateRequest = GradeCreateDBRequest;
    type Response = GradeDBResponse;
    type Id = GradeId;
    type Filter = GradeFilter;

    /// Record a grade for a student enrolled in the given class.
    #[instrument(skip(self, request), fields(student_id = request.student_id, class_id = request.class_id, term = request.term), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        // Inserts nothing when the student is not enrolled in the class
        let grade = sqlx::query_as::<_, Grade>(
            r#"
            INSERT INTO grades (student_id, class_id, term, value_tenths)
            SELECT s.id, s.class_id, ?, ? FROM students s WHERE s.id = ? AND s.class_id = ?
            RETURNING id, student_id, class_id, term, value_tenths
            "#,
        )
        .bind(request.term)
        .bind(grade_to_tenths(request.value))
        .bind(request.student_id)
        .bind(request.class_id)
        .fetch_optional(&mut *self.db)
        .await?;

        grade.map(Into::into).ok_or_else(|| DbError::ForeignKeyViolation {
            constraint: None,
            table: Some("grades".to_string()),
            message: format!("Student {} is not enrolled in class {}", request.student_id, request.class_id),
        })
    }

    #[instrument(skip(self), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let grade = sqlx::query_as::<_, Grade>("SELECT id, student_id, class_id, term, value_tenths FROM grades WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(grade.map(Into::into))
    }

    /// Grades of one student, ordered by class then term
    #[instrument(skip(self), fields(student_id = filter.student_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let grades = sqlx::query_as::<_, Grade>(
            "SELECT id, student_id, class_id, term, value_tenths FROM grades WHERE student_id = ? ORDER BY class_id ASC, term ASC",
        )
        .bind(filter.student_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(grades.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_class, create_test_pool, create_test_student, create_test_teacher};
    use rust_decimal::Decimal;

    fn d(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    fn grade(student_id: StudentId, class_id: ClassId, term: i64, value: &str) -> GradeCreateDBRequest {
        GradeCreateDBRequest {
            student_id,
            class_id,
            term,
            value: d(value),
        }
    }

    #[tokio::test]
    async fn test_create_and_list_in_term_order() {
        let (pool, _dir) = create_test_pool().await;
        let teacher = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, teacher.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Grades::new(&mut conn);
        repo.create(&grade(joao.id, class.id, 2, "9.0")).await.unwrap();
        repo.create(&grade(joao.id, class.id, 1, "7.0")).await.unwrap();

        let grades = repo.list(&GradeFilter::new(joao.id)).await.unwrap();
        let terms: Vec<_> = grades.iter().map(|g| g.term).collect();
        assert_eq!(terms, vec![1, 2]);
        assert_eq!(grades[0].value, d("7.0"));
        assert_eq!(grades[1].value, d("9.0"));
    }

    #[tokio::test]
    async fn test_duplicate_term_is_unique_violation() {
        let (pool, _dir) = create_test_pool().await;
        let teacher = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, teacher.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Grades::new(&mut conn);
        repo.create(&grade(joao.id, class.id, 1, "7.0")).await.unwrap();
        let err = repo.create(&grade(joao.id, class.id, 1, "8.0")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { table: Some(ref t), .. } if t == "grades"));
    }

    #[tokio::test]
    async fn test_student_outside_class_rejected() {
        let (pool, _dir) = create_test_pool().await;
        let teacher = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, teacher.id, 2024, "Math").await;
        let other = create_test_class(&pool, teacher.id, 2024, "Art").await;
        let pedro = create_test_student(&pool, other.id, "Pedro").await;

        let mut conn = pool.acquire().await.unwrap();
        let err = Grades::new(&mut conn).create(&grade(pedro.id, class.id, 1, "7.0")).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { ref message, .. } if message.contains("not enrolled")));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (pool, _dir) = create_test_pool().await;
        let teacher = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let class = create_test_class(&pool, teacher.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Grades::new(&mut conn);
        let created = repo.create(&grade(joao.id, class.id, 1, "7.0")).await.unwrap();

        // Absent value leaves the grade untouched
        let unchanged = repo.update(created.id, &GradeUpdateDBRequest::default()).await.unwrap();
        assert_eq!(unchanged, created);

        let updated = repo.update(created.id, &GradeUpdateDBRequest { value: Some(d("9.5")) }).await.unwrap();
        assert_eq!(updated.value, d("9.5"));

        assert!(matches!(
            repo.update(9999, &GradeUpdateDBRequest { value: Some(d("1.0")) }).await,
            Err(DbError::NotFound)
        ));

        assert!(repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
        assert!(!repo.delete(created.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_owned_checks_class_owner() {
        let (pool, _dir) = create_test_pool().await;
        let ana = create_test_teacher(&pool, "ana@x.com", "pw123").await;
        let bia = create_test_teacher(&pool, "bia@x.com", "pw123").await;
        let class = create_test_class(&pool, ana.id, 2024, "Math").await;
        let joao = create_test_student(&pool, class.id, "Joao").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Grades::new(&mut conn);
        let created = repo.create(&grade(joao.id, class.id, 1, "7.0")).await.unwrap();
        assert!(repo.get_owned(ana.id, created.id).await.unwrap().is_some());
        assert!(repo.get_owned(bia.id, created.id).await.unwrap().is_none());
    }
}
