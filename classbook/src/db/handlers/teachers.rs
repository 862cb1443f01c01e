//! Database repository for teachers.

use sqlx::{FromRow, SqliteConnection};
use tracing::instrument;

use crate::{
    db::{
        errors::Result,
        models::teachers::{TeacherCreateDBRequest, TeacherDBResponse},
    },
    types::TeacherId,
};

#[derive(Debug, Clone, FromRow)]
struct Teacher {
    id: TeacherId,
    name: String,
    email: String,
    password_hash: String,
}

impl From<Teacher> for TeacherDBResponse {
    fn from(teacher: Teacher) -> Self {
        Self {
            id: teacher.id,
            name: teacher.name,
            email: teacher.email,
            password_hash: teacher.password_hash,
        }
    }
}

/// Teacher accounts are provisioned out-of-band, so this repository does not
/// implement [`Repository`](super::Repository) and has no list operation.
pub struct Teachers<'c> {
    db: &'c mut SqliteConnection,
}

impl<'c> Teachers<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(email = %request.email), err)]
    pub async fn create(&mut self, request: &TeacherCreateDBRequest) -> Result<TeacherDBResponse> {
        let teacher = sqlx::query_as::<_, Teacher>(
            "INSERT INTO teachers (name, email, password_hash) VALUES (?, ?, ?) RETURNING id, name, email, password_hash",
        )
        .bind(&request.name)
        .bind(&request.email)
        .bind(&request.password_hash)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(teacher.into())
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_id(&mut self, id: TeacherId) -> Result<Option<TeacherDBResponse>> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT id, name, email, password_hash FROM teachers WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(teacher.map(Into::into))
    }

    #[instrument(skip(self), err)]
    pub async fn get_by_email(&mut self, email: &str) -> Result<Option<TeacherDBResponse>> {
        let teacher = sqlx::query_as::<_, Teacher>("SELECT id, name, email, password_hash FROM teachers WHERE email = ?")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(teacher.map(Into::into))
    }

    /// Replace the stored password hash. Returns false if the teacher does not exist.
    #[instrument(skip(self, password_hash), err)]
    pub async fn update_password_hash(&mut self, id: TeacherId, password_hash: &str) -> Result<bool> {
        let result = sqlx::query("UPDATE teachers SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::errors::DbError, test_utils::create_test_pool};

    fn request(email: &str) -> TeacherCreateDBRequest {
        TeacherCreateDBRequest {
            name: "Ana".to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$placeholder".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_lookup_teacher() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Teachers::new(&mut conn);

        let created = repo.create(&request("ana@x.com")).await.unwrap();
        assert_eq!(created.email, "ana@x.com");

        let by_id = repo.get_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(by_id.name, "Ana");

        let by_email = repo.get_by_email("ana@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, created.id);

        assert!(repo.get_by_email("nobody@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_email_is_unique_violation() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Teachers::new(&mut conn);

        repo.create(&request("ana@x.com")).await.unwrap();
        let err = repo.create(&request("ana@x.com")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { table: Some(ref t), .. } if t == "teachers"));
    }

    #[tokio::test]
    async fn test_update_password_hash() {
        let (pool, _dir) = create_test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Teachers::new(&mut conn);

        let created = repo.create(&request("ana@x.com")).await.unwrap();
        assert!(repo.update_password_hash(created.id, "new-hash").await.unwrap());
        assert_eq!(repo.get_by_id(created.id).await.unwrap().unwrap().password_hash, "new-hash");
        assert!(!repo.update_password_hash(9999, "new-hash").await.unwrap());
    }
}
