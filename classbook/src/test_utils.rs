//! Test utilities for integration testing (available with `test-utils` feature).

use axum_test::TestServer;
use chrono::Utc;
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::{
    api::models::teachers::CurrentTeacher,
    auth::session,
    config::{Config, DatabaseConfig, PasswordConfig, PoolSettings},
    db::{
        handlers::{Classes, Lessons, Repository, Students, Teachers},
        models::{
            classes::{ClassCreateDBRequest, ClassDBResponse},
            lessons::{LessonCreateDBRequest, LessonDBResponse},
            students::{StudentCreateDBRequest, StudentDBResponse},
            teachers::TeacherDBResponse,
        },
    },
    types::{ClassId, TeacherId},
};

/// Create a migrated database in a fresh temporary directory.
///
/// The directory is deleted when the returned [`TempDir`] is dropped, so keep it alive for the
/// duration of the test.
pub async fn create_test_pool() -> (SqlitePool, TempDir) {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let database = DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("classbook.db").display()),
        pool: PoolSettings {
            max_connections: 5,
            min_connections: 0,
            ..Default::default()
        },
    };

    let pool = crate::connect_pool(&database).await.expect("Failed to open test database");
    crate::migrator().run(&pool).await.expect("Failed to run migrations");
    (pool, dir)
}

pub fn create_test_config() -> Config {
    let mut config = Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-jwt".to_string()),
        ..Default::default()
    };
    // Cheap hashing keeps login tests fast
    config.auth.password = PasswordConfig {
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
    };
    config
}

pub async fn create_test_app(pool: SqlitePool) -> TestServer {
    crate::Application::new_with_pool(create_test_config(), pool)
        .await
        .expect("Failed to create application")
        .into_test_server()
}

/// Create a teacher whose name is the capitalised local part of `email` ("ana@x.com" -> "Ana").
pub async fn create_test_teacher(pool: &SqlitePool, email: &str, password: &str) -> TeacherDBResponse {
    let local = email.split('@').next().unwrap_or(email);
    let mut chars = local.chars();
    let name: String = chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default();

    let params = create_test_config().auth.password.argon2_params();
    let id = crate::create_teacher(pool, &name, email, password, params)
        .await
        .expect("Failed to create test teacher");

    let mut conn = pool.acquire().await.unwrap();
    Teachers::new(&mut conn).get_by_id(id).await.unwrap().unwrap()
}

pub async fn create_test_class(pool: &SqlitePool, teacher_id: TeacherId, year: i64, subject: &str) -> ClassDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    Classes::new(&mut conn)
        .create(&ClassCreateDBRequest {
            teacher_id,
            year,
            grade_level: "5".to_string(),
            subject: subject.to_string(),
        })
        .await
        .expect("Failed to create test class")
}

pub async fn create_test_student(pool: &SqlitePool, class_id: ClassId, name: &str) -> StudentDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    Students::new(&mut conn)
        .create(&StudentCreateDBRequest {
            class_id,
            name: name.to_string(),
            photo_url: None,
        })
        .await
        .expect("Failed to create test student")
}

/// Create a lesson dated today with no attendance taken.
pub async fn create_test_lesson(pool: &SqlitePool, class_id: ClassId, topic: &str) -> LessonDBResponse {
    let mut conn = pool.acquire().await.unwrap();
    Lessons::new(&mut conn)
        .create(&LessonCreateDBRequest {
            class_id,
            date: Utc::now().date_naive(),
            topic: Some(topic.to_string()),
            content: None,
            attendance: vec![],
        })
        .await
        .expect("Failed to create test lesson")
}

/// Authorization header carrying a valid session token for `teacher`.
pub fn auth_header(teacher: &TeacherDBResponse) -> (String, String) {
    let current = CurrentTeacher {
        id: teacher.id,
        name: teacher.name.clone(),
        email: teacher.email.clone(),
    };
    let token = session::create_session_token(&current, &create_test_config()).expect("Failed to create test token");
    ("authorization".to_string(), format!("Bearer {token}"))
}
