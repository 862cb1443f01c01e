//! # classbook: a school diary API
//!
//! `classbook` is the backend of a teacher's class diary. Teachers log in and manage the classes
//! they teach, the students enrolled in each class, the lessons held (with per-student
//! attendance) and bimester grades, and pull read-only reports built from that data: a student's
//! report card, a class's attendance and content history, and a calendar across every class.
//!
//! ## Architecture
//!
//! The service is a single axum application backed by SQLite:
//!
//! - **API layer** ([`api`]): request handlers and JSON models. Every route except `/login`
//!   requires a bearer token and only ever sees the caller's own classes.
//! - **Authentication** ([`auth`]): argon2 password hashing and HS256 session tokens.
//! - **Database layer** ([`db`]): repositories over a `sqlx` connection, one per table.
//! - **Configuration** ([`config`]): YAML file plus environment overrides.
//!
//! ## Request Flow
//!
//! 1. The [`CurrentTeacher`](api::models::teachers::CurrentTeacher) extractor validates the
//!    `Authorization: Bearer` header.
//! 2. The handler checks that the class, student, lesson or grade in the path belongs to that
//!    teacher; anything else is reported as not found.
//! 3. Repositories run the queries, inside a transaction where several rows change together.
//!
//! ## Getting Started
//!
//! ```no_run
//! use classbook::{Application, Config, telemetry};
//! use clap::Parser;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = classbook::config::Args::parse();
//!     let config = Config::load(&args)?;
//!     telemetry::init_telemetry(config.enable_otel_export)?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async { tokio::signal::ctrl_c().await.ok(); }).await
//! }
//! ```
pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

#[cfg(test)]
mod test;

use std::{str::FromStr, time::Duration};

use axum::{
    Json, Router,
    http::{self, HeaderValue},
    routing::{delete, get, post},
};
use bon::Builder;
use serde_json::json;
use sqlx::{
    SqlitePool,
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

use crate::{
    api::handlers::{auth as auth_handlers, classes, grades, lessons, reports},
    auth::password::{self, Argon2Params},
    config::{CorsOrigin, DatabaseConfig, SeedTeacher},
    db::{handlers::Teachers, models::teachers::TeacherCreateDBRequest},
    openapi::ApiDoc,
    types::TeacherId,
};
pub use config::Config;

/// Application state shared across all request handlers.
///
/// ```ignore
/// let state = AppState::builder()
///     .db(pool)
///     .config(config)
///     .build();
/// ```
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the classbook database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Open the SQLite connection pool described by `database`.
///
/// The database file is created if it does not exist. Foreign keys are switched on for every
/// connection, since SQLite leaves them off by default and the schema relies on them for the
/// attendance cascade.
pub async fn connect_pool(database: &DatabaseConfig) -> anyhow::Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&database.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal);

    let settings = &database.pool;
    let pool = SqlitePoolOptions::new()
        .max_connections(settings.max_connections)
        .min_connections(settings.min_connections)
        .acquire_timeout(Duration::from_secs(settings.acquire_timeout_secs))
        .idle_timeout((settings.idle_timeout_secs > 0).then(|| Duration::from_secs(settings.idle_timeout_secs)))
        .max_lifetime((settings.max_lifetime_secs > 0).then(|| Duration::from_secs(settings.max_lifetime_secs)))
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a teacher account with a freshly hashed password.
///
/// Fails with a unique violation if the email is already registered.
#[instrument(skip(pool, password, params), err)]
pub async fn create_teacher(pool: &SqlitePool, name: &str, email: &str, password: &str, params: Argon2Params) -> anyhow::Result<TeacherId> {
    let password_hash = password::hash_password_blocking(password.to_string(), params).await?;

    let mut conn = pool.acquire().await?;
    let teacher = Teachers::new(&mut conn)
        .create(&TeacherCreateDBRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password_hash,
        })
        .await?;

    Ok(teacher.id)
}

/// Make sure the configured seed teacher exists.
///
/// Idempotent: an existing account keeps its id and only has its password replaced when one is
/// configured. A missing account is created, which requires a password.
#[instrument(skip_all, fields(email = %seed.email), err)]
pub async fn seed_teacher(seed: &SeedTeacher, config: &Config, pool: &SqlitePool) -> anyhow::Result<TeacherId> {
    let params = config.auth.password.argon2_params();
    let email = seed.email.trim();

    let mut tx = pool.begin().await?;
    let existing = Teachers::new(&mut tx).get_by_email(email).await?;

    let id = match (existing, seed.password.as_deref()) {
        (Some(teacher), Some(password)) => {
            let password_hash = password::hash_password_blocking(password.to_string(), params).await?;
            Teachers::new(&mut tx).update_password_hash(teacher.id, &password_hash).await?;
            info!(teacher_id = teacher.id, "Updated password of seed teacher");
            teacher.id
        }
        (Some(teacher), None) => {
            debug!(teacher_id = teacher.id, "Seed teacher already exists");
            teacher.id
        }
        (None, Some(password)) => {
            let password_hash = password::hash_password_blocking(password.to_string(), params).await?;
            let teacher = Teachers::new(&mut tx)
                .create(&TeacherCreateDBRequest {
                    name: seed.name.trim().to_string(),
                    email: email.to_string(),
                    password_hash,
                })
                .await?;
            info!(teacher_id = teacher.id, "Created seed teacher");
            teacher.id
        }
        (None, None) => anyhow::bail!("seed_teacher.password is required to create the teacher account {email}"),
    };

    tx.commit().await?;
    Ok(id)
}

fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let allowed = &config.auth.cors.allowed_origins;
    let origins = if allowed.iter().any(|origin| matches!(origin, CorsOrigin::Wildcard)) {
        AllowOrigin::any()
    } else {
        let mut origins = Vec::new();
        for origin in allowed {
            if let CorsOrigin::Url(url) = origin {
                // Url serialises with a trailing slash, browsers send origins without one
                origins.push(url.as_str().trim_end_matches('/').parse::<HeaderValue>()?);
            }
        }
        AllowOrigin::list(origins)
    };

    let mut cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([http::Method::GET, http::Method::POST, http::Method::PUT, http::Method::DELETE])
        .allow_headers([http::header::AUTHORIZATION, http::header::CONTENT_TYPE])
        .allow_credentials(config.auth.cors.allow_credentials);

    if let Some(max_age) = config.auth.cors.max_age {
        cors = cors.max_age(Duration::from_secs(max_age));
    }

    Ok(cors)
}

/// Build the application router with all endpoints and middleware.
///
/// Public routes are the banner at `/`, `/healthz`, `/login` and the API documentation at
/// `/openapi.json` and `/docs`. Everything else requires a session token.
///
/// # Errors
///
/// Returns an error if the CORS configuration is invalid.
#[instrument(skip_all)]
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let api_routes = Router::new()
        .route("/login", post(auth_handlers::login))
        .route("/me", get(auth_handlers::get_me))
        .route("/classes", get(classes::list_classes).post(classes::create_class))
        .route(
            "/classes/{class_id}/students",
            get(classes::list_students).post(classes::create_student),
        )
        .route("/lessons", post(lessons::create_lesson))
        .route("/lessons/{lesson_id}", delete(lessons::delete_lesson))
        .route("/grades", post(grades::create_grade))
        // GET takes a student id, PUT and DELETE a grade id
        .route(
            "/grades/{id}",
            get(grades::list_student_grades).put(grades::update_grade).delete(grades::delete_grade),
        )
        .route("/reports/report-card/{student_id}", get(reports::report_card))
        .route("/reports/attendance/{class_id}", get(reports::attendance_report))
        .route("/reports/content/{class_id}", get(reports::content_report))
        .route("/calendar", get(reports::calendar))
        .with_state(state.clone());

    let router = Router::new()
        .route("/", get(|| async { Json(json!({ "message": "Classbook API is running. POST /login to get started." })) }))
        .route("/healthz", get(|| async { "OK" }))
        .route("/openapi.json", get(|| async { Json(ApiDoc::openapi()) }))
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .merge(api_routes);

    let cors_layer = create_cors_layer(&state.config)?;

    let router = router.layer(cors_layer).layer(
        TraceLayer::new_for_http()
            .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
            .on_request(DefaultOnRequest::new().level(Level::INFO))
            .on_response(DefaultOnResponse::new().level(Level::INFO)),
    );

    Ok(router)
}

/// The assembled service: a migrated database, the seed teacher and the router.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Connect to the configured database and prepare the application
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting classbook with configuration: {:#?}", config);
        let pool = connect_pool(&config.database).await?;
        Self::new_with_pool(config, pool).await
    }

    /// Prepare the application on an existing pool. Migrations run and the seed teacher is
    /// created (or re-keyed) before the router is built.
    pub async fn new_with_pool(config: Config, pool: SqlitePool) -> anyhow::Result<Self> {
        migrator().run(&pool).await?;

        if let Some(seed) = &config.seed_teacher {
            seed_teacher(seed, &config, &pool).await?;
        }

        let app_state = AppState::builder().db(pool.clone()).config(config.clone()).build();
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router.into_make_service()).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Classbook listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
