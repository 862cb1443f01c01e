//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with SQLite.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries & transactions)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   SQLite    │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations
//! - [`models`]: Database request/response records
//! - [`errors`]: Database-specific error types
//!
//! ## Example Usage
//!
//! ```ignore
//! use classbook::db::handlers::{Classes, Repository, classes::ClassFilter};
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     let mut conn = pool.acquire().await?;
//!     let classes = Classes::new(&mut conn).list(&ClassFilter::new(teacher_id)).await?;
//!     println!("{} classes", classes.len());
//!     Ok(())
//! }
//! ```
//!
//! # Schema
//!
//! The schema lives in `migrations/` and is applied at startup with [`crate::migrator`].
//! Foreign keys are enforced on every connection; deleting a lesson cascades to its attendance.

pub mod errors;
pub mod handlers;
pub mod models;
