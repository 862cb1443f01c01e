//! API request/response models.
//!
//! These are the JSON shapes exchanged with clients. Every field is snake_case and every
//! type derives `ToSchema` so it appears in the OpenAPI document.

pub mod auth;
pub mod classes;
pub mod grades;
pub mod lessons;
pub mod reports;
pub mod students;
pub mod teachers;
