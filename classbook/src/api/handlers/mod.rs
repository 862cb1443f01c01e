//! HTTP request handlers for all API endpoints.
//!
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication (via the [`CurrentTeacher`](crate::api::models::teachers::CurrentTeacher) extractor)
//!   and ownership checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: Login and the current teacher
//! - [`classes`]: Classes and their students
//! - [`lessons`]: Lessons with attendance
//! - [`grades`]: Grades and final averages
//! - [`reports`]: Report card, attendance and content history, calendar
//!
//! # Ownership
//!
//! Resources belonging to another teacher are reported as not found. The only exception
//! is a `class_id` inside a create body, which is rejected as a validation error.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which converts to an HTTP status code and a
//! `{code, message}` JSON body.

pub mod auth;
pub mod classes;
pub mod grades;
pub mod lessons;
pub mod reports;
