//! Database request and response records.
//!
//! Each submodule holds the `*DBRequest` structs that repositories accept and the
//! `*DBResponse` structs they return. API models convert to and from these.

pub mod classes;
pub mod grades;
pub mod lessons;
pub mod reports;
pub mod students;
pub mod teachers;
