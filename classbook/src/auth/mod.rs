//! Authentication for teachers.
//!
//! Teachers log in with email and password at `POST /login` and receive a stateless HS256
//! JWT. Every protected route takes a [`CurrentTeacher`](crate::api::models::teachers::CurrentTeacher)
//! argument, whose extractor validates the `Authorization: Bearer <token>` header and rejects
//! the request with 401 before the handler runs.
//!
//! # Modules
//!
//! - [`current_teacher`]: `FromRequestParts` extractor for the authenticated teacher
//! - [`password`]: Argon2id password hashing and verification
//! - [`session`]: JWT creation and verification

pub mod current_teacher;
pub mod password;
pub mod session;
