//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`extractors`]**: JSON and path extractors that reject with the standard error body
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/login`, `/me`)
//! - **Classes** (`/classes`, `/classes/{id}/students`)
//! - **Lessons** (`/lessons`)
//! - **Grades** (`/grades`)
//! - **Reports** (`/reports/*`, `/calendar`)
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with `utoipa` annotations. The document is served at
//! `/openapi.json` and rendered at `/docs`.

pub mod extractors;
pub mod handlers;
pub mod models;
