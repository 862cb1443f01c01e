//! API models for authentication.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::teachers::TeacherResponse;

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "ana@x.com")]
    pub email: String,
    #[schema(example = "pw123")]
    pub password: String,
}

/// Successful login: a bearer token and the teacher it belongs to
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginResponse {
    /// HS256 JWT to send as `Authorization: Bearer <token>`
    pub token: String,
    pub teacher: TeacherResponse,
}
