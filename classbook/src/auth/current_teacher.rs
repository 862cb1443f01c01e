//! Extractor for the authenticated teacher.

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

use crate::{
    AppState,
    api::models::teachers::CurrentTeacher,
    auth::session,
    errors::{Error, Result},
};

/// Pull the bearer token out of the `Authorization` header.
fn bearer_token(parts: &Parts) -> Result<&str> {
    let header = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::Unauthenticated { message: None })?;

    let value = header.to_str().map_err(|_| Error::Unauthenticated {
        message: Some("Invalid authorization header".to_string()),
    })?;

    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Expected a Bearer token".to_string()),
        })
}

/// Rejects the request with 401 before the handler body runs, so protected
/// handlers never mutate anything for unauthenticated callers.
impl FromRequestParts<AppState> for CurrentTeacher {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = bearer_token(parts)?;
        let teacher = session::verify_session_token(token, &state.config)?;
        trace!("Authenticated teacher {}", teacher.id);
        Ok(teacher)
    }
}
