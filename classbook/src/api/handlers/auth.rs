//! Login and session endpoints.

use axum::extract::State;

use crate::{
    AppState,
    api::extractors::Json,
    api::models::{
        auth::{LoginRequest, LoginResponse},
        teachers::{CurrentTeacher, TeacherResponse},
    },
    auth::{password, session},
    db::handlers::Teachers,
    errors::{Error, Result},
};

/// Exchange email and password for a session token.
///
/// Unknown emails and wrong passwords produce the same error.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    tag = "authentication",
    summary = "Log in",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials", body = crate::errors::ErrorBody),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>> {
    let mut pool_conn = state.db.acquire().await?;

    let teacher = Teachers::new(&mut pool_conn)
        .get_by_email(request.email.trim())
        .await?
        .ok_or(Error::InvalidCredentials)?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let is_valid = password::verify_password_blocking(request.password, teacher.password_hash.clone()).await?;
    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let teacher = TeacherResponse::from(teacher);
    let current_teacher: CurrentTeacher = teacher.clone().into();
    let token = session::create_session_token(&current_teacher, &state.config)?;
    tracing::info!(teacher_id = teacher.id, "Teacher logged in");

    Ok(Json(LoginResponse { token, teacher }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "authentication",
    summary = "Get the authenticated teacher",
    responses(
        (status = 200, description = "Current teacher", body = TeacherResponse),
        (status = 401, description = "Unauthorized", body = crate::errors::ErrorBody),
    ),
    security(("BearerAuth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_me(State(state): State<AppState>, current_teacher: CurrentTeacher) -> Result<Json<TeacherResponse>> {
    let mut pool_conn = state.db.acquire().await?;

    // Tokens outlive deleted accounts
    let teacher = Teachers::new(&mut pool_conn)
        .get_by_id(current_teacher.id)
        .await?
        .ok_or(Error::Unauthenticated { message: None })?;

    Ok(Json(teacher.into()))
}
