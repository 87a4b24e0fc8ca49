//! Handler for `POST /admin/login`.

use axum::extract::State;
use axum::http::header::SET_COOKIE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use smuggler_core::error::CoreError;
use smuggler_core::roles::{is_staff_role, role_for};
use smuggler_db::models::user::UserResponse;
use smuggler_db::repositories::UserRepo;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::verify_password;
use crate::cookies::set_cookie;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::ACCESS_TOKEN_COOKIE;
use crate::state::AppState;

/// Request body for `POST /admin/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

/// POST /admin/login
///
/// Authenticate a staff user with username + password. Returns an access
/// token and also sets it as an HTTP-only cookie for the HTML pages.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Response> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid username or password".into(),
        ))
    };

    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(invalid)?;

    let password_valid = verify_password(&input.password, &user.password)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::warn!(username = %input.username, "Failed login attempt");
        return Err(invalid());
    }

    if !user.is_active {
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    let role = role_for(user.is_staff, user.is_superuser);
    if !is_staff_role(role) {
        return Err(AppError::Core(CoreError::Forbidden(
            "Staff account required".into(),
        )));
    }

    UserRepo::record_login(&state.pool, user.id).await?;

    let access_token = generate_access_token(user.id, &user.username, role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    let expires_in = state.config.jwt.expires_in();

    tracing::info!(user_id = user.id, role, "User logged in");

    let cookie = set_cookie(ACCESS_TOKEN_COOKIE, &access_token, Some(expires_in));
    let mut response = Json(AuthResponse {
        access_token,
        expires_in,
        user: UserResponse {
            id: user.id,
            username: user.username,
            email: user.email,
            role: role.to_string(),
        },
    })
    .into_response();
    if let Some(cookie) = cookie {
        response.headers_mut().append(SET_COOKIE, cookie);
    }
    Ok(response)
}
