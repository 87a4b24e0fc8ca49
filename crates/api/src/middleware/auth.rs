//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use smuggler_core::error::CoreError;
use smuggler_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::cookies::read_cookie;
use crate::error::AppError;
use crate::state::AppState;

/// Cookie carrying the access token for browser sessions.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

/// Authenticated user extracted from a JWT.
///
/// The token is taken from `Authorization: Bearer <token>` when present,
/// otherwise from the [`ACCESS_TOKEN_COOKIE`] cookie.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// The user's `auth_user.id` (from `claims.sub`).
    pub user_id: DbId,
    pub username: String,
    /// The user's role name (`"superuser"`, `"staff"` or `"user"`).
    pub role: String,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = match parts.headers.get(AUTHORIZATION) {
            Some(header) => header
                .to_str()
                .ok()
                .and_then(|v| v.strip_prefix("Bearer "))
                .map(str::to_string)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Unauthorized(
                        "Invalid Authorization format. Expected: Bearer <token>".into(),
                    ))
                })?,
            None => read_cookie(&parts.headers, ACCESS_TOKEN_COOKIE).ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Authentication credentials were not provided".into(),
                ))
            })?,
        };

        let claims = validate_token(&token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        Ok(AuthUser {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        })
    }
}
