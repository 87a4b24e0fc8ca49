//! Role-based access control extractors.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use smuggler_core::error::CoreError;
use smuggler_core::roles::is_staff_role;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a staff or superuser role. Rejects with 403 Forbidden otherwise.
///
/// ```ignore
/// async fn dump(RequireStaff(user): RequireStaff) -> Response {
///     // user may read and write fixtures here
/// }
/// ```
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !is_staff_role(&user.role) {
            return Err(AppError::Core(CoreError::Forbidden(
                "Staff role required".into(),
            )));
        }
        Ok(RequireStaff(user))
    }
}
