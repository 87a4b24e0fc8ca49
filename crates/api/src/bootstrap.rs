//! Startup provisioning.

use smuggler_core::error::CoreError;
use smuggler_db::models::user::CreateUser;
use smuggler_db::repositories::UserRepo;
use smuggler_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::AdminCredentials;
use crate::error::{AppError, AppResult};

/// Create the configured superuser unless a user with that name exists.
///
/// Returns whether a user was created.
pub async fn ensure_superuser(pool: &DbPool, creds: &AdminCredentials) -> AppResult<bool> {
    if UserRepo::find_by_username(pool, &creds.username)
        .await?
        .is_some()
    {
        tracing::debug!(username = %creds.username, "Superuser already present");
        return Ok(false);
    }

    validate_password_strength(&creds.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| AppError::Core(CoreError::Validation(msg)))?;

    let password_hash = hash_password(&creds.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            username: creds.username.clone(),
            email: String::new(),
            password_hash,
            is_staff: true,
            is_superuser: true,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "Created superuser");
    Ok(true)
}
