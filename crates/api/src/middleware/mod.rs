//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the authenticated user from a JWT
//!   (Bearer header or `access_token` cookie).
//! - [`rbac::RequireStaff`] -- Requires the `staff` or `superuser` role.

pub mod auth;
pub mod rbac;
