//! Request-scoped extractors.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::config::FixtureSettings;
use crate::state::AppState;

/// The fixture settings in force for this request.
///
/// Handlers take their settings from here rather than reaching into global
/// configuration, so each app instance (and each test) carries its own.
#[derive(Debug, Clone)]
pub struct Settings(pub FixtureSettings);

impl FromRequestParts<AppState> for Settings {
    type Rejection = Infallible;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Settings(state.config.fixtures.clone()))
    }
}
