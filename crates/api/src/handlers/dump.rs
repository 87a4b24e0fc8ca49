//! Dump endpoints: serialize registered models as a downloadable fixture.
//!
//! Every failure (unknown scope, database error) is reported as an error
//! flash message followed by a redirect back to the admin page the dump was
//! started from.

use axum::extract::{Path, Query, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use smuggler_core::fixture;
use smuggler_core::messages::Message;
use smuggler_core::registry::ModelMeta;
use smuggler_core::scope::{dump_filename, ScopeSelector};

use crate::config::FixtureSettings;
use crate::extractors::Settings;
use crate::flash::redirect_with_messages;
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;

/// Prefix of every dump failure message.
pub const DUMP_ERROR_PREFIX: &str = "An exception occurred while dumping data: ";

/// Query string for `GET /admin/dump-data/`.
#[derive(Debug, Deserialize)]
pub struct DumpQuery {
    /// Comma-separated `app` / `app.model` labels.
    pub app_label: Option<String>,
}

/// GET /admin/dump-data/[?app_label=a,b.c]
///
/// Without `app_label`, dumps every model not named in the exclude list.
pub async fn dump_all(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Settings(settings): Settings,
    Query(query): Query<DumpQuery>,
) -> Response {
    let labels = query.app_label.as_deref().unwrap_or("").trim();
    let models = if labels.is_empty() {
        Ok(state
            .registry
            .resolve_excluding(&settings.exclude_selectors()))
    } else {
        state.registry.resolve(&ScopeSelector::parse_list(labels))
    };

    tracing::info!(user_id = user.user_id, scope = labels, "Dumping data");
    respond(&state, &settings, &ScopeSelector::All, models.map_err(|e| e.to_string())).await
}

/// GET /admin/dump-data/{app_label}/
pub async fn dump_app(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Settings(settings): Settings,
    Path(app_label): Path<String>,
) -> Response {
    let scope = ScopeSelector::App(app_label);
    tracing::info!(user_id = user.user_id, scope = ?scope, "Dumping data");
    let models = state
        .registry
        .resolve(std::slice::from_ref(&scope))
        .map_err(|e| e.to_string());
    respond(&state, &settings, &scope, models).await
}

/// GET /admin/dump-data/{app_label}/{model_label}/
pub async fn dump_model(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Settings(settings): Settings,
    Path((app_label, model_label)): Path<(String, String)>,
) -> Response {
    let scope = ScopeSelector::Model {
        app_label,
        model: model_label,
    };
    tracing::info!(user_id = user.user_id, scope = ?scope, "Dumping data");
    let models = state
        .registry
        .resolve(std::slice::from_ref(&scope))
        .map_err(|e| e.to_string());
    respond(&state, &settings, &scope, models).await
}

/// Run the dump and build the attachment, or the error redirect.
async fn respond(
    state: &AppState,
    settings: &FixtureSettings,
    scope: &ScopeSelector,
    models: Result<Vec<&ModelMeta>, String>,
) -> Response {
    match dump(state, settings, models).await {
        Ok(body) => {
            let filename = dump_filename(scope, state.clock.now());
            (
                [
                    (CONTENT_TYPE, "application/json".to_string()),
                    (CONTENT_DISPOSITION, format!("attachment; filename={filename}")),
                ],
                body,
            )
                .into_response()
        }
        Err(msg) => {
            tracing::warn!(scope = ?scope, error = %msg, "Dump failed");
            let location = match scope.app_label() {
                Some(label) => format!("/admin/{label}/"),
                None => "/admin/".to_string(),
            };
            redirect_with_messages(
                state,
                &location,
                &[Message::error(format!("{DUMP_ERROR_PREFIX}{msg}"))],
            )
        }
    }
}

async fn dump(
    state: &AppState,
    settings: &FixtureSettings,
    models: Result<Vec<&ModelMeta>, String>,
) -> Result<Vec<u8>, String> {
    let models = models?;
    let records = smuggler_db::fixtures::dump_models(&state.pool, &models)
        .await
        .map_err(|e| e.to_string())?;
    tracing::debug!(models = models.len(), records = records.len(), "Dump complete");
    fixture::to_bytes(&records, settings.indent).map_err(|e| e.to_string())
}
