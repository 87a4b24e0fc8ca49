//! Admin index and per-application pages.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use smuggler_core::error::CoreError;

use crate::error::{AppError, AppResult};
use crate::flash::{render_page, PendingMessages};
use crate::middleware::rbac::RequireStaff;
use crate::state::AppState;
use crate::templates::{self, AppContext};

/// GET /admin/
pub async fn index(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    PendingMessages(messages): PendingMessages,
) -> AppResult<Response> {
    let consumed = !messages.is_empty();
    let mut ctx = templates::page_context("Site administration", messages);
    ctx.insert("apps", &templates::app_list(&state.registry));
    render_page(&state, StatusCode::OK, templates::ADMIN_INDEX, &ctx, consumed)
}

/// GET /admin/{app_label}/
///
/// 404 for labels that are not registered.
pub async fn app_index(
    State(state): State<AppState>,
    RequireStaff(_user): RequireStaff,
    PendingMessages(messages): PendingMessages,
    Path(app_label): Path<String>,
) -> AppResult<Response> {
    let app = state
        .registry
        .find_app(&app_label)
        .ok_or_else(|| AppError::Core(CoreError::UnknownApplication(app_label.clone())))?;

    let consumed = !messages.is_empty();
    let app = AppContext::from(app);
    let title = format!("{} administration", app.name);
    let mut ctx = templates::page_context(&title, messages);
    ctx.insert("app", &app);
    render_page(&state, StatusCode::OK, templates::APP_INDEX, &ctx, consumed)
}
