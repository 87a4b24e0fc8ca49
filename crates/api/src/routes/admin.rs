//! Route definitions for the `/admin` pages.

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{admin, auth, dump, load};
use crate::state::AppState;

/// Admin routes.
///
/// ```text
/// POST /admin/login                                   login (public)
/// GET  /admin/                                        index
/// GET  /admin/dump-data/[?app_label=...]              dump all / listed scopes
/// GET  /admin/dump-data/{app_label}/                  dump one application
/// GET  /admin/dump-data/{app_label}/{model_label}/    dump one model
/// GET  /admin/load-data/                              load form
/// POST /admin/load-data/                              load submission
/// GET  /admin/{app_label}/                            application page
/// ```
///
/// The load form accepts request bodies up to `max_upload_bytes`.
pub fn router(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/admin/login", post(auth::login))
        .route("/admin/", get(admin::index))
        .route("/admin/dump-data/", get(dump::dump_all))
        .route("/admin/dump-data/{app_label}/", get(dump::dump_app))
        .route(
            "/admin/dump-data/{app_label}/{model_label}/",
            get(dump::dump_model),
        )
        .route(
            "/admin/load-data/",
            get(load::load_form)
                .post(load::load_submit)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/admin/{app_label}/", get(admin::app_index))
}
