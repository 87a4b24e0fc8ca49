//! The registry describing the tables created by `migrations/`.
//!
//! Keep this in step with the migrations: a table missing here cannot be
//! dumped or loaded, and a column missing here is silently left out of
//! dumps.

use smuggler_core::registry::{AppMeta, FieldKind, ModelMeta, ModelRegistry};

/// Registry of every application shipped with the service.
pub fn builtin_registry() -> ModelRegistry {
    ModelRegistry::new()
        .register(
            AppMeta::new("auth", "Authentication and Authorization")
                .model(
                    ModelMeta::new("auth", "user", "auth_user")
                        .field("username", FieldKind::Text)
                        .field("email", FieldKind::Text)
                        .field("password", FieldKind::Text)
                        .field("is_staff", FieldKind::Boolean)
                        .field("is_superuser", FieldKind::Boolean)
                        .field("is_active", FieldKind::Boolean)
                        .field("date_joined", FieldKind::DateTime)
                        .field("last_login", FieldKind::DateTime),
                )
                .model(ModelMeta::new("auth", "group", "auth_group").field("name", FieldKind::Text)),
        )
        .register(
            AppMeta::new("sites", "Sites").model(
                ModelMeta::new("sites", "site", "sites_site")
                    .field("domain", FieldKind::Text)
                    .field("name", FieldKind::Text),
            ),
        )
        .register(
            AppMeta::new("pages", "Pages").model(
                ModelMeta::new("pages", "page", "pages_page")
                    .field("title", FieldKind::Text)
                    .field("path", FieldKind::Text)
                    .field("body", FieldKind::Text)
                    .field("published", FieldKind::Boolean)
                    .field("rating", FieldKind::Float)
                    .field("created_at", FieldKind::DateTime),
            ),
        )
}
