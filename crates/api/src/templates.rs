//! HTML templates for the admin pages, compiled into the binary.

use serde::Serialize;
use smuggler_core::messages::Message;
use smuggler_core::registry::{AppMeta, ModelRegistry};
use tera::Tera;

pub const ADMIN_INDEX: &str = "admin_index.html";
pub const APP_INDEX: &str = "app_index.html";
pub const LOAD_DATA_FORM: &str = "load_data_form.html";

/// Compile every page template.
pub fn build() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("base.html", include_str!("../templates/base.html")),
        (ADMIN_INDEX, include_str!("../templates/admin_index.html")),
        (APP_INDEX, include_str!("../templates/app_index.html")),
        (LOAD_DATA_FORM, include_str!("../templates/load_data_form.html")),
    ])?;
    Ok(tera)
}

/// Flash message as the templates see it.
#[derive(Debug, Serialize)]
pub struct MessageContext {
    pub tags: &'static str,
    pub text: String,
}

impl From<Message> for MessageContext {
    fn from(message: Message) -> Self {
        Self {
            tags: message.level.as_str(),
            text: message.text,
        }
    }
}

/// One registered application with its model links.
#[derive(Debug, Serialize)]
pub struct AppContext {
    pub label: String,
    pub name: String,
    pub url: String,
    pub dump_url: String,
    pub models: Vec<ModelContext>,
}

#[derive(Debug, Serialize)]
pub struct ModelContext {
    pub name: String,
    pub identifier: String,
    pub dump_url: String,
}

impl From<&AppMeta> for AppContext {
    fn from(app: &AppMeta) -> Self {
        Self {
            label: app.label.clone(),
            name: app.verbose_name.clone(),
            url: format!("/admin/{}/", app.label),
            dump_url: format!("/admin/dump-data/{}/", app.label),
            models: app
                .models
                .iter()
                .map(|m| ModelContext {
                    name: m.name.clone(),
                    identifier: m.identifier(),
                    dump_url: format!("/admin/dump-data/{}/{}/", app.label, m.name),
                })
                .collect(),
        }
    }
}

/// Every registered application, in registry order.
pub fn app_list(registry: &ModelRegistry) -> Vec<AppContext> {
    registry.apps().iter().map(AppContext::from).collect()
}

/// Base context shared by every page.
pub fn page_context(title: &str, messages: Vec<Message>) -> tera::Context {
    let mut ctx = tera::Context::new();
    ctx.insert("title", title);
    ctx.insert(
        "messages",
        &messages.into_iter().map(MessageContext::from).collect::<Vec<_>>(),
    );
    ctx
}
