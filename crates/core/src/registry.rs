//! Application/model registry.
//!
//! The registry is the service's view of the database schema: which
//! applications exist, which models each application owns, and how a model
//! maps onto a table and its typed columns. Dumps and loads never touch a
//! table or column that is not declared here.

use serde::Serialize;

use crate::error::CoreError;
use crate::scope::ScopeSelector;

/// Storage type of a single model field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Integer,
    Float,
    Boolean,
    Text,
    /// ISO-8601 timestamp stored as text.
    DateTime,
}

/// A column of a model's table.
#[derive(Debug, Clone, Serialize)]
pub struct FieldMeta {
    pub name: String,
    pub kind: FieldKind,
}

/// A model: one table, one integer primary key, an ordered set of fields.
#[derive(Debug, Clone, Serialize)]
pub struct ModelMeta {
    pub app_label: String,
    /// Lowercase model name (`"user"`, `"site"`).
    pub name: String,
    pub table: String,
    pub pk_column: String,
    pub fields: Vec<FieldMeta>,
}

impl ModelMeta {
    pub fn new(app_label: impl Into<String>, name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            app_label: app_label.into(),
            name: name.into().to_lowercase(),
            table: table.into(),
            pk_column: "id".to_string(),
            fields: Vec::new(),
        }
    }

    pub fn with_pk(mut self, column: impl Into<String>) -> Self {
        self.pk_column = column.into();
        self
    }

    pub fn field(mut self, name: impl Into<String>, kind: FieldKind) -> Self {
        self.fields.push(FieldMeta {
            name: name.into(),
            kind,
        });
        self
    }

    /// The `"<app_label>.<model>"` identifier used in fixtures.
    pub fn identifier(&self) -> String {
        format!("{}.{}", self.app_label, self.name)
    }

    pub fn find_field(&self, name: &str) -> Option<&FieldMeta> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// An application and the models it owns.
#[derive(Debug, Clone, Serialize)]
pub struct AppMeta {
    pub label: String,
    pub verbose_name: String,
    pub models: Vec<ModelMeta>,
}

impl AppMeta {
    pub fn new(label: impl Into<String>, verbose_name: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            verbose_name: verbose_name.into(),
            models: Vec::new(),
        }
    }

    /// Add a model; its `app_label` is forced to this application's label.
    pub fn model(mut self, mut model: ModelMeta) -> Self {
        model.app_label = self.label.clone();
        self.models.push(model);
        self
    }

    pub fn find_model(&self, name: &str) -> Option<&ModelMeta> {
        self.models.iter().find(|m| m.name.eq_ignore_ascii_case(name))
    }
}

/// Ordered collection of applications.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ModelRegistry {
    apps: Vec<AppMeta>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, app: AppMeta) -> Self {
        self.apps.push(app);
        self
    }

    pub fn apps(&self) -> &[AppMeta] {
        &self.apps
    }

    pub fn find_app(&self, label: &str) -> Option<&AppMeta> {
        self.apps.iter().find(|a| a.label == label)
    }

    /// Look up a model by its fixture identifier (`"app.model"`, model part
    /// case-insensitive).
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&ModelMeta> {
        let (app_label, model) = identifier.split_once('.')?;
        self.find_app(app_label)?.find_model(model)
    }

    /// Every registered model, in registry order.
    pub fn all_models(&self) -> impl Iterator<Item = &ModelMeta> {
        self.apps.iter().flat_map(|a| a.models.iter())
    }

    /// Resolve a list of selectors into the models they cover.
    ///
    /// The result follows registry order and holds each model once, however
    /// many selectors name it. An empty list means every model.
    pub fn resolve(&self, selectors: &[ScopeSelector]) -> Result<Vec<&ModelMeta>, CoreError> {
        if selectors.is_empty() {
            return Ok(self.all_models().collect());
        }

        let mut wanted: Vec<&ModelMeta> = Vec::new();
        for selector in selectors {
            match selector {
                ScopeSelector::All => wanted.extend(self.all_models()),
                ScopeSelector::App(label) => {
                    let app = self
                        .find_app(label)
                        .ok_or_else(|| CoreError::UnknownApplication(label.clone()))?;
                    wanted.extend(app.models.iter());
                }
                ScopeSelector::Model { app_label, model } => {
                    let app = self
                        .find_app(app_label)
                        .ok_or_else(|| CoreError::UnknownApplication(app_label.clone()))?;
                    let found = app.find_model(model).ok_or_else(|| CoreError::UnknownModel {
                        app_label: app_label.clone(),
                        model: model.clone(),
                    })?;
                    wanted.push(found);
                }
            }
        }

        Ok(self
            .all_models()
            .filter(|m| wanted.iter().any(|w| std::ptr::eq(*w, *m)))
            .collect())
    }

    /// Resolve every model except those matched by `exclude`.
    ///
    /// Exclude entries are `app` or `app.model` labels; entries naming
    /// nothing registered are ignored.
    pub fn resolve_excluding(&self, exclude: &[ScopeSelector]) -> Vec<&ModelMeta> {
        self.all_models()
            .filter(|m| !exclude.iter().any(|sel| sel.covers(m)))
            .collect()
    }
}
