use std::sync::Arc;

use smuggler_core::clock::Clock;
use smuggler_core::messages::FlashCodec;
use smuggler_core::registry::ModelRegistry;

use crate::config::ServerConfig;
use crate::templates;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: smuggler_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Applications and models that can be dumped and loaded.
    pub registry: Arc<ModelRegistry>,
    /// Time source for dump filenames.
    pub clock: Arc<dyn Clock>,
    /// Compiled page templates.
    pub templates: Arc<tera::Tera>,
    /// Signs the flash messages cookie.
    pub flash: FlashCodec,
}

impl AppState {
    /// Assemble the state, compiling the page templates.
    pub fn new(
        pool: smuggler_db::DbPool,
        config: ServerConfig,
        registry: ModelRegistry,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, tera::Error> {
        let flash = FlashCodec::new(&config.jwt.secret);
        Ok(Self {
            pool,
            config: Arc::new(config),
            registry: Arc::new(registry),
            clock,
            templates: Arc::new(templates::build()?),
            flash,
        })
    }
}
