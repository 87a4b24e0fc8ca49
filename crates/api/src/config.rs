use std::path::PathBuf;

use smuggler_core::scope::ScopeSelector;

use crate::auth::jwt::JwtConfig;

/// Default in-memory threshold for uploaded files (2.5 MiB).
const DEFAULT_UPLOAD_MAX_MEMORY_SIZE: usize = 2_621_440;
/// Default request body limit for the load form (50 MiB).
const DEFAULT_MAX_UPLOAD_BYTES: usize = 52_428_800;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// SQLite database URL (default: `sqlite://smuggler.db`).
    pub database_url: String,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Dump/load behaviour.
    pub fixtures: FixtureSettings,
    /// Superuser to create at startup, if configured.
    pub bootstrap_admin: Option<AdminCredentials>,
}

/// Settings consulted by the dump and load handlers.
///
/// Handlers receive a copy per request through the
/// [`Settings`](crate::extractors::Settings) extractor.
#[derive(Debug, Clone)]
pub struct FixtureSettings {
    /// Server-side directory offered by the load form. `None` hides the
    /// disk actions.
    pub fixture_dir: Option<PathBuf>,
    /// `app` / `app.model` labels left out of an unscoped dump.
    pub exclude_list: Vec<String>,
    /// Spaces per nesting level in dump output; `None` for compact JSON.
    pub indent: Option<usize>,
    /// Uploads larger than this many bytes are spooled to a temporary file.
    pub upload_max_memory_size: usize,
    /// Request body limit for the load form.
    pub max_upload_bytes: usize,
}

impl Default for FixtureSettings {
    fn default() -> Self {
        Self {
            fixture_dir: None,
            exclude_list: Vec::new(),
            indent: None,
            upload_max_memory_size: DEFAULT_UPLOAD_MAX_MEMORY_SIZE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl FixtureSettings {
    /// Load fixture settings from environment variables.
    ///
    /// | Env Var                       | Default     |
    /// |-------------------------------|-------------|
    /// | `SMUGGLER_FIXTURE_DIR`        | unset       |
    /// | `SMUGGLER_EXCLUDE_LIST`       | empty       |
    /// | `SMUGGLER_INDENT`             | unset       |
    /// | `FILE_UPLOAD_MAX_MEMORY_SIZE` | `2621440`   |
    /// | `MAX_UPLOAD_BYTES`            | `52428800`  |
    pub fn from_env() -> Self {
        let fixture_dir = std::env::var("SMUGGLER_FIXTURE_DIR")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);

        let exclude_list: Vec<String> = std::env::var("SMUGGLER_EXCLUDE_LIST")
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let indent: Option<usize> = std::env::var("SMUGGLER_INDENT")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .map(|s| s.trim().parse().expect("SMUGGLER_INDENT must be a valid usize"));

        let upload_max_memory_size: usize = std::env::var("FILE_UPLOAD_MAX_MEMORY_SIZE")
            .unwrap_or_else(|_| DEFAULT_UPLOAD_MAX_MEMORY_SIZE.to_string())
            .parse()
            .expect("FILE_UPLOAD_MAX_MEMORY_SIZE must be a valid usize");

        let max_upload_bytes: usize = std::env::var("MAX_UPLOAD_BYTES")
            .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
            .parse()
            .expect("MAX_UPLOAD_BYTES must be a valid usize");

        Self {
            fixture_dir,
            exclude_list,
            indent,
            upload_max_memory_size,
            max_upload_bytes,
        }
    }

    /// The exclude list parsed into selectors.
    pub fn exclude_selectors(&self) -> Vec<ScopeSelector> {
        self.exclude_list
            .iter()
            .filter_map(|label| ScopeSelector::parse(label))
            .collect()
    }
}

/// Credentials for the superuser created at startup.
#[derive(Clone)]
pub struct AdminCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for AdminCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                   | Default                    |
    /// |---------------------------|----------------------------|
    /// | `HOST`                    | `0.0.0.0`                  |
    /// | `PORT`                    | `3000`                     |
    /// | `CORS_ORIGINS`            | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS`    | `30`                       |
    /// | `DATABASE_URL`            | `sqlite://smuggler.db`     |
    /// | `SMUGGLER_ADMIN_USERNAME` | unset                      |
    /// | `SMUGGLER_ADMIN_PASSWORD` | unset                      |
    ///
    /// See [`JwtConfig::from_env`] and [`FixtureSettings::from_env`] for the
    /// rest.
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let database_url =
            std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://smuggler.db".into());

        let bootstrap_admin = match (
            std::env::var("SMUGGLER_ADMIN_USERNAME"),
            std::env::var("SMUGGLER_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) if !username.is_empty() => {
                Some(AdminCredentials { username, password })
            }
            _ => None,
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            database_url,
            jwt: JwtConfig::from_env(),
            fixtures: FixtureSettings::from_env(),
            bootstrap_admin,
        }
    }
}
