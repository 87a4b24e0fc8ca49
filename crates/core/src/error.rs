#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown application: {0}")]
    UnknownApplication(String),

    #[error("Unknown model: {app_label}.{model}")]
    UnknownModel { app_label: String, model: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),
}
