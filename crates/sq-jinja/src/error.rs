//! Error types for sq-jinja

use thiserror::Error;

/// Jinja templating errors
#[derive(Error, Debug)]
pub enum JinjaError {
    /// Template render error (J001)
    #[error("[J001] Jinja render error: {0}")]
    RenderError(String),

    /// Unknown variable (J002)
    #[error("[J002] Undefined variable: {detail}. Define it in the vars: section of squashpack.yml")]
    UnknownVariable { detail: String },

    /// Template does not parse (J003)
    #[error("[J003] Jinja syntax error: {0}")]
    SyntaxError(String),
}

/// Result type alias for JinjaError
pub type JinjaResult<T> = Result<T, JinjaError>;

impl From<minijinja::Error> for JinjaError {
    fn from(err: minijinja::Error) -> Self {
        match err.kind() {
            minijinja::ErrorKind::SyntaxError => JinjaError::SyntaxError(err.to_string()),
            minijinja::ErrorKind::UndefinedError => JinjaError::UnknownVariable {
                detail: err.detail().unwrap_or("value is undefined").to_string(),
            },
            _ => JinjaError::RenderError(err.to_string()),
        }
    }
}
