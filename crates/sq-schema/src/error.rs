//! Error types for sq-schema

use sq_driver::DriverError;
use thiserror::Error;

/// Schema-definition errors
#[derive(Error, Debug)]
pub enum SchemaError {
    /// A declarative definition cannot be compiled (S001)
    #[error("[S001] Invalid {kind} definition '{name}': {reason}")]
    InvalidDefinition {
        kind: &'static str,
        name: String,
        reason: String,
    },

    /// The backing driver rejected a statement (S002)
    #[error("[S002] Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl SchemaError {
    pub(crate) fn invalid(kind: &'static str, name: &str, reason: impl Into<String>) -> Self {
        SchemaError::InvalidDefinition {
            kind,
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for SchemaError
pub type SchemaResult<T> = Result<T, SchemaError>;
