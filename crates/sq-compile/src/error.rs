//! Error types for sq-compile

use crate::migration::MigrationError;
use sq_core::CoreError;
use sq_driver::DriverError;
use sq_jinja::JinjaError;
use thiserror::Error;

/// Loading and compilation errors
#[derive(Error, Debug)]
pub enum CompileError {
    /// Discovery, config or IO failure from sq-core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// D005: No loader handles this extension
    #[error("[D005] No migration loader registered for '.{extension}' files: {path}")]
    UnsupportedExtension { extension: String, path: String },

    /// D006: Module has no up procedure
    #[error("[D006] Migration '{path}' has no up procedure")]
    MissingUp { path: String },

    /// D007: Module source could not be parsed
    #[error("[D007] Failed to load migration '{path}': {message}")]
    InvalidModule { path: String, message: String },

    /// D008: SQL template does not parse
    #[error("[D008] Template error in '{path}': {source}")]
    Template {
        path: String,
        #[source]
        source: JinjaError,
    },

    /// C001: A migration failed while its statements were being captured
    #[error("[C001] Migration '{module}' ({folder}) failed during capture: {source}")]
    Capture {
        module: String,
        folder: String,
        #[source]
        source: MigrationError,
    },

    /// C002: Driver lifecycle call failed
    #[error("[C002] Driver error: {0}")]
    Driver(#[from] DriverError),
}

impl CompileError {
    /// Whether this error happened while reading the migration tree.
    pub fn is_discovery(&self) -> bool {
        match self {
            CompileError::Core(core) => core.is_discovery(),
            CompileError::UnsupportedExtension { .. }
            | CompileError::MissingUp { .. }
            | CompileError::InvalidModule { .. }
            | CompileError::Template { .. } => true,
            CompileError::Capture { .. } | CompileError::Driver(_) => false,
        }
    }
}

/// Result type alias for CompileError
pub type CompileResult<T> = Result<T, CompileError>;
