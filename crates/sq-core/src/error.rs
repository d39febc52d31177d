//! Error types for sq-core

use thiserror::Error;

/// Core error type for Squashpack
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Project directory not found
    #[error("[E004] Project directory not found: {path}")]
    ProjectNotFound { path: String },

    /// D001: Migrations root does not exist
    #[error("[D001] Migrations directory not found: {path}")]
    MigrationsNotFound { path: String },

    /// D002: A directory in the migration tree could not be listed
    #[error("[D002] Failed to read migration directory '{path}': {source}")]
    DirectoryUnreadable {
        path: String,
        source: std::io::Error,
    },

    /// D003: Two files in one version folder resolve to the same module name
    #[error("[D003] Duplicate migration '{name}' in {folder}: {first} and {second}")]
    DuplicateMigration {
        name: String,
        folder: String,
        first: String,
        second: String,
    },

    /// D004: File name is not valid UTF-8 or has an empty stem
    #[error("[D004] Invalid migration file name: {path}")]
    InvalidMigrationName { path: String },

    /// V001: String is not a semantic version
    #[error("[V001] Invalid version '{value}': {reason}")]
    InvalidVersion { value: String, reason: String },

    /// F001: Control file has no recognizable default_version entry
    #[error("[F001] Control file '{path}' has no recognizable default_version: {reason}")]
    ControlFormat { path: String, reason: String },

    /// A001: Release artifact could not be decoded
    #[error("[A001] Invalid release artifact '{path}': {source}")]
    ArtifactParse {
        path: String,
        source: serde_json::Error,
    },

    /// E014: IO error
    #[error("[E014] IO error: {0}")]
    Io(#[from] std::io::Error),

    /// E016: IO error with file path context
    #[error("[E016] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E015: YAML parse error
    #[error("[E015] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoreError {
    /// Whether this error belongs to the discovery category (`D0xx`).
    pub fn is_discovery(&self) -> bool {
        matches!(
            self,
            CoreError::MigrationsNotFound { .. }
                | CoreError::DirectoryUnreadable { .. }
                | CoreError::DuplicateMigration { .. }
                | CoreError::InvalidMigrationName { .. }
        )
    }
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;
