//! Error types for sq-release

use sq_compile::CompileError;
use sq_core::{CoreError, SemVer};
use thiserror::Error;

/// Release errors
#[derive(Error, Debug)]
pub enum ReleaseError {
    /// R001: No modules were added since the baseline release
    #[error("[R001] Nothing to release: no new migrations since {version}")]
    NothingToRelease { version: SemVer },

    /// R002: Artifact for the target version already exists
    #[error("[R002] Release {version} already exists at {path}; use --overwrite to replace it")]
    Conflict { version: SemVer, path: String },

    /// R003: Writing the release outputs failed; nothing was changed
    #[error("[R003] Failed to publish '{path}': {source}")]
    Publish {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// R004: A new folder-qualified module shares its stem with a released bare name
    #[error("[R004] Migration '{name}' reuses the released name '{stem}'; give the file a unique name")]
    AmbiguousName { name: String, stem: String },

    /// Config, control file or artifact failure from sq-core
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Discovery or capture failure
    #[error(transparent)]
    Compile(#[from] CompileError),
}

impl ReleaseError {
    /// Whether this is the user-facing "nothing to do" condition
    pub fn is_nothing_to_release(&self) -> bool {
        matches!(self, ReleaseError::NothingToRelease { .. })
    }
}

/// Result type alias for ReleaseError
pub type ReleaseResult<T> = Result<T, ReleaseError>;
