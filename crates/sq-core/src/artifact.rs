//! Release artifacts: `<versions>/<version>.json` plus the `latest.json` pointer.

use crate::error::{CoreError, CoreResult};
use crate::migration_name::MigrationName;
use crate::semver::SemVer;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File name of the pointer that mirrors the most recent release.
pub const LATEST_FILE_NAME: &str = "latest.json";

/// A published, versioned SQL package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseArtifact {
    /// Released version
    pub version: SemVer,

    /// SQL introduced by this release, with `-- src:<module>` provenance
    pub sql: String,

    /// Every module included up to and including this release, in compile order
    pub migrations: Vec<MigrationName>,
}

impl ReleaseArtifact {
    /// Load an artifact, returning `None` if the file does not exist.
    pub fn load(path: &Path) -> CoreResult<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let artifact = serde_json::from_str(&content).map_err(|e| CoreError::ArtifactParse {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(Some(artifact))
    }

    /// Pretty JSON encoding, newline-terminated.
    pub fn to_json(&self) -> CoreResult<String> {
        let mut json = serde_json::to_string_pretty(self)?;
        json.push('\n');
        Ok(json)
    }

    /// Whether `name` is part of this release's manifest.
    pub fn includes(&self, name: &str) -> bool {
        self.migrations.iter().any(|m| m == name)
    }

    /// `<dir>/<version>.json`
    pub fn path_for(dir: &Path, version: &SemVer) -> PathBuf {
        dir.join(format!("{version}.json"))
    }

    /// `<dir>/latest.json`
    pub fn latest_path(dir: &Path) -> PathBuf {
        dir.join(LATEST_FILE_NAME)
    }

    /// Version-labeled artifacts present in `dir`, sorted by version.
    ///
    /// `latest.json` and files whose stem is not a version are skipped.
    pub fn list_versions(dir: &Path) -> CoreResult<Vec<(SemVer, PathBuf)>> {
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(|e| CoreError::IoWithPath {
            path: dir.display().to_string(),
            source: e,
        })? {
            let entry = entry.map_err(|e| CoreError::IoWithPath {
                path: dir.display().to_string(),
                source: e,
            })?;
            let path = entry.path();
            if !path.is_file() || !path.extension().is_some_and(|e| e == "json") {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match SemVer::parse(stem) {
                Ok(version) => found.push((version, path)),
                Err(_) => log::debug!("Skipping non-release file {}", path.display()),
            }
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found)
    }
}

#[cfg(test)]
#[path = "artifact_test.rs"]
mod tests;
