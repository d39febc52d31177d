//! Configuration types and parsing for squashpack.yml

use crate::error::{CoreError, CoreResult};
use crate::semver::ReleaseType;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "squashpack.yml";

/// Main project configuration from squashpack.yml
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Package name, also the stem of the control file and SQL scripts
    pub name: String,

    /// Root directory holding `v<major>.<minor>.<patch>` version folders
    #[serde(default = "default_migration_path")]
    pub migration_path: String,

    /// Schema namespace migrations are captured against
    #[serde(default = "default_schema")]
    pub schema: String,

    /// Migration source extensions, without the leading dot
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Files whose name starts with this marker are skipped
    #[serde(default = "default_ignore_prefix")]
    pub ignore_prefix: Option<String>,

    /// Glob patterns matched against file names; matches are skipped
    #[serde(default)]
    pub ignore_patterns: Vec<String>,

    /// Control file path (defaults to `<name>.control`)
    #[serde(default)]
    pub control_file: Option<String>,

    /// Directory for `<version>.json` artifacts and `latest.json`
    #[serde(default = "default_versions_path")]
    pub versions_path: String,

    /// Also write a plain `<name>--<version>.sql` script on release
    #[serde(default = "default_true")]
    pub sql_script: bool,

    /// Version component bumped by `release`
    #[serde(default)]
    pub release_type: ReleaseType,

    /// Literal token replaced by the released version inside released SQL
    #[serde(default)]
    pub version_placeholder: Option<String>,

    /// Variables available through `var()` in SQL migration templates
    #[serde(default)]
    pub vars: HashMap<String, serde_yaml::Value>,
}

fn default_migration_path() -> String {
    "migrations".to_string()
}

fn default_schema() -> String {
    "public".to_string()
}

fn default_extensions() -> Vec<String> {
    vec!["sql".to_string(), "yml".to_string(), "yaml".to_string()]
}

fn default_ignore_prefix() -> Option<String> {
    Some("_".to_string())
}

fn default_versions_path() -> String {
    "versions".to_string()
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file path
    pub fn load(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            return Err(CoreError::ConfigNotFound {
                path: path.display().to_string(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| CoreError::IoWithPath {
            path: path.display().to_string(),
            source: e,
        })?;
        let config: Config =
            serde_yaml::from_str(&content).map_err(|e| CoreError::ConfigParseError {
                message: e.to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the project directory
    pub fn load_from_dir(dir: &Path) -> CoreResult<Self> {
        Self::load(&dir.join(CONFIG_FILE_NAME))
    }

    /// Validate configuration values that serde cannot express
    pub fn validate(&self) -> CoreResult<()> {
        let invalid = |message: String| Err(CoreError::ConfigInvalid { message });

        if self.name.trim().is_empty() {
            return invalid("'name' must not be empty".to_string());
        }
        if self.schema.trim().is_empty() {
            return invalid("'schema' must not be empty".to_string());
        }
        if self.extensions.is_empty() {
            return invalid("'extensions' must list at least one extension".to_string());
        }
        if let Some(ext) = self.extensions.iter().find(|e| e.is_empty() || e.starts_with('.')) {
            return invalid(format!(
                "extension '{ext}' must be non-empty and given without a leading dot"
            ));
        }
        for pattern in &self.ignore_patterns {
            if let Err(e) = glob::Pattern::new(pattern) {
                return invalid(format!("ignore pattern '{pattern}' is not a valid glob: {e}"));
            }
        }
        if self
            .version_placeholder
            .as_deref()
            .is_some_and(|p| p.trim().is_empty())
        {
            return invalid("'version_placeholder' must not be blank".to_string());
        }
        Ok(())
    }

    /// Get absolute migrations root
    pub fn migration_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.migration_path)
    }

    /// Get absolute artifact directory
    pub fn versions_path_absolute(&self, root: &Path) -> PathBuf {
        root.join(&self.versions_path)
    }

    /// Get absolute control file path
    pub fn control_path_absolute(&self, root: &Path) -> PathBuf {
        match &self.control_file {
            Some(path) => root.join(path),
            None => root.join(format!("{}.control", self.name)),
        }
    }

    /// Path of the plain SQL script for `version`, next to the control file
    pub fn sql_script_path(&self, root: &Path, version: &str) -> PathBuf {
        let control = self.control_path_absolute(root);
        let dir = control.parent().unwrap_or(root);
        dir.join(format!("{}--{}.sql", self.name, version))
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
