//! Project loading and migration-tree discovery

mod discovery;

pub use discovery::{DiscoveryOptions, MigrationFile, MigrationTree, VersionFolder};

use crate::config::Config;
use crate::control::ControlRecord;
use crate::error::{CoreError, CoreResult};
use std::path::{Path, PathBuf};

/// Represents a Squashpack project: a root directory plus its configuration
#[derive(Debug)]
pub struct Project {
    /// Project root directory
    pub root: PathBuf,

    /// Project configuration
    pub config: Config,
}

impl Project {
    /// Load a project from a directory, reading `squashpack.yml`
    pub fn load(path: &Path) -> CoreResult<Self> {
        let root = Self::absolute_root(path)?;
        let config = Config::load_from_dir(&root)?;
        Ok(Self { root, config })
    }

    /// Load a project whose configuration lives at an explicit path
    pub fn load_with_config(path: &Path, config_path: &Path) -> CoreResult<Self> {
        let root = Self::absolute_root(path)?;
        let config = Config::load(config_path)?;
        Ok(Self { root, config })
    }

    fn absolute_root(path: &Path) -> CoreResult<PathBuf> {
        let root = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()?.join(path)
        };

        if !root.is_dir() {
            return Err(CoreError::ProjectNotFound {
                path: root.display().to_string(),
            });
        }
        Ok(root)
    }

    /// Get the migrations root
    pub fn migrations_dir(&self) -> PathBuf {
        self.config.migration_path_absolute(&self.root)
    }

    /// Get the artifact directory
    pub fn versions_dir(&self) -> PathBuf {
        self.config.versions_path_absolute(&self.root)
    }

    /// Get the control file path
    pub fn control_path(&self) -> PathBuf {
        self.config.control_path_absolute(&self.root)
    }

    /// Read the control record
    pub fn control(&self) -> CoreResult<ControlRecord> {
        ControlRecord::load(&self.control_path())
    }

    /// Walk the migrations root using the configured filters
    pub fn discover(&self) -> CoreResult<MigrationTree> {
        let options = DiscoveryOptions::from_config(&self.config)?;
        MigrationTree::discover(&self.migrations_dir(), &options)
    }
}

#[cfg(test)]
#[path = "project_test.rs"]
mod tests;
