//! Version-folder discovery
//!
//! The migrations root holds `v<major>.<minor>.<patch>` folders, each holding
//! migration source files. Folders are ordered by their parsed version (label
//! text breaks ties) and files by file name, so the result never depends on
//! the order the filesystem lists entries in.

use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::semver::SemVer;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Filters deciding which files in a version folder are migrations.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    extensions: Vec<String>,
    ignore_prefix: Option<String>,
    ignore_patterns: Vec<glob::Pattern>,
}

impl DiscoveryOptions {
    /// Accept files with the given extensions (no leading dot), ignore nothing.
    pub fn new<I, S>(extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            extensions: extensions.into_iter().map(Into::into).collect(),
            ignore_prefix: None,
            ignore_patterns: Vec::new(),
        }
    }

    /// Build from project configuration
    pub fn from_config(config: &Config) -> CoreResult<Self> {
        let mut options = Self::new(config.extensions.iter().cloned());
        options.ignore_prefix = config.ignore_prefix.clone().filter(|p| !p.is_empty());
        for pattern in &config.ignore_patterns {
            options = options.with_ignore_pattern(pattern)?;
        }
        Ok(options)
    }

    /// Skip files whose name starts with `prefix`
    pub fn with_ignore_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.ignore_prefix = Some(prefix.into());
        self
    }

    /// Skip files whose name matches the glob `pattern`
    pub fn with_ignore_pattern(mut self, pattern: &str) -> CoreResult<Self> {
        let compiled = glob::Pattern::new(pattern).map_err(|e| CoreError::ConfigInvalid {
            message: format!("ignore pattern '{pattern}' is not a valid glob: {e}"),
        })?;
        self.ignore_patterns.push(compiled);
        Ok(self)
    }

    /// Whether `file_name` is a migration source under these filters
    pub fn accepts(&self, file_name: &str) -> bool {
        if file_name.starts_with('.') {
            return false;
        }
        if self
            .ignore_prefix
            .as_deref()
            .is_some_and(|p| file_name.starts_with(p))
        {
            return false;
        }
        if self.ignore_patterns.iter().any(|p| p.matches(file_name)) {
            return false;
        }
        match file_name.rsplit_once('.') {
            Some((stem, ext)) => !stem.is_empty() && self.extensions.iter().any(|e| e == ext),
            None => false,
        }
    }
}

/// One migration source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationFile {
    /// File name without its extension
    pub stem: String,
    /// Full file name
    pub file_name: String,
    /// Extension without the dot
    pub extension: String,
    /// Absolute path
    pub path: PathBuf,
}

/// A `v<major>.<minor>.<patch>` directory and its migration files.
#[derive(Debug, Clone)]
pub struct VersionFolder {
    /// Directory name, e.g. `v0.1.0`
    pub label: String,
    /// Parsed version used for ordering
    pub version: SemVer,
    /// Absolute path
    pub path: PathBuf,
    /// Migration files sorted by file name
    pub files: Vec<MigrationFile>,
}

/// The ordered migration tree under a migrations root.
#[derive(Debug, Clone)]
pub struct MigrationTree {
    /// Migrations root
    pub root: PathBuf,
    /// Version folders in version order
    pub folders: Vec<VersionFolder>,
}

/// Parse a directory name as a version-folder label.
///
/// Returns `None` for anything other than `v<major>.<minor>.<patch>`.
pub(crate) fn parse_folder_label(name: &str) -> Option<SemVer> {
    if !name.starts_with('v') {
        return None;
    }
    SemVer::parse(name).ok().filter(|v| v.pre.is_none() && !name.contains('+'))
}

fn read_dir_sorted(dir: &Path) -> CoreResult<Vec<PathBuf>> {
    let unreadable = |e: std::io::Error| CoreError::DirectoryUnreadable {
        path: dir.display().to_string(),
        source: e,
    };

    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(unreadable)? {
        paths.push(entry.map_err(unreadable)?.path());
    }
    paths.sort();
    Ok(paths)
}

impl MigrationTree {
    /// Discover the tree under `root`.
    ///
    /// Entries that are not version folders are ignored. Any unreadable
    /// directory aborts discovery; no partial tree is returned.
    pub fn discover(root: &Path, options: &DiscoveryOptions) -> CoreResult<Self> {
        if !root.exists() {
            return Err(CoreError::MigrationsNotFound {
                path: root.display().to_string(),
            });
        }

        let mut folders = Vec::new();
        for path in read_dir_sorted(root)? {
            if !path.is_dir() {
                continue;
            }
            let Some(label) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(version) = parse_folder_label(label) else {
                log::debug!("Ignoring non-version directory {}", path.display());
                continue;
            };

            let files = Self::discover_files(&path, label, options)?;
            folders.push(VersionFolder {
                label: label.to_string(),
                version,
                path,
                files,
            });
        }

        folders.sort_by(|a, b| a.version.cmp(&b.version).then_with(|| a.label.cmp(&b.label)));

        Ok(Self {
            root: root.to_path_buf(),
            folders,
        })
    }

    fn discover_files(
        dir: &Path,
        label: &str,
        options: &DiscoveryOptions,
    ) -> CoreResult<Vec<MigrationFile>> {
        let mut files: Vec<MigrationFile> = Vec::new();
        let mut seen: HashMap<String, String> = HashMap::new();

        for path in read_dir_sorted(dir)? {
            if path.is_dir() {
                log::debug!("Ignoring nested directory {}", path.display());
                continue;
            }
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .ok_or_else(|| CoreError::InvalidMigrationName {
                    path: path.display().to_string(),
                })?
                .to_string();

            if !options.accepts(&file_name) {
                log::debug!("Skipping {}", path.display());
                continue;
            }

            let Some((stem, extension)) = file_name.rsplit_once('.') else {
                continue;
            };
            let (stem, extension) = (stem.to_string(), extension.to_string());

            if let Some(first) = seen.insert(stem.clone(), file_name.clone()) {
                return Err(CoreError::DuplicateMigration {
                    name: stem,
                    folder: label.to_string(),
                    first,
                    second: file_name,
                });
            }

            files.push(MigrationFile {
                stem,
                file_name,
                extension,
                path,
            });
        }

        files.sort_by(|a, b| a.file_name.cmp(&b.file_name));
        Ok(files)
    }

    /// Total number of migration files across all folders
    pub fn file_count(&self) -> usize {
        self.folders.iter().map(|f| f.files.len()).sum()
    }

    /// Whether the tree holds no migration files
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}
