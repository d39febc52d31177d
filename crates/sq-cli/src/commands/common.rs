//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sq_compile::MigrationRegistry;
use sq_core::Project;
use std::fmt;
use std::io::Write;
use std::path::Path;

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty: the command has already reported the failure to the user.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Load the project named by `--project-dir`, honoring `--config`.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let project_path = Path::new(&global.project_dir);
    let project = match &global.config {
        Some(config) => Project::load_with_config(project_path, Path::new(config)),
        None => Project::load(project_path),
    };
    project.context("Failed to load project")
}

/// Discover and load every migration module of the project.
pub(crate) fn load_registry(project: &Project) -> Result<MigrationRegistry> {
    let registry =
        MigrationRegistry::from_project(project).context("Failed to discover migrations")?;
    log::debug!(
        "discovered {} migrations under {}",
        registry.len(),
        project.migrations_dir().display()
    );
    Ok(registry)
}

/// Write `contents` to a temp sibling and rename it over `path`.
pub(crate) fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let file_name = path
        .file_name()
        .with_context(|| format!("Not a file path: {}", path.display()))?;
    let temp = path.with_file_name(format!(".{}.sq-tmp", file_name.to_string_lossy()));

    let staged = std::fs::File::create(&temp)
        .and_then(|mut file| {
            file.write_all(contents.as_bytes())?;
            file.sync_all()
        })
        .and_then(|()| std::fs::rename(&temp, path));
    if let Err(e) = staged {
        let _ = std::fs::remove_file(&temp);
        return Err(e).with_context(|| format!("Failed to write {}", path.display()));
    }
    Ok(())
}

/// `path` relative to the project root when it lives inside it.
pub(crate) fn display_path(project: &Project, path: &Path) -> String {
    path.strip_prefix(&project.root)
        .unwrap_or(path)
        .display()
        .to_string()
}
