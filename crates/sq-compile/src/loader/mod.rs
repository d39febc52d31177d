//! File loaders: turn a discovered migration file into a [`Migration`]
//!
//! Loaders are chosen by file extension through the [`LoaderRegistry`].
//! Everything that can be checked without running the migration (parsing,
//! template syntax, presence of `up`) is checked here, so a broken module
//! fails discovery rather than capture.

mod sql;
mod yaml;

pub use sql::SqlLoader;
pub use yaml::YamlLoader;

use crate::error::{CompileError, CompileResult};
use crate::migration::Migration;
use sq_core::{CoreError, MigrationFile, VersionFolder};
use sq_jinja::{JinjaEnvironment, JinjaResult, MigrationContext};
use std::collections::HashMap;
use std::sync::Arc;

/// Builds migrations from source files of one format.
pub trait MigrationLoader {
    /// Human-readable format name for logging
    fn name(&self) -> &'static str;

    fn load(
        &self,
        file: &MigrationFile,
        folder: &VersionFolder,
    ) -> CompileResult<Box<dyn Migration>>;
}

/// Loaders keyed by file extension (without the dot, lowercase).
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn MigrationLoader>>,
}

impl LoaderRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// The SQL loader for `.sql` and the YAML loader for `.yml`/`.yaml`,
    /// sharing one template environment built from `vars`.
    pub fn with_builtins(vars: &HashMap<String, serde_yaml::Value>) -> Self {
        let jinja = Arc::new(JinjaEnvironment::new(vars));
        let mut registry = Self::new();
        registry.register("sql", Arc::new(SqlLoader::new(jinja.clone())));
        let yaml: Arc<dyn MigrationLoader> = Arc::new(YamlLoader::new(jinja));
        registry.register("yml", yaml.clone());
        registry.register("yaml", yaml);
        registry
    }

    /// Register `loader` for `extension`, replacing any previous one
    pub fn register(&mut self, extension: &str, loader: Arc<dyn MigrationLoader>) {
        self.loaders
            .insert(extension.trim_start_matches('.').to_lowercase(), loader);
    }

    pub fn get(&self, extension: &str) -> Option<&Arc<dyn MigrationLoader>> {
        self.loaders.get(&extension.to_lowercase())
    }

    /// Extensions with a registered loader, sorted
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.loaders.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }

    /// Load one file with the loader registered for its extension
    pub fn load(
        &self,
        file: &MigrationFile,
        folder: &VersionFolder,
    ) -> CompileResult<Box<dyn Migration>> {
        let loader = self
            .get(&file.extension)
            .ok_or_else(|| CompileError::UnsupportedExtension {
                extension: file.extension.clone(),
                path: file.path.display().to_string(),
            })?;
        log::debug!(
            "loading {}/{} with the {} loader",
            folder.label,
            file.file_name,
            loader.name()
        );
        loader.load(file, folder)
    }
}

pub(crate) fn read_source(file: &MigrationFile) -> CompileResult<String> {
    std::fs::read_to_string(&file.path).map_err(|source| {
        CompileError::Core(CoreError::IoWithPath {
            path: file.path.display().to_string(),
            source,
        })
    })
}

/// Render a migration template, logging each `warn()` it raised against the module
pub(crate) fn render_template(
    jinja: &JinjaEnvironment<'_>,
    template: &str,
    ctx: &MigrationContext,
) -> JinjaResult<String> {
    let rendered = jinja.render(template, ctx)?;
    for warning in jinja.warnings() {
        log::warn!("{} ({}): {}", ctx.migration, ctx.version, warning);
    }
    Ok(rendered)
}

#[cfg(test)]
#[path = "loader_test.rs"]
mod tests;
