//! Ordered registry of loaded migration modules

use crate::error::{CompileError, CompileResult};
use crate::loader::LoaderRegistry;
use crate::migration::Migration;
use sq_core::{CoreError, MigrationName, MigrationTree, Project};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// A loaded migration and where it came from.
pub struct MigrationModule {
    name: MigrationName,
    stem: String,
    folder: String,
    source: Option<PathBuf>,
    migration: Box<dyn Migration>,
}

impl MigrationModule {
    /// Registry-wide unique name
    pub fn name(&self) -> &MigrationName {
        &self.name
    }

    /// File stem (or programmatic name) before any folder qualification
    pub fn stem(&self) -> &str {
        &self.stem
    }

    /// Label of the owning version folder
    pub fn folder(&self) -> &str {
        &self.folder
    }

    /// Source file, for modules loaded from disk
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn migration(&self) -> &dyn Migration {
        self.migration.as_ref()
    }
}

impl std::fmt::Debug for MigrationModule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationModule")
            .field("name", &self.name)
            .field("folder", &self.folder)
            .field("source", &self.source)
            .field("has_down", &self.migration.has_down())
            .finish()
    }
}

/// Migration modules in execution order: folder order, then file order.
///
/// Names are unique across the registry. A stem that an earlier folder
/// already uses is registered as `<folder>/<stem>`, so the first occurrence
/// keeps the bare name.
#[derive(Debug, Default)]
pub struct MigrationRegistry {
    modules: Vec<MigrationModule>,
    names: HashSet<MigrationName>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discover and load every module of a project with the built-in loaders
    pub fn from_project(project: &Project) -> CompileResult<Self> {
        let tree = project.discover()?;
        let loaders = LoaderRegistry::with_builtins(&project.config.vars);
        Self::load(&tree, &loaders)
    }

    /// Load every file of a discovered tree.
    ///
    /// The first failure aborts loading; no partial registry is returned.
    pub fn load(tree: &MigrationTree, loaders: &LoaderRegistry) -> CompileResult<Self> {
        let mut registry = Self::new();
        for folder in &tree.folders {
            for file in &folder.files {
                let migration = loaders.load(file, folder)?;
                registry.insert(&folder.label, &file.stem, Some(file.path.clone()), migration)?;
            }
        }
        log::debug!(
            "loaded {} migrations from {} version folders",
            registry.len(),
            tree.folders.len()
        );
        Ok(registry)
    }

    /// Append a programmatic module after everything already registered
    pub fn register(
        &mut self,
        folder: &str,
        stem: &str,
        migration: Box<dyn Migration>,
    ) -> CompileResult<&MigrationModule> {
        self.insert(folder, stem, None, migration)
    }

    fn insert(
        &mut self,
        folder: &str,
        stem: &str,
        source: Option<PathBuf>,
        migration: Box<dyn Migration>,
    ) -> CompileResult<&MigrationModule> {
        let bare = MigrationName::try_new(stem).ok_or_else(|| {
            CompileError::Core(CoreError::InvalidMigrationName {
                path: source
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{folder}/{stem}")),
            })
        })?;

        if let Some(existing) = self
            .modules
            .iter()
            .find(|m| m.folder == folder && m.stem == stem)
        {
            let describe = |path: Option<&PathBuf>| {
                path.map(|p| p.display().to_string())
                    .unwrap_or_else(|| format!("{folder}/{stem}"))
            };
            return Err(CompileError::Core(CoreError::DuplicateMigration {
                name: stem.to_string(),
                folder: folder.to_string(),
                first: describe(existing.source.as_ref()),
                second: describe(source.as_ref()),
            }));
        }

        let name = if self.names.contains(&bare) {
            let qualified = MigrationName::qualified(folder, stem);
            log::debug!("'{stem}' already registered; using '{qualified}'");
            qualified
        } else {
            bare
        };

        self.names.insert(name.clone());
        self.modules.push(MigrationModule {
            name,
            stem: stem.to_string(),
            folder: folder.to_string(),
            source,
            migration,
        });
        let index = self.modules.len() - 1;
        Ok(&self.modules[index])
    }

    /// Modules in execution order
    pub fn modules(&self) -> &[MigrationModule] {
        &self.modules
    }

    pub fn get(&self, name: &str) -> Option<&MigrationModule> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Names in execution order
    pub fn names(&self) -> Vec<MigrationName> {
        self.modules.iter().map(|m| m.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_test.rs"]
mod tests;
