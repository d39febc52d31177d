//! Squashed SQL bundles with per-module provenance

use sq_core::{compute_checksum, MigrationName};
use std::collections::HashSet;

/// Captured statements of one module.
///
/// Renders as:
///
/// ```text
/// -- src:<name>
/// <statement 1>
/// <statement 2>
/// --
///
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SquashedBundle {
    pub name: MigrationName,
    pub folder: String,
    pub statements: Vec<String>,
}

impl SquashedBundle {
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push_str("-- src:");
        out.push_str(self.name.as_str());
        out.push('\n');
        out.push_str(&self.statements.join("\n"));
        out.push_str("\n--\n\n");
    }
}

/// The modules of one version folder, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionBundle {
    pub label: String,
    pub modules: Vec<SquashedBundle>,
}

impl VersionBundle {
    pub fn render(&self) -> String {
        let mut out = String::new();
        for module in &self.modules {
            module.render_into(&mut out);
        }
        out
    }
}

/// Output of one compile run: every version bundle in folder order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledBundle {
    pub versions: Vec<VersionBundle>,
}

impl CompiledBundle {
    /// All module bundles in compile order
    pub fn modules(&self) -> impl Iterator<Item = &SquashedBundle> {
        self.versions.iter().flat_map(|v| v.modules.iter())
    }

    /// The full bundle
    pub fn sql(&self) -> String {
        let mut out = String::new();
        for module in self.modules() {
            module.render_into(&mut out);
        }
        out
    }

    /// Names of the included modules in compile order
    pub fn migration_names(&self) -> Vec<MigrationName> {
        self.modules().map(|m| m.name.clone()).collect()
    }

    /// Bundle restricted to `names`, keeping compile order
    pub fn render_only(&self, names: &[MigrationName]) -> String {
        let wanted: HashSet<&MigrationName> = names.iter().collect();
        let mut out = String::new();
        for module in self.modules().filter(|m| wanted.contains(&m.name)) {
            module.render_into(&mut out);
        }
        out
    }

    /// SHA-256 of the full bundle
    pub fn checksum(&self) -> String {
        compute_checksum(&self.sql())
    }

    pub fn statement_count(&self) -> usize {
        self.modules().map(|m| m.statements.len()).sum()
    }

    pub fn module_count(&self) -> usize {
        self.modules().count()
    }

    pub fn is_empty(&self) -> bool {
        self.module_count() == 0
    }
}

#[cfg(test)]
#[path = "bundle_test.rs"]
mod tests;
