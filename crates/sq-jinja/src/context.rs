//! Per-migration template context.

use serde::Serialize;

/// Values injected into every migration template.
///
/// Accessible as `{{ schema }}`, `{{ migration }}` and `{{ version }}`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationContext {
    /// Schema the migration's handle is scoped to
    pub schema: String,
    /// Module name (`001_schema`)
    pub migration: String,
    /// Version folder label (`v0.1.0`)
    pub version: String,
}

impl MigrationContext {
    pub fn new(
        schema: impl Into<String>,
        migration: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            schema: schema.into(),
            migration: migration.into(),
            version: version.into(),
        }
    }
}
