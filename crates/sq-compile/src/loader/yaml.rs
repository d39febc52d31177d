//! `.yml` / `.yaml` migrations: lists of declarative schema operations

use super::{read_source, render_template, MigrationLoader};
use crate::error::{CompileError, CompileResult};
use crate::migration::{Migration, MigrationResult};
use serde::Deserialize;
use sq_core::{MigrationFile, VersionFolder};
use sq_jinja::{JinjaEnvironment, MigrationContext};
use sq_schema::{SchemaHandle, SchemaOp};
use std::sync::Arc;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct YamlModule {
    #[serde(default)]
    up: Option<Vec<SchemaOp>>,

    #[serde(default)]
    down: Vec<SchemaOp>,
}

/// Loads YAML migrations.
///
/// ```yaml
/// up:
///   - create_table:
///       name: node
///       columns:
///         - { name: id, type: uuid, primary_key: true }
/// down:
///   - drop_table: { name: node }
/// ```
///
/// `sql` operations are rendered as templates before execution.
pub struct YamlLoader {
    jinja: Arc<JinjaEnvironment<'static>>,
}

impl YamlLoader {
    pub fn new(jinja: Arc<JinjaEnvironment<'static>>) -> Self {
        Self { jinja }
    }
}

impl MigrationLoader for YamlLoader {
    fn name(&self) -> &'static str {
        "yaml"
    }

    fn load(
        &self,
        file: &MigrationFile,
        folder: &VersionFolder,
    ) -> CompileResult<Box<dyn Migration>> {
        let source = read_source(file)?;
        let path = file.path.display().to_string();
        if source.trim().is_empty() {
            return Err(CompileError::MissingUp { path });
        }

        let module: YamlModule =
            serde_yaml::from_str(&source).map_err(|e| CompileError::InvalidModule {
                path: path.clone(),
                message: e.to_string(),
            })?;
        let up = match module.up {
            Some(ops) if !ops.is_empty() => ops,
            _ => return Err(CompileError::MissingUp { path }),
        };

        for op in up.iter().chain(module.down.iter()) {
            if let SchemaOp::Sql(template) = op {
                self.jinja
                    .check_syntax(template)
                    .map_err(|source| CompileError::Template {
                        path: path.clone(),
                        source,
                    })?;
            }
        }

        Ok(Box::new(YamlMigration {
            stem: file.stem.clone(),
            version: folder.label.clone(),
            up,
            down: module.down,
            jinja: self.jinja.clone(),
        }))
    }
}

struct YamlMigration {
    stem: String,
    version: String,
    up: Vec<SchemaOp>,
    down: Vec<SchemaOp>,
    jinja: Arc<JinjaEnvironment<'static>>,
}

impl YamlMigration {
    fn run(&self, ops: &[SchemaOp], db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        for op in ops {
            match op {
                SchemaOp::Sql(template) => {
                    let ctx = MigrationContext::new(
                        db.schema(),
                        self.stem.as_str(),
                        self.version.as_str(),
                    );
                    let rendered = render_template(&self.jinja, template, &ctx)?;
                    if rendered.trim().is_empty() {
                        log::debug!("{}: sql operation rendered empty, skipped", self.stem);
                        continue;
                    }
                    db.apply(&SchemaOp::Sql(rendered))?;
                }
                other => db.apply(other)?,
            }
        }
        Ok(())
    }
}

impl Migration for YamlMigration {
    fn up(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        self.run(&self.up, db)
    }

    fn down(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        self.run(&self.down, db)
    }

    fn has_down(&self) -> bool {
        !self.down.is_empty()
    }
}
