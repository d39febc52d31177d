//! The squasher: runs migrations against a capturing driver

use crate::bundle::{CompiledBundle, SquashedBundle, VersionBundle};
use crate::error::{CompileError, CompileResult};
use crate::registry::{MigrationModule, MigrationRegistry};
use sq_core::Project;
use sq_driver::{CaptureDriver, CapturingDriver};
use sq_schema::SchemaHandle;

/// Which procedure of each module to capture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// Compiles a [`MigrationRegistry`] into SQL without touching a database.
///
/// Modules run strictly one after another. The driver's buffer is reset
/// before each module and harvested right after it, so every
/// [`SquashedBundle`] holds exactly the statements of its own module.
#[derive(Debug)]
pub struct Compiler<D: CapturingDriver = CaptureDriver> {
    driver: D,
    schema: String,
}

impl Compiler<CaptureDriver> {
    /// A compiler whose handles are scoped to `schema`
    pub fn new(schema: impl Into<String>) -> Self {
        Self::with_driver(CaptureDriver::new(), schema)
    }

    /// A compiler for the project's configured schema
    pub fn for_project(project: &Project) -> Self {
        Self::new(project.config.schema.clone())
    }
}

impl<D: CapturingDriver> Compiler<D> {
    /// A compiler recording through `driver` instead of a fresh [`CaptureDriver`]
    pub fn with_driver(driver: D, schema: impl Into<String>) -> Self {
        Self {
            driver,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// Capture every module's `up` in registry order.
    ///
    /// If any module fails, the whole run fails with
    /// [`CompileError::Capture`] and nothing captured so far is returned.
    pub fn compile(&mut self, registry: &MigrationRegistry) -> CompileResult<CompiledBundle> {
        self.run(registry.modules().iter(), Direction::Up)
    }

    /// Capture every module's `down` in reverse registry order.
    ///
    /// Modules without a down procedure are skipped.
    pub fn compile_down(&mut self, registry: &MigrationRegistry) -> CompileResult<CompiledBundle> {
        let modules = registry
            .modules()
            .iter()
            .rev()
            .filter(|m| m.migration().has_down());
        self.run(modules, Direction::Down)
    }

    fn run<'r>(
        &mut self,
        modules: impl Iterator<Item = &'r MigrationModule>,
        direction: Direction,
    ) -> CompileResult<CompiledBundle> {
        self.driver.init()?;
        self.driver.acquire_connection()?;

        let result = self.capture_all(modules, direction);

        let teardown = self
            .driver
            .release_connection()
            .and_then(|()| self.driver.destroy());
        let bundle = result?;
        teardown?;

        log::debug!(
            "compiled {} modules ({} statements), checksum {}",
            bundle.module_count(),
            bundle.statement_count(),
            bundle.checksum()
        );
        Ok(bundle)
    }

    fn capture_all<'r>(
        &mut self,
        modules: impl Iterator<Item = &'r MigrationModule>,
        direction: Direction,
    ) -> CompileResult<CompiledBundle> {
        let mut versions: Vec<VersionBundle> = Vec::new();
        for module in modules {
            let statements = self.capture(module, direction)?;
            let squashed = SquashedBundle {
                name: module.name().clone(),
                folder: module.folder().to_string(),
                statements,
            };
            match versions.last_mut() {
                Some(current) if current.label == module.folder() => {
                    current.modules.push(squashed)
                }
                _ => versions.push(VersionBundle {
                    label: module.folder().to_string(),
                    modules: vec![squashed],
                }),
            }
        }
        Ok(CompiledBundle { versions })
    }

    fn capture(
        &mut self,
        module: &MigrationModule,
        direction: Direction,
    ) -> CompileResult<Vec<String>> {
        self.driver.reset();
        let mut db = SchemaHandle::new(&mut self.driver, self.schema.as_str());
        let outcome = match direction {
            Direction::Up => module.migration().up(&mut db),
            Direction::Down => module.migration().down(&mut db),
        };
        outcome.map_err(|source| CompileError::Capture {
            module: module.name().to_string(),
            folder: module.folder().to_string(),
            source,
        })?;

        let statements = self.driver.harvest().to_vec();
        log::debug!(
            "captured {} statements from {} ({:?})",
            statements.len(),
            module.name(),
            direction
        );
        Ok(statements)
    }
}

#[cfg(test)]
#[path = "compiler_test.rs"]
mod tests;
