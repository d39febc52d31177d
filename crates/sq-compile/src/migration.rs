//! The capability every migration module exposes

use sq_jinja::JinjaError;
use sq_schema::{SchemaError, SchemaHandle};
use thiserror::Error;

/// Failure raised from inside a migration procedure
#[derive(Error, Debug)]
pub enum MigrationError {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Template(#[from] JinjaError),

    #[error("{0}")]
    Failed(String),
}

impl MigrationError {
    pub fn msg(message: impl Into<String>) -> Self {
        MigrationError::Failed(message.into())
    }
}

/// Result type alias for MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;

/// A unit of schema change.
///
/// `up` is mandatory. `down` is optional; implementations that provide one
/// must also return `true` from `has_down`.
pub trait Migration {
    fn up(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()>;

    fn down(&self, _db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        Ok(())
    }

    fn has_down(&self) -> bool {
        false
    }
}

type Procedure = Box<dyn Fn(&mut SchemaHandle<'_>) -> MigrationResult<()>>;

/// Migration built from closures, for modules defined in Rust.
///
/// ```
/// use sq_compile::FnMigration;
///
/// let migration = FnMigration::new(|db| {
///     db.execute("CREATE SCHEMA a;")?;
///     Ok(())
/// })
/// .with_down(|db| {
///     db.execute("DROP SCHEMA a;")?;
///     Ok(())
/// });
/// # let _ = migration;
/// ```
pub struct FnMigration {
    up: Procedure,
    down: Option<Procedure>,
}

impl FnMigration {
    pub fn new<F>(up: F) -> Self
    where
        F: Fn(&mut SchemaHandle<'_>) -> MigrationResult<()> + 'static,
    {
        Self {
            up: Box::new(up),
            down: None,
        }
    }

    pub fn with_down<F>(mut self, down: F) -> Self
    where
        F: Fn(&mut SchemaHandle<'_>) -> MigrationResult<()> + 'static,
    {
        self.down = Some(Box::new(down));
        self
    }
}

impl Migration for FnMigration {
    fn up(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        (self.up)(db)
    }

    fn down(&self, db: &mut SchemaHandle<'_>) -> MigrationResult<()> {
        match &self.down {
            Some(down) => down(db),
            None => Ok(()),
        }
    }

    fn has_down(&self) -> bool {
        self.down.is_some()
    }
}

impl std::fmt::Debug for FnMigration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnMigration")
            .field("has_down", &self.down.is_some())
            .finish()
    }
}
