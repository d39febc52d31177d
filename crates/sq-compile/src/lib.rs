//! sq-compile - Migration loading and SQL squashing for Squashpack
//!
//! Discovered migration files are turned into [`Migration`] values by the
//! [`LoaderRegistry`], collected in order into a [`MigrationRegistry`], and
//! run one by one against a capturing driver by the [`Compiler`], which
//! assembles the captured SQL into a [`CompiledBundle`].

pub mod bundle;
pub mod compiler;
pub mod error;
pub mod loader;
pub mod migration;
pub mod registry;

pub use bundle::{CompiledBundle, SquashedBundle, VersionBundle};
pub use compiler::{Compiler, Direction};
pub use error::{CompileError, CompileResult};
pub use loader::{LoaderRegistry, MigrationLoader, SqlLoader, YamlLoader};
pub use migration::{FnMigration, Migration, MigrationError, MigrationResult};
pub use registry::{MigrationModule, MigrationRegistry};
