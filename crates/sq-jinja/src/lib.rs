//! sq-jinja - Jinja templating layer for Squashpack
//!
//! SQL migrations are minijinja templates. The environment provides
//! `var()`, `error()`, `warn()`, `log()`, `from_json()` and `to_json()`,
//! the `ident` and `literal` quoting filters, and the per-migration globals
//! `schema`, `migration` and `version` (see [`MigrationContext`]).
//!
//! Nothing in the environment reads the clock, the process environment or
//! any other ambient state, so a template renders the same way every time.

pub mod context;
pub mod environment;
pub mod error;
pub mod functions;

pub use context::MigrationContext;
pub use environment::JinjaEnvironment;
pub use error::{JinjaError, JinjaResult};
