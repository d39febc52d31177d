//! sq-schema - Schema-definition layer for Squashpack
//!
//! Declarative definitions (tables, views, functions, triggers, policies)
//! compile to SQL statements and are handed, one at a time, to whatever
//! [`Driver`](sq_driver::Driver) backs the [`SchemaHandle`].

pub mod defs;
pub mod error;
pub mod handle;
pub mod op;

pub use defs::{
    ColumnDef, FunctionArg, FunctionDef, PolicyCommand, PolicyDef, TableDef, TriggerDef,
    TriggerEvent, TriggerTiming, ViewDef,
};
pub use error::{SchemaError, SchemaResult};
pub use handle::SchemaHandle;
pub use op::{CreateSchemaDef, DropDef, DropFunctionDef, SchemaOp};
