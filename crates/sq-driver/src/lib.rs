//! sq-driver - Execution backends for Squashpack
//!
//! This crate provides the `Driver` trait the schema-definition layer talks
//! to, and [`CaptureDriver`], a backend that records every compiled statement
//! instead of executing it.

pub mod capture;
pub mod error;
pub mod traits;

pub use capture::{CaptureDriver, CapturingDriver};
pub use error::{DriverError, DriverResult};
pub use traits::{CompiledQuery, Driver, QueryResult};
