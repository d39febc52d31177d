//! Dry-run driver that records statements instead of executing them

use crate::error::DriverResult;
use crate::traits::{CompiledQuery, Driver, QueryResult};

/// Records every compiled statement in an in-memory buffer.
///
/// Executing always succeeds with an empty result, whatever the SQL says;
/// validity is not this driver's concern. Lifecycle and transaction calls are
/// no-ops so callers that wrap work in transactions behave normally.
///
/// The buffer belongs to one migration at a time: call [`reset`](Self::reset)
/// before running a migration and [`harvest`](Self::harvest) right after.
#[derive(Debug, Default)]
pub struct CaptureDriver {
    statements: Vec<String>,
}

impl CaptureDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the statement buffer
    pub fn reset(&mut self) {
        self.statements.clear();
    }

    /// Statements captured since the last reset, in execution order.
    ///
    /// Does not clear the buffer.
    pub fn harvest(&self) -> &[String] {
        &self.statements
    }
}

/// A driver whose executed statements can be read back.
///
/// The compiler is generic over this so lifecycle failures can be exercised
/// with a backend other than [`CaptureDriver`].
pub trait CapturingDriver: Driver {
    /// Clear the statement buffer
    fn reset(&mut self);

    /// Statements captured since the last reset, in execution order
    fn harvest(&self) -> &[String];
}

impl CapturingDriver for CaptureDriver {
    fn reset(&mut self) {
        CaptureDriver::reset(self)
    }

    fn harvest(&self) -> &[String] {
        CaptureDriver::harvest(self)
    }
}

impl Driver for CaptureDriver {
    fn init(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn acquire_connection(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn begin_transaction(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn commit_transaction(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn rollback_transaction(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn release_connection(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn destroy(&mut self) -> DriverResult<()> {
        Ok(())
    }

    fn execute_compiled(&mut self, query: &CompiledQuery) -> DriverResult<QueryResult> {
        log::trace!("captured statement ({} bytes)", query.sql.len());
        self.statements.push(query.sql.clone());
        Ok(QueryResult::empty())
    }

    fn driver_type(&self) -> &'static str {
        "capture"
    }
}

#[cfg(test)]
#[path = "capture_test.rs"]
mod tests;
