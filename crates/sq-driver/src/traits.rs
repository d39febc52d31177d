//! Driver trait definition

use crate::error::DriverResult;

/// A statement produced by the schema-definition layer, ready to execute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    /// SQL text
    pub sql: String,
}

impl CompiledQuery {
    pub fn new(sql: impl Into<String>) -> Self {
        Self { sql: sql.into() }
    }
}

/// Rows returned by a driver.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryResult {
    /// Each row as its column values rendered to text
    pub rows: Vec<Vec<String>>,
    /// Rows changed by a DML statement, if the backend reports it
    pub rows_affected: Option<u64>,
}

impl QueryResult {
    /// A result with no rows
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Execution backend used by the schema-definition layer.
///
/// The lifecycle mirrors a pooled connection: `init`, then
/// `acquire_connection`, any number of statements (optionally wrapped in a
/// transaction), `release_connection`, and finally `destroy`. Drivers are
/// used from a single thread, one statement at a time.
pub trait Driver {
    /// Prepare the backend
    fn init(&mut self) -> DriverResult<()>;

    /// Check out a connection
    fn acquire_connection(&mut self) -> DriverResult<()>;

    /// Open a transaction on the current connection
    fn begin_transaction(&mut self) -> DriverResult<()>;

    /// Commit the open transaction
    fn commit_transaction(&mut self) -> DriverResult<()>;

    /// Roll back the open transaction
    fn rollback_transaction(&mut self) -> DriverResult<()>;

    /// Return the current connection
    fn release_connection(&mut self) -> DriverResult<()>;

    /// Tear the backend down
    fn destroy(&mut self) -> DriverResult<()>;

    /// Execute one compiled statement
    fn execute_compiled(&mut self, query: &CompiledQuery) -> DriverResult<QueryResult>;

    /// Driver type identifier for logging
    fn driver_type(&self) -> &'static str;
}
