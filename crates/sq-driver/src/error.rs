//! Error types for sq-driver

use thiserror::Error;

/// Driver operation errors
#[derive(Error, Debug)]
pub enum DriverError {
    /// Statement execution error (X002)
    #[error("[X002] SQL execution failed: {0}")]
    ExecutionError(String),

    /// Transaction management error (X003)
    #[error("[X003] Transaction failed: {0}")]
    TransactionError(String),
}

/// Result type alias for DriverError
pub type DriverResult<T> = Result<T, DriverError>;
