/// Litedal Error Module
///
/// This module defines the error types for the data-access layer. Every
/// failure propagates synchronously to the caller as a `LitedalError`;
/// there is no local recovery or retry anywhere in the crate.
use thiserror::Error;

/// Error type covering all litedal operations.
///
/// The variants map to the failure classes of the data-access engine:
/// - Driver-level failures (connection, statement, row access)
/// - Argument validation (empty table names, command text, conditions)
/// - Criteria/placeholder mismatches during parameter binding
/// - Session state violations (operations on a closed session)
/// - Configuration loading and connection-profile resolution
#[derive(Error, Debug)]
pub enum LitedalError {
    /// Driver-level errors from SQLite operations
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Null/empty table name, command text, or condition string
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An operation that requires bound values received empty criteria
    #[error("Missing criteria: {0}")]
    MissingCriteria(String),

    /// A placeholder in the SQL text has no matching criteria entry
    #[error("No criteria entry for placeholder '{0}'")]
    MissingBinding(String),

    /// A single-record fetch matched zero rows
    #[error("Query returned no rows")]
    NoRows,

    /// Session state errors (not open, already closed)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Configuration loading and connection-profile resolution errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File system and I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON conversion errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Type alias for Result to use LitedalError as the error type.
///
/// This provides a consistent error type across the entire crate
/// instead of using `Result<T, String>` or mixed error types.
pub type Result<T> = std::result::Result<T, LitedalError>;
