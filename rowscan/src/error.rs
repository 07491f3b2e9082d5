//! Error types for rowscan

use thiserror::Error;

/// Result type alias for rowscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while building or filtering a mapping.
///
/// These are produced before any row is read. A mapper that failed to build
/// keeps the error and hands out a copy on every call, so the type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    /// The destination is not a record or a pointer to a record
    #[error("Invalid destination type: {0}")]
    InvalidDestinationType(String),

    /// A mapping option was rejected
    #[error("Mapping configuration error: {0}")]
    Configuration(String),

    /// A result column has nowhere to go and unknown columns are not allowed
    #[error("No destination for column {0:?}")]
    NoDestinationForColumn(String),
}

/// Errors that can occur while mapping rows
#[derive(Error, Debug)]
pub enum Error {
    /// Mapping construction or column matching failed
    #[error(transparent)]
    Mapping(#[from] MappingError),

    /// MySQL driver error
    #[cfg(feature = "mysql")]
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// Null value for non-optional field
    #[error("Unexpected null value for column: {0}")]
    UnexpectedNull(String),

    /// An opaque leaf was mapped but its type cannot accept a column value
    #[error("Type {0} cannot be scanned from a single column")]
    NotScannable(&'static str),

    /// Row decode error
    #[error("Failed to decode row: {0}")]
    RowDecode(String),
}
