//! Index error types.

use thiserror::Error;

/// Result type for index operations.
pub type Result<T> = std::result::Result<T, IndexError>;

/// Errors from the instance index.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Could not establish a database connection.
    #[error("failed to connect to index database: {0}")]
    Connect(#[source] tokio_postgres::Error),

    /// A query failed after the connection was established.
    #[error("index query failed: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// A flow identifier produced an unusable schema name.
    #[error("invalid schema name derived from flow '{0}'")]
    InvalidSchema(String),
}
