//! Error types for qbe

use thiserror::Error;

/// Result type alias for qbe operations
pub type QbeResult<T> = Result<T, QbeError>;

/// Errors reported by the external collaborators and the execution handoff.
///
/// The compiler itself never produces one of these: malformed criteria flow
/// into the generated text and surface later as an [`QbeError::Execution`]
/// or [`QbeError::Query`] from whoever runs it.
#[derive(Debug, Error)]
pub enum QbeError {
    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Driver error from the PostgreSQL collaborators
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Execution error reported by a query executor
    #[error("Execution error: {0}")]
    Execution(String),

    /// Column metadata could not be loaded for a table
    #[error("Failed to load columns for '{table}': {message}")]
    Fetch { table: String, message: String },

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Run requested while the generated SQL is empty
    #[error("Nothing to run: the grid is empty")]
    EmptyQuery,
}

impl QbeError {
    /// Create a fetch error for a specific table
    pub fn fetch(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create an execution error
    pub fn execution(message: impl Into<String>) -> Self {
        Self::Execution(message.into())
    }

    /// Check if this error came from running an empty query
    pub fn is_empty_query(&self) -> bool {
        matches!(self, Self::EmptyQuery)
    }

    /// Message suitable for storing alongside a table's column state.
    ///
    /// Drops the table prefix of [`QbeError::Fetch`], which the state already carries.
    pub fn detail(&self) -> String {
        match self {
            Self::Fetch { message, .. } => message.clone(),
            Self::Query(err) => match err.as_db_error() {
                Some(db_err) => db_err.message().to_string(),
                None => err.to_string(),
            },
            other => other.to_string(),
        }
    }
}
