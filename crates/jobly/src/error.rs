//! Error types for jobly

use crate::value::BindError;
use thiserror::Error;
use tokio_postgres::types::WrongType;

/// Result type alias for jobly operations
pub type DbResult<T> = Result<T, DbError>;

/// Error types for clause building and data access
#[derive(Debug, Error)]
pub enum DbError {
    /// Caller-supplied data cannot produce a valid statement
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A keyed lookup/update/delete matched no record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unique constraint violation on write
    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(tokio_postgres::Error),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl DbError {
    /// Create an invalid input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }

    /// Whether the error was caused by the request rather than the server.
    ///
    /// Client errors are deterministic in their input and must not be retried.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidInput(_) | Self::NotFound(_) | Self::Duplicate(_)
        )
    }

    /// Classify a tokio_postgres error.
    ///
    /// Constraint and data errors raised by the server, and parameters that
    /// could not be encoded for their column, are the caller's fault and become
    /// [`DbError::InvalidInput`] (or [`DbError::Duplicate`]).
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if let Some(db_err) = err.as_db_error() {
            let constraint = db_err.constraint().unwrap_or("unknown");
            let message = db_err.message();

            match db_err.code().code() {
                "23505" => return Self::Duplicate(format!("{}: {}", constraint, message)),
                // foreign key / check constraint
                "23503" | "23514" => {
                    return Self::InvalidInput(format!("{}: {}", constraint, message));
                }
                // not null / string too long / numeric out of range
                "23502" | "22001" | "22003" => return Self::InvalidInput(message.to_string()),
                _ => {}
            }
        } else if let Some(cause) = std::error::Error::source(&err) {
            if cause.is::<BindError>() || cause.is::<WrongType>() {
                return Self::InvalidInput(format!("{}: {}", err, cause));
            }
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for DbError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_are_classified() {
        assert!(DbError::invalid_input("No data").is_client_error());
        assert!(DbError::not_found("No company: acme").is_client_error());
        assert!(DbError::Duplicate("companies_pkey".into()).is_client_error());
        assert!(!DbError::Config("bad url".into()).is_client_error());
    }

    #[test]
    fn display_carries_message() {
        let err = DbError::invalid_input("No data");
        assert_eq!(err.to_string(), "Invalid input: No data");
        assert!(err.is_invalid_input());
        assert!(!err.is_not_found());
    }
}
