//! Row mapping traits and utilities

use crate::error::{DbError, DbResult};
use tokio_postgres::Row;

/// Trait for converting a database row into a Rust struct.
///
/// # Example
///
/// ```ignore
/// use jobly::{FromRow, RowExt};
///
/// struct Handle {
///     handle: String,
/// }
///
/// impl FromRow for Handle {
///     fn from_row(row: &Row) -> DbResult<Self> {
///         Ok(Self { handle: row.try_get_column("handle")? })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a database row into Self
    fn from_row(row: &Row) -> DbResult<Self>;
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning DbError::Decode on failure
    fn try_get_column<T>(&self, column: &str) -> DbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>;
}

impl RowExt for Row {
    fn try_get_column<T>(&self, column: &str) -> DbResult<T>
    where
        T: for<'a> tokio_postgres::types::FromSql<'a>,
    {
        self.try_get(column)
            .map_err(|e| DbError::decode(column, e.to_string()))
    }
}
