//! SQL identifier quoting.
//!
//! Column names reach the SQL text verbatim (Postgres cannot parameterize
//! identifiers), so every column is rendered as a quoted identifier:
//!
//! - the name is wrapped in `"`
//! - an embedded `"` is escaped as `""`
//! - empty names and names containing NUL are rejected
//!
//! # Example
//! ```ignore
//! use jobly::ident::quote_ident;
//!
//! assert_eq!(quote_ident("num_employees")?, r#""num_employees""#);
//! # Ok::<(), jobly::DbError>(())
//! ```

use crate::error::{DbError, DbResult};

/// Render `name` as a quoted SQL identifier.
pub fn quote_ident(name: &str) -> DbResult<String> {
    let mut out = String::with_capacity(name.len() + 2);
    write_quoted(name, &mut out)?;
    Ok(out)
}

pub(crate) fn write_quoted(name: &str, out: &mut String) -> DbResult<()> {
    if name.is_empty() {
        return Err(DbError::invalid_input("Empty quoted identifier"));
    }
    if name.contains('\0') {
        return Err(DbError::invalid_input(
            "Identifier cannot contain NUL character",
        ));
    }

    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
    Ok(())
}
