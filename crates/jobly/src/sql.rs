//! SQL fragments with positional parameters.
//!
//! [`Sql`] stores SQL text and bound values separately and renders `$1, $2, ...`
//! placeholders in bind order when [`Sql::to_sql`] is called. Fragments compose:
//! splicing one `Sql` into another renumbers its placeholders to follow the
//! ones already bound, so a generated `SET` or `WHERE` clause can be dropped
//! into a fixed statement template without tracking indices by hand.
//!
//! # Example
//!
//! ```ignore
//! use jobly::{sql, Sql};
//!
//! let mut set = Sql::empty();
//! set.push_ident("name")?.push("=").push_bind("Acme");
//!
//! let mut q = sql("UPDATE companies SET ");
//! q.push_sql(set);
//! q.push(r#" WHERE "handle" = "#).push_bind("acme");
//!
//! assert_eq!(q.to_sql(), r#"UPDATE companies SET "name"=$1 WHERE "handle" = $2"#);
//! ```

use crate::client::GenericClient;
use crate::error::{DbError, DbResult};
use crate::ident::write_quoted;
use crate::row::FromRow;
use crate::value::SqlValue;
use std::fmt::Write;
use tokio_postgres::Row;
use tokio_postgres::types::ToSql;

#[derive(Debug, Clone, PartialEq)]
enum SqlPart {
    Raw(String),
    Param,
}

/// A parameter-safe SQL fragment or statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Sql {
    parts: Vec<SqlPart>,
    params: Vec<SqlValue>,
}

/// Start building a SQL statement.
pub fn sql(initial_sql: impl Into<String>) -> Sql {
    Sql::new(initial_sql)
}

impl Sql {
    /// Create a new builder with an initial SQL fragment.
    pub fn new(initial_sql: impl Into<String>) -> Self {
        let mut out = Self::empty();
        out.push(&initial_sql.into());
        out
    }

    /// Create an empty builder.
    pub fn empty() -> Self {
        Self {
            parts: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Whether this fragment renders to the empty string.
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Append raw SQL (no parameters).
    pub fn push(&mut self, sql: &str) -> &mut Self {
        if sql.is_empty() {
            return self;
        }

        match self.parts.last_mut() {
            Some(SqlPart::Raw(last)) => last.push_str(sql),
            _ => self.parts.push(SqlPart::Raw(sql.to_string())),
        }
        self
    }

    /// Append a parameter placeholder and bind its value.
    pub fn push_bind(&mut self, value: impl Into<SqlValue>) -> &mut Self {
        self.parts.push(SqlPart::Param);
        self.params.push(value.into());
        self
    }

    /// Append a quoted SQL identifier.
    ///
    /// Postgres cannot parameterize identifiers, so the name is rendered into
    /// the SQL text as `"name"` with embedded quotes doubled.
    pub fn push_ident(&mut self, ident: &str) -> DbResult<&mut Self> {
        let mut quoted = String::with_capacity(ident.len() + 2);
        write_quoted(ident, &mut quoted)?;
        Ok(self.push(&quoted))
    }

    /// Append another `Sql` fragment, consuming it.
    ///
    /// Placeholders of `other` are renumbered to follow those already bound here.
    pub fn push_sql(&mut self, other: Sql) -> &mut Self {
        let Sql { parts, mut params } = other;
        for part in parts {
            match part {
                SqlPart::Raw(s) => {
                    self.push(&s);
                }
                SqlPart::Param => self.parts.push(SqlPart::Param),
            }
        }
        self.params.append(&mut params);
        self
    }

    /// Render SQL with `$1, $2, ...` placeholders.
    pub fn to_sql(&self) -> String {
        let mut out = String::new();
        let mut idx: usize = 0;

        for part in &self.parts {
            match part {
                SqlPart::Raw(s) => out.push_str(s),
                SqlPart::Param => {
                    idx += 1;
                    let _ = write!(&mut out, "${}", idx);
                }
            }
        }
        out
    }

    /// Bound values, in placeholder order.
    pub fn params(&self) -> &[SqlValue] {
        &self.params
    }

    /// Consume the fragment, returning the rendered SQL and its values.
    pub fn into_parts(self) -> (String, Vec<SqlValue>) {
        let sql = self.to_sql();
        (sql, self.params)
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|p| p as &(dyn ToSql + Sync))
            .collect()
    }

    fn placeholder_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p, SqlPart::Param))
            .count()
    }

    fn validate(&self) -> DbResult<()> {
        let placeholders = self.placeholder_count();
        if placeholders != self.params.len() {
            return Err(DbError::invalid_input(format!(
                "Sql: {} placeholders but {} params",
                placeholders,
                self.params.len()
            )));
        }
        Ok(())
    }

    fn prepare(&self) -> DbResult<(String, Vec<&(dyn ToSql + Sync)>)> {
        self.validate()?;
        let sql = self.to_sql();
        tracing::debug!(
            target: "jobly.sql",
            sql = %sql,
            param_count = self.params.len(),
            "executing statement"
        );
        Ok((sql, self.params_ref()))
    }

    /// Execute the built SQL and return all rows.
    pub async fn fetch_all(&self, conn: &impl GenericClient) -> DbResult<Vec<Row>> {
        let (sql, params) = self.prepare()?;
        conn.query(&sql, &params).await
    }

    /// Execute the built SQL and return all rows mapped to `T`.
    pub async fn fetch_all_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<Vec<T>> {
        let rows = self.fetch_all(conn).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Execute the built SQL and return the first row; `NotFound` if there is none.
    pub async fn fetch_one(&self, conn: &impl GenericClient) -> DbResult<Row> {
        let (sql, params) = self.prepare()?;
        conn.query_one(&sql, &params).await
    }

    /// Execute the built SQL and return the first row mapped to `T`.
    pub async fn fetch_one_as<T: FromRow>(&self, conn: &impl GenericClient) -> DbResult<T> {
        let row = self.fetch_one(conn).await?;
        T::from_row(&row)
    }

    /// Execute the built SQL and return at most one row.
    pub async fn fetch_opt(&self, conn: &impl GenericClient) -> DbResult<Option<Row>> {
        let (sql, params) = self.prepare()?;
        conn.query_opt(&sql, &params).await
    }

    /// Execute the built SQL and return at most one row mapped to `T`.
    pub async fn fetch_opt_as<T: FromRow>(
        &self,
        conn: &impl GenericClient,
    ) -> DbResult<Option<T>> {
        let row = self.fetch_opt(conn).await?;
        row.as_ref().map(T::from_row).transpose()
    }

    /// Execute the built SQL and return affected row count.
    pub async fn execute(&self, conn: &impl GenericClient) -> DbResult<u64> {
        let (sql, params) = self.prepare()?;
        conn.execute(&sql, &params).await
    }
}
