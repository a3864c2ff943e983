//! Companies.

use crate::client::GenericClient;
use crate::columns::ColumnOverrides;
use crate::error::{DbError, DbResult};
use crate::filter::{CompanyFilter, company_filter_clause};
use crate::patch::{Patch, partial_update_clause};
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use super::ensure_updatable;

pub(super) const COLUMNS: &str = "handle, name, description, num_employees, logo_url";

/// External field names that differ from their column.
pub const COLUMN_OVERRIDES: ColumnOverrides<'static> =
    &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

/// Fields a patch may change.
pub const UPDATABLE_FIELDS: &[&str] = &["name", "description", "numEmployees", "logoUrl"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub handle: String,
    pub name: String,
    pub description: String,
    pub num_employees: Option<i32>,
    pub logo_url: Option<String>,
}

/// Input for [`Company::create`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewCompany {
    pub handle: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub num_employees: Option<i32>,
    #[serde(default)]
    pub logo_url: Option<String>,
}

/// A job as listed under its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyJob {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
}

/// A company with its jobs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDetail {
    #[serde(flatten)]
    pub company: Company,
    pub jobs: Vec<CompanyJob>,
}

impl FromRow for Company {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            handle: row.try_get_column("handle")?,
            name: row.try_get_column("name")?,
            description: row.try_get_column("description")?,
            num_employees: row.try_get_column("num_employees")?,
            logo_url: row.try_get_column("logo_url")?,
        })
    }
}

impl FromRow for CompanyJob {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
        })
    }
}

fn no_company(handle: &str) -> DbError {
    DbError::not_found(format!("No company: {handle}"))
}

impl Company {
    /// Insert a company. A taken handle or name is [`DbError::Duplicate`].
    pub async fn create(conn: &impl GenericClient, new: &NewCompany) -> DbResult<Company> {
        tracing::debug!(target: "jobly.models", handle = %new.handle, "create company");
        let mut q = sql(
            "INSERT INTO companies (handle, name, description, num_employees, logo_url) VALUES (",
        );
        q.push_bind(new.handle.as_str())
            .push(", ")
            .push_bind(new.name.as_str())
            .push(", ")
            .push_bind(new.description.as_str())
            .push(", ")
            .push_bind(new.num_employees)
            .push(", ")
            .push_bind(new.logo_url.as_deref())
            .push(") RETURNING ")
            .push(COLUMNS);
        q.fetch_one_as(conn).await
    }

    /// List companies matching `filter`, ordered by name.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &CompanyFilter,
    ) -> DbResult<Vec<Company>> {
        let where_clause = company_filter_clause(filter)?;
        let mut q = sql(format!("SELECT {COLUMNS} FROM companies "));
        q.push_sql(where_clause);
        q.push(" ORDER BY name");
        q.fetch_all_as(conn).await
    }

    /// Fetch a company and its jobs.
    pub async fn get(conn: &impl GenericClient, handle: &str) -> DbResult<CompanyDetail> {
        let mut q = sql(format!("SELECT {COLUMNS} FROM companies WHERE handle = "));
        q.push_bind(handle);
        let company: Company = q
            .fetch_opt_as(conn)
            .await?
            .ok_or_else(|| no_company(handle))?;

        let mut q = sql("SELECT id, title, salary, equity FROM jobs WHERE company_handle = ");
        q.push_bind(handle).push(" ORDER BY id");
        let jobs = q.fetch_all_as(conn).await?;

        Ok(CompanyDetail { company, jobs })
    }

    /// Apply `patch` to the company with `handle`.
    ///
    /// Only [`UPDATABLE_FIELDS`] may appear in the patch.
    pub async fn update(
        conn: &impl GenericClient,
        handle: &str,
        patch: &Patch,
    ) -> DbResult<Company> {
        ensure_updatable(patch, UPDATABLE_FIELDS)?;
        let set = partial_update_clause(patch, COLUMN_OVERRIDES)?;
        tracing::debug!(target: "jobly.models", handle, fields = patch.len(), "update company");

        let mut q = sql("UPDATE companies SET ");
        q.push_sql(set);
        q.push(" WHERE handle = ")
            .push_bind(handle)
            .push(" RETURNING ")
            .push(COLUMNS);
        q.fetch_opt_as(conn).await?.ok_or_else(|| no_company(handle))
    }

    /// Delete the company with `handle` (and, by cascade, its jobs).
    pub async fn remove(conn: &impl GenericClient, handle: &str) -> DbResult<()> {
        tracing::debug!(target: "jobly.models", handle, "remove company");
        let mut q = sql("DELETE FROM companies WHERE handle = ");
        q.push_bind(handle);
        match q.execute(conn).await? {
            0 => Err(no_company(handle)),
            _ => Ok(()),
        }
    }
}
