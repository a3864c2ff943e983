//! Jobs.

use crate::client::GenericClient;
use crate::columns::ColumnOverrides;
use crate::error::{DbError, DbResult};
use crate::filter::{JobFilter, job_filter_clause};
use crate::patch::{Patch, partial_update_clause};
use crate::row::{FromRow, RowExt};
use crate::sql::sql;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

use super::company::{self, Company};
use super::ensure_updatable;

const COLUMNS: &str = "id, title, salary, equity, company_handle";

/// Job fields map to their columns unchanged.
pub const COLUMN_OVERRIDES: ColumnOverrides<'static> = &[];

/// Fields a patch may change; `id` and the owning company are fixed.
pub const UPDATABLE_FIELDS: &[&str] = &["title", "salary", "equity"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i32,
    pub title: String,
    pub salary: Option<i32>,
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// Input for [`Job::create`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NewJob {
    pub title: String,
    #[serde(default)]
    pub salary: Option<i32>,
    #[serde(default)]
    pub equity: Option<Decimal>,
    pub company_handle: String,
}

/// A job as returned by [`Job::find_all`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    #[serde(flatten)]
    pub job: Job,
    pub company_name: Option<String>,
}

/// A job with its company.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JobDetail {
    #[serde(flatten)]
    pub job: Job,
    pub company: Company,
}

impl FromRow for Job {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            id: row.try_get_column("id")?,
            title: row.try_get_column("title")?,
            salary: row.try_get_column("salary")?,
            equity: row.try_get_column("equity")?,
            company_handle: row.try_get_column("company_handle")?,
        })
    }
}

impl FromRow for JobListing {
    fn from_row(row: &Row) -> DbResult<Self> {
        Ok(Self {
            job: Job::from_row(row)?,
            company_name: row.try_get_column("company_name")?,
        })
    }
}

fn no_job(id: i32) -> DbError {
    DbError::not_found(format!("No job: {id}"))
}

impl Job {
    /// Insert a job. An unknown company handle is [`DbError::InvalidInput`].
    pub async fn create(conn: &impl GenericClient, new: &NewJob) -> DbResult<Job> {
        tracing::debug!(target: "jobly.models", company = %new.company_handle, "create job");
        let mut q = sql("INSERT INTO jobs (title, salary, equity, company_handle) VALUES (");
        q.push_bind(new.title.as_str())
            .push(", ")
            .push_bind(new.salary)
            .push(", ")
            .push_bind(new.equity)
            .push(", ")
            .push_bind(new.company_handle.as_str())
            .push(") RETURNING ")
            .push(COLUMNS);
        q.fetch_one_as(conn).await
    }

    /// List jobs matching `filter`, ordered by title.
    pub async fn find_all(
        conn: &impl GenericClient,
        filter: &JobFilter,
    ) -> DbResult<Vec<JobListing>> {
        // Filter columns are unqualified; none of them exist on companies.
        let mut q = sql(
            "SELECT j.id, j.title, j.salary, j.equity, j.company_handle, c.name AS company_name \
             FROM jobs j LEFT JOIN companies c ON c.handle = j.company_handle ",
        );
        q.push_sql(job_filter_clause(filter));
        q.push(" ORDER BY j.title");
        q.fetch_all_as(conn).await
    }

    /// Fetch a job and its company.
    pub async fn get(conn: &impl GenericClient, id: i32) -> DbResult<JobDetail> {
        let mut q = sql(format!("SELECT {COLUMNS} FROM jobs WHERE id = "));
        q.push_bind(id);
        let job: Job = q.fetch_opt_as(conn).await?.ok_or_else(|| no_job(id))?;

        let mut q = sql(format!(
            "SELECT {} FROM companies WHERE handle = ",
            company::COLUMNS
        ));
        q.push_bind(job.company_handle.as_str());
        let company = q.fetch_one_as(conn).await?;

        Ok(JobDetail { job, company })
    }

    /// Apply `patch` to the job with `id`.
    ///
    /// Only [`UPDATABLE_FIELDS`] may appear in the patch.
    pub async fn update(conn: &impl GenericClient, id: i32, patch: &Patch) -> DbResult<Job> {
        ensure_updatable(patch, UPDATABLE_FIELDS)?;
        let set = partial_update_clause(patch, COLUMN_OVERRIDES)?;
        tracing::debug!(target: "jobly.models", id, fields = patch.len(), "update job");

        let mut q = sql("UPDATE jobs SET ");
        q.push_sql(set);
        q.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING ")
            .push(COLUMNS);
        q.fetch_opt_as(conn).await?.ok_or_else(|| no_job(id))
    }

    /// Delete the job with `id`.
    pub async fn remove(conn: &impl GenericClient, id: i32) -> DbResult<()> {
        tracing::debug!(target: "jobly.models", id, "remove job");
        let mut q = sql("DELETE FROM jobs WHERE id = ");
        q.push_bind(id);
        match q.execute(conn).await? {
            0 => Err(no_job(id)),
            _ => Ok(()),
        }
    }
}
