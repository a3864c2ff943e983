//! # jobly
//!
//! Postgres data access for companies and jobs.
//!
//! ## Features
//!
//! - **Partial updates**: a [`Patch`] becomes a `SET "col"=$1, ...` clause with
//!   external field names mapped to columns
//! - **Filtered listings**: typed [`JobFilter`] / [`CompanyFilter`] criteria become
//!   a `WHERE ... AND ...` clause, or nothing when no criteria are set
//! - **Parameter safety**: values are always bound as `$n` parameters and
//!   identifiers are always quoted
//! - **Transaction-friendly**: pass a transaction anywhere a `GenericClient` is expected
//!
//! ## Clause builders
//!
//! ```ignore
//! use jobly::{CompanyFilter, Patch, company_filter_clause, partial_update_clause};
//!
//! let set = partial_update_clause(
//!     &Patch::new().set("numEmployees", 5),
//!     &[("numEmployees", "num_employees")],
//! )?;
//! assert_eq!(set.to_sql(), r#""num_employees"=$1"#);
//!
//! let filter = CompanyFilter { name: Some("net".into()), ..Default::default() };
//! let where_clause = company_filter_clause(&filter)?;
//! assert_eq!(where_clause.to_sql(), r#"WHERE "name" ILIKE $1"#);
//! ```
//!
//! ## Data access
//!
//! ```ignore
//! use jobly::{Company, CompanyFilter, Patch};
//!
//! let pool = jobly::DbConfig::from_env()?.create_pool()?;
//! let client = pool.get().await?;
//!
//! let companies = Company::find_all(&client, &CompanyFilter::default()).await?;
//! let updated = Company::update(&client, "acme", &Patch::new().set("logoUrl", "https://a.co/logo.png")).await?;
//! ```

pub mod client;
pub mod columns;
pub mod config;
pub mod error;
pub mod filter;
pub mod ident;
pub mod models;
pub mod patch;
pub mod row;
pub mod sql;
pub mod value;

pub use client::GenericClient;
pub use columns::{ColumnOverrides, column_name};
pub use config::DbConfig;
pub use error::{DbError, DbResult};
pub use filter::{CompanyFilter, JobFilter, company_filter_clause, job_filter_clause};
pub use models::{
    Company, CompanyDetail, CompanyJob, Job, JobDetail, JobListing, NewCompany, NewJob,
};
pub use patch::{Patch, partial_update_clause};
pub use row::{FromRow, RowExt};
pub use sql::{Sql, sql};
pub use value::{BindError, SqlValue};

#[cfg(feature = "pool")]
pub mod pool;

#[cfg(feature = "pool")]
pub use pool::{create_pool, create_pool_with_config};
