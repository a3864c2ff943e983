//! Per-entity data access.
//!
//! Each entity owns its statement templates and column layout; the variable
//! `SET` and `WHERE` parts come from [`crate::patch`] and [`crate::filter`].

pub mod company;
pub mod job;

pub use company::{Company, CompanyDetail, CompanyJob, NewCompany};
pub use job::{Job, JobDetail, JobListing, NewJob};

use crate::error::{DbError, DbResult};
use crate::patch::Patch;

/// Reject patches touching fields outside `allowed`.
pub(crate) fn ensure_updatable(patch: &Patch, allowed: &[&str]) -> DbResult<()> {
    let rejected: Vec<&str> = patch.fields().filter(|f| !allowed.contains(f)).collect();
    if rejected.is_empty() {
        Ok(())
    } else {
        Err(DbError::invalid_input(format!(
            "Cannot update field(s): {}",
            rejected.join(", ")
        )))
    }
}
