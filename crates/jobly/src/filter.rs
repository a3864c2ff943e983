//! Listing filters.
//!
//! Each entity kind has a fixed set of optional criteria. The clause builders
//! check them in a fixed order, so placeholder numbering only depends on which
//! criteria are present:
//!
//! | kind    | order                                        |
//! |---------|----------------------------------------------|
//! | job     | `title`, `minSalary`, `hasEquity`            |
//! | company | `name`, `minEmployees`, `maxEmployees`       |
//!
//! Text criteria are case-insensitive substring matches (`ILIKE '%…%'`); an
//! empty string is a valid value that matches every row. `%` and `_` inside the
//! text keep their LIKE meaning.

use crate::error::{DbError, DbResult};
use crate::sql::Sql;
use serde::Deserialize;

/// Optional criteria for listing jobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct JobFilter {
    /// Case-insensitive substring of the title.
    pub title: Option<String>,
    /// Inclusive lower bound on salary.
    pub min_salary: Option<i32>,
    /// `Some(true)` keeps only jobs with non-zero equity; anything else is no constraint.
    pub has_equity: Option<bool>,
}

/// Optional criteria for listing companies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyFilter {
    /// Case-insensitive substring of the name.
    pub name: Option<String>,
    /// Inclusive lower bound on employee count.
    pub min_employees: Option<i32>,
    /// Inclusive upper bound on employee count.
    pub max_employees: Option<i32>,
}

/// Accumulates `AND`-joined predicates behind a single `WHERE`.
struct Predicates {
    sql: Sql,
}

impl Predicates {
    fn new() -> Self {
        Self { sql: Sql::empty() }
    }

    /// Start the next predicate.
    fn and(&mut self) -> &mut Sql {
        let sep = if self.sql.is_empty() { "WHERE " } else { " AND " };
        self.sql.push(sep)
    }

    fn finish(self) -> Sql {
        self.sql
    }
}

/// Build the `WHERE` clause for a job listing.
///
/// Returns an empty [`Sql`] when no criteria are set.
pub fn job_filter_clause(filter: &JobFilter) -> Sql {
    let mut w = Predicates::new();

    if let Some(title) = &filter.title {
        w.and()
            .push(r#""title" ILIKE "#)
            .push_bind(format!("%{title}%"));
    }

    if let Some(min_salary) = filter.min_salary {
        w.and().push(r#""salary" >= "#).push_bind(min_salary);
    }

    // Compares against a literal; no parameter.
    if filter.has_equity == Some(true) {
        w.and().push(r#""equity" > 0"#);
    }

    w.finish()
}

/// Build the `WHERE` clause for a company listing.
///
/// Fails with [`DbError::InvalidInput`] if both employee bounds are set and
/// `min_employees > max_employees`; this is checked before anything else.
pub fn company_filter_clause(filter: &CompanyFilter) -> DbResult<Sql> {
    if let (Some(min), Some(max)) = (filter.min_employees, filter.max_employees) {
        if min > max {
            return Err(DbError::invalid_input(
                "minEmployees cannot be greater than maxEmployees",
            ));
        }
    }

    let mut w = Predicates::new();

    if let Some(name) = &filter.name {
        w.and()
            .push(r#""name" ILIKE "#)
            .push_bind(format!("%{name}%"));
    }

    if let Some(min) = filter.min_employees {
        w.and().push(r#""num_employees" >= "#).push_bind(min);
    }

    if let Some(max) = filter.max_employees {
        w.and().push(r#""num_employees" <= "#).push_bind(max);
    }

    Ok(w.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::SqlValue;

    #[test]
    fn job_no_criteria_is_empty() {
        let w = job_filter_clause(&JobFilter::default());
        assert_eq!(w.to_sql(), "");
        assert!(w.params().is_empty());
    }

    #[test]
    fn job_all_criteria_in_order() {
        let w = job_filter_clause(&JobFilter {
            title: Some("eng".into()),
            min_salary: Some(250),
            has_equity: Some(true),
        });
        assert_eq!(
            w.to_sql(),
            r#"WHERE "title" ILIKE $1 AND "salary" >= $2 AND "equity" > 0"#
        );
        assert_eq!(
            w.params(),
            &[SqlValue::Text("%eng%".into()), SqlValue::Int(250)]
        );
    }

    #[test]
    fn job_numbering_skips_absent_fields() {
        let w = job_filter_clause(&JobFilter {
            min_salary: Some(100),
            ..Default::default()
        });
        assert_eq!(w.to_sql(), r#"WHERE "salary" >= $1"#);
        assert_eq!(w.params(), &[SqlValue::Int(100)]);
    }

    #[test]
    fn job_has_equity_adds_no_param() {
        let w = job_filter_clause(&JobFilter {
            has_equity: Some(true),
            ..Default::default()
        });
        assert_eq!(w.to_sql(), r#"WHERE "equity" > 0"#);
        assert!(w.params().is_empty());
    }

    #[test]
    fn job_has_equity_false_is_no_constraint() {
        let w = job_filter_clause(&JobFilter {
            has_equity: Some(false),
            ..Default::default()
        });
        assert!(w.is_empty());
    }

    #[test]
    fn job_empty_title_still_filters() {
        let w = job_filter_clause(&JobFilter {
            title: Some(String::new()),
            ..Default::default()
        });
        assert_eq!(w.to_sql(), r#"WHERE "title" ILIKE $1"#);
        assert_eq!(w.params(), &[SqlValue::Text("%%".into())]);
    }

    #[test]
    fn company_all_criteria_in_order() {
        let w = company_filter_clause(&CompanyFilter {
            name: Some("net".into()),
            min_employees: Some(10),
            max_employees: Some(500),
        })
        .unwrap();
        assert_eq!(
            w.to_sql(),
            r#"WHERE "name" ILIKE $1 AND "num_employees" >= $2 AND "num_employees" <= $3"#
        );
        assert_eq!(
            w.params(),
            &[
                SqlValue::Text("%net%".into()),
                SqlValue::Int(10),
                SqlValue::Int(500),
            ]
        );
    }

    #[test]
    fn company_max_only() {
        let w = company_filter_clause(&CompanyFilter {
            max_employees: Some(5),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(w.to_sql(), r#"WHERE "num_employees" <= $1"#);
    }

    #[test]
    fn company_equal_bounds_are_allowed() {
        let w = company_filter_clause(&CompanyFilter {
            min_employees: Some(7),
            max_employees: Some(7),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(w.params().len(), 2);
    }

    #[test]
    fn company_inverted_bounds_rejected() {
        let err = company_filter_clause(&CompanyFilter {
            name: Some("a".into()),
            min_employees: Some(10),
            max_employees: Some(5),
        })
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn company_no_criteria_is_empty() {
        let w = company_filter_clause(&CompanyFilter::default()).unwrap();
        assert_eq!(w.to_sql(), "");
        assert!(w.params().is_empty());
    }

    #[test]
    fn filters_deserialize_from_camel_case() {
        let f: JobFilter =
            serde_json::from_str(r#"{"minSalary": 250, "hasEquity": true}"#).unwrap();
        assert_eq!(f.min_salary, Some(250));
        assert_eq!(f.has_equity, Some(true));
        assert!(serde_json::from_str::<CompanyFilter>(r#"{"handle": "x"}"#).is_err());
    }
}
