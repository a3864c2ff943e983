//! Mapping from external (request-shaped) field names to storage columns.
//!
//! Request payloads use camelCase names (`numEmployees`) while tables use
//! snake_case (`num_employees`). Each entity passes a small override table
//! listing the fields whose names differ; every other field is used as the
//! column name unchanged.

/// Field name → column name overrides.
pub type ColumnOverrides<'a> = &'a [(&'a str, &'a str)];

/// Resolve the storage column for `field`.
///
/// Returns the override if `field` is listed in `overrides`, otherwise `field`
/// itself.
pub fn column_name<'a>(field: &'a str, overrides: &[(&str, &'a str)]) -> &'a str {
    overrides
        .iter()
        .find(|(external, _)| *external == field)
        .map_or(field, |&(_, column)| column)
}
