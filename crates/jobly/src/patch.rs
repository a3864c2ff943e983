//! Partial updates.
//!
//! A [`Patch`] is the set of fields a caller wants to change, in the order
//! they were given. [`partial_update_clause`] turns it into the body of an
//! `UPDATE ... SET` statement:
//!
//! ```ignore
//! use jobly::{Patch, partial_update_clause};
//!
//! let patch = Patch::new().set("numEmployees", 5).set("name", "Acme");
//! let set = partial_update_clause(&patch, &[("numEmployees", "num_employees")])?;
//!
//! assert_eq!(set.to_sql(), r#""num_employees"=$1, "name"=$2"#);
//! ```

use crate::columns::{ColumnOverrides, column_name};
use crate::error::{DbError, DbResult};
use crate::sql::Sql;
use crate::value::SqlValue;
use serde::de::{Deserialize, Deserializer, MapAccess, Visitor};
use std::fmt;

/// Ordered field → value changes for a single record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Patch {
    fields: Vec<(String, SqlValue)>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder form).
    pub fn set(mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field.
    ///
    /// If `field` is already present its value is replaced and it keeps its
    /// original position.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<SqlValue>) -> &mut Self {
        let field = field.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(f, _)| *f == field) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((field, value)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&SqlValue> {
        self.fields
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Field names in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(f, _)| f.as_str())
    }

    /// `(field, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.fields.iter().map(|(f, v)| (f.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for Patch
where
    K: Into<String>,
    V: Into<SqlValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut patch = Patch::new();
        for (k, v) in iter {
            patch.insert(k, v);
        }
        patch
    }
}

impl<'de> Deserialize<'de> for Patch {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct PatchVisitor;

        impl<'de> Visitor<'de> for PatchVisitor {
            type Value = Patch;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of field names to scalar values")
            }

            // Document order is kept so the generated SET list follows the payload.
            fn visit_map<A>(self, mut map: A) -> Result<Patch, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut patch = Patch::new();
                while let Some((field, value)) = map.next_entry::<String, SqlValue>()? {
                    patch.insert(field, value);
                }
                Ok(patch)
            }
        }

        deserializer.deserialize_map(PatchVisitor)
    }
}

/// Build the `SET` body for a partial update.
///
/// Each field becomes `"<column>"=$<n>`, where the column comes from
/// [`column_name`] and `n` counts from 1 in patch order; fragments are joined
/// with `, `. The returned [`Sql`] carries the patch values in the same order.
///
/// A caller appending more parameters (e.g. the key in `WHERE`) with
/// [`Sql::push_bind`] gets placeholder `$<len + 1>` onward.
///
/// Fails with [`DbError::InvalidInput`] if the patch is empty.
pub fn partial_update_clause(patch: &Patch, overrides: ColumnOverrides<'_>) -> DbResult<Sql> {
    if patch.is_empty() {
        return Err(DbError::invalid_input("No data"));
    }

    let mut set = Sql::empty();
    for (i, (field, value)) in patch.iter().enumerate() {
        if i > 0 {
            set.push(", ");
        }
        set.push_ident(column_name(field, overrides))?
            .push("=")
            .push_bind(value.clone());
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPANY: ColumnOverrides<'static> =
        &[("numEmployees", "num_employees"), ("logoUrl", "logo_url")];

    #[test]
    fn single_field_with_override() {
        let patch = Patch::new().set("numEmployees", 5);
        let set = partial_update_clause(&patch, COMPANY).unwrap();
        assert_eq!(set.to_sql(), r#""num_employees"=$1"#);
        assert_eq!(set.params(), &[SqlValue::Int(5)]);
    }

    #[test]
    fn columns_follow_patch_order() {
        let patch = Patch::new()
            .set("name", "New")
            .set("logoUrl", SqlValue::Null)
            .set("description", "d");
        let set = partial_update_clause(&patch, COMPANY).unwrap();
        assert_eq!(
            set.to_sql(),
            r#""name"=$1, "logo_url"=$2, "description"=$3"#
        );
        assert_eq!(
            set.params(),
            &[
                SqlValue::Text("New".into()),
                SqlValue::Null,
                SqlValue::Text("d".into()),
            ]
        );
    }

    #[test]
    fn empty_patch_is_invalid_input() {
        let err = partial_update_clause(&Patch::new(), COMPANY).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(partial_update_clause(&Patch::new(), &[]).is_err());
    }

    #[test]
    fn reinsert_keeps_position() {
        let mut patch = Patch::new().set("a", 1).set("b", 2);
        patch.insert("a", 3);
        assert_eq!(patch.fields().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(patch.get("a"), Some(&SqlValue::Int(3)));
    }

    #[test]
    fn deserializes_in_document_order() {
        let patch: Patch =
            serde_json::from_str(r#"{"title": "T", "salary": 100, "equity": null}"#).unwrap();
        assert_eq!(
            patch.fields().collect::<Vec<_>>(),
            vec!["title", "salary", "equity"]
        );
        let set = partial_update_clause(&patch, &[]).unwrap();
        assert_eq!(set.to_sql(), r#""title"=$1, "salary"=$2, "equity"=$3"#);
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(serde_json::from_str::<Patch>("[1, 2]").is_err());
        assert!(serde_json::from_str::<Patch>(r#"{"a": [1]}"#).is_err());
    }

    #[test]
    fn field_name_cannot_break_out_of_identifier() {
        let patch = Patch::new().set(r#"name"=1, "handle"#, "x");
        let set = partial_update_clause(&patch, &[]).unwrap();
        assert_eq!(set.to_sql(), r#""name""=1, ""handle"=$1"#);
        assert_eq!(set.params().len(), 1);
    }
}
