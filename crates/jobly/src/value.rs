//! Loosely typed scalar values bound as query parameters.
//!
//! Update payloads arrive as JSON objects whose values may be any scalar. A
//! [`SqlValue`] keeps that value as-is and only commits to a concrete Postgres
//! encoding when it is bound, based on the type of the column it lands in.
//! An integer can therefore update an `integer`, `bigint` or `numeric` column
//! without the caller knowing which one it is.

use bytes::BytesMut;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type, to_sql_checked};

/// A value that cannot be encoded for the column it is bound to.
///
/// Returned from [`SqlValue`]'s `ToSql` impl; [`crate::DbError::from_db_error`]
/// recognizes it and reports the statement as invalid input.
#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("cannot bind {kind} value to a column of type {ty}")]
    Mismatch { kind: &'static str, ty: String },

    #[error("{value} is out of range for a column of type {ty}")]
    OutOfRange { value: i64, ty: String },

    #[error("'{value}' is not a valid number: {message}")]
    InvalidNumber { value: String, message: String },
}

/// A scalar parameter value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn kind(&self) -> &'static str {
        match self {
            SqlValue::Null => "null",
            SqlValue::Bool(_) => "boolean",
            SqlValue::Int(_) => "integer",
            SqlValue::Float(_) => "float",
            SqlValue::Text(_) => "text",
        }
    }

    fn mismatch(&self, ty: &Type) -> Box<dyn Error + Sync + Send> {
        Box::new(BindError::Mismatch {
            kind: self.kind(),
            ty: ty.to_string(),
        })
    }
}

fn out_of_range(value: i64, ty: &Type) -> Box<dyn Error + Sync + Send> {
    Box::new(BindError::OutOfRange {
        value,
        ty: ty.to_string(),
    })
}

fn invalid_number(
    value: impl fmt::Display,
    err: rust_decimal::Error,
) -> Box<dyn Error + Sync + Send> {
    Box::new(BindError::InvalidNumber {
        value: value.to_string(),
        message: err.to_string(),
    })
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => f.write_str("NULL"),
            SqlValue::Bool(b) => write!(f, "{b}"),
            SqlValue::Int(n) => write!(f, "{n}"),
            SqlValue::Float(x) => write!(f, "{x}"),
            SqlValue::Text(s) => f.write_str(s),
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(
        &self,
        ty: &Type,
        out: &mut BytesMut,
    ) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(b) => match *ty {
                Type::BOOL => b.to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            SqlValue::Int(n) => match *ty {
                Type::INT2 => i16::try_from(*n)
                    .map_err(|_| out_of_range(*n, ty))?
                    .to_sql(ty, out),
                Type::INT4 => i32::try_from(*n)
                    .map_err(|_| out_of_range(*n, ty))?
                    .to_sql(ty, out),
                Type::INT8 => n.to_sql(ty, out),
                Type::FLOAT4 => (*n as f32).to_sql(ty, out),
                Type::FLOAT8 => (*n as f64).to_sql(ty, out),
                Type::NUMERIC => Decimal::from(*n).to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            SqlValue::Float(x) => match *ty {
                Type::FLOAT4 => (*x as f32).to_sql(ty, out),
                Type::FLOAT8 => x.to_sql(ty, out),
                Type::NUMERIC => Decimal::try_from(*x)
                    .map_err(|e| invalid_number(x, e))?
                    .to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
            SqlValue::Text(s) => match *ty {
                Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME | Type::UNKNOWN => {
                    s.as_str().to_sql(ty, out)
                }
                Type::NUMERIC => Decimal::from_str(s)
                    .map_err(|e| invalid_number(s, e))?
                    .to_sql(ty, out),
                _ => Err(self.mismatch(ty)),
            },
        }
    }

    fn accepts(ty: &Type) -> bool {
        matches!(
            *ty,
            Type::BOOL
                | Type::INT2
                | Type::INT4
                | Type::INT8
                | Type::FLOAT4
                | Type::FLOAT8
                | Type::NUMERIC
                | Type::TEXT
                | Type::VARCHAR
                | Type::BPCHAR
                | Type::NAME
                | Type::UNKNOWN
        )
    }

    to_sql_checked!();
}

macro_rules! impl_from {
    ($($t:ty => $variant:ident via $conv:expr),* $(,)?) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::$variant($conv(v))
                }
            }
        )*
    };
}

impl_from! {
    bool => Bool via std::convert::identity,
    i16 => Int via i64::from,
    i32 => Int via i64::from,
    i64 => Int via std::convert::identity,
    f32 => Float via f64::from,
    f64 => Float via std::convert::identity,
    String => Text via std::convert::identity,
    &str => Text via str::to_string,
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(value: &SqlValue, ty: &Type) -> Result<IsNull, Box<dyn Error + Sync + Send>> {
        let mut buf = BytesMut::new();
        value.to_sql_checked(ty, &mut buf)
    }

    #[test]
    fn deserializes_json_scalars() {
        let values: Vec<SqlValue> =
            serde_json::from_str(r#"[null, true, 5, 0.25, "acme"]"#).unwrap();
        assert_eq!(
            values,
            vec![
                SqlValue::Null,
                SqlValue::Bool(true),
                SqlValue::Int(5),
                SqlValue::Float(0.25),
                SqlValue::Text("acme".into()),
            ]
        );
    }

    #[test]
    fn serializes_back_to_plain_json() {
        let json = serde_json::to_string(&vec![SqlValue::Null, SqlValue::Int(3)]).unwrap();
        assert_eq!(json, "[null,3]");
    }

    #[test]
    fn int_binds_to_integer_family_and_numeric() {
        let v = SqlValue::Int(42);
        for ty in [Type::INT2, Type::INT4, Type::INT8, Type::FLOAT8, Type::NUMERIC] {
            assert!(matches!(encode(&v, &ty), Ok(IsNull::No)), "{ty}");
        }
    }

    #[test]
    fn int_out_of_range_for_int4_is_rejected() {
        let v = SqlValue::Int(i64::from(i32::MAX) + 1);
        assert!(encode(&v, &Type::INT4).is_err());
        assert!(encode(&v, &Type::INT8).is_ok());
    }

    #[test]
    fn text_parses_into_numeric() {
        assert!(encode(&SqlValue::Text("0.5".into()), &Type::NUMERIC).is_ok());
        assert!(encode(&SqlValue::Text("half".into()), &Type::NUMERIC).is_err());
    }

    #[test]
    fn null_binds_anywhere_accepted() {
        assert!(matches!(encode(&SqlValue::Null, &Type::INT4), Ok(IsNull::Yes)));
        assert!(matches!(encode(&SqlValue::Null, &Type::TEXT), Ok(IsNull::Yes)));
    }

    #[test]
    fn mismatched_types_are_rejected() {
        assert!(encode(&SqlValue::Bool(true), &Type::INT4).is_err());
        assert!(encode(&SqlValue::Text("x".into()), &Type::BOOL).is_err());
        assert!(encode(&SqlValue::Int(1), &Type::TEXT).is_err());
    }

    #[test]
    fn bind_failures_are_typed() {
        let err = encode(&SqlValue::Float(60.0), &Type::INT4).err().unwrap();
        assert!(err.is::<BindError>());
        assert_eq!(err.to_string(), "cannot bind float value to a column of type int4");

        let err = encode(&SqlValue::Int(i64::from(i32::MAX) + 1), &Type::INT4).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::OutOfRange { .. })
        ));

        let err = encode(&SqlValue::Text("half".into()), &Type::NUMERIC).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<BindError>(),
            Some(BindError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(SqlValue::from(None::<i32>), SqlValue::Null);
        assert_eq!(SqlValue::from(Some("x")), SqlValue::Text("x".into()));
    }
}
