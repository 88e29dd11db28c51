//! Bindable scalar values.
//!
//! [`SqlValue`] is the only thing the compilers put into a value list. It is
//! always sent to the server as a bound parameter and never rendered into SQL
//! text.

use crate::error::{OrmError, OrmResult};
use bytes::BytesMut;
use rust_decimal::Decimal;
use std::error::Error;
use std::str::FromStr;
use tokio_postgres::types::{IsNull, ToSql, Type};

/// A scalar bound to a `$n` placeholder.
///
/// Integers and floats are coerced to the parameter type the server asks for
/// (`int2`, `int4`, `int8`, `float4`, `float8`, `numeric`), so a partial update
/// can carry loosely-typed request data without per-column type tables.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
}

impl SqlValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Text value, if this is one.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Convert a JSON scalar.
    ///
    /// Arrays and objects have no column representation here and are rejected.
    pub fn from_json(value: serde_json::Value) -> OrmResult<Self> {
        use serde_json::Value;

        match value {
            Value::Null => Ok(SqlValue::Null),
            Value::Bool(b) => Ok(SqlValue::Bool(b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(SqlValue::Int(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(SqlValue::Float(f))
                } else {
                    Err(OrmError::validation(format!("number out of range: {n}")))
                }
            }
            Value::String(s) => Ok(SqlValue::Text(s)),
            Value::Array(_) => Err(OrmError::validation("arrays cannot be bound as a column value")),
            Value::Object(_) => Err(OrmError::validation("objects cannot be bound as a column value")),
        }
    }
}

impl TryFrom<serde_json::Value> for SqlValue {
    type Error = OrmError;

    fn try_from(value: serde_json::Value) -> OrmResult<Self> {
        SqlValue::from_json(value)
    }
}

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Bool(v)
    }
}

impl From<i32> for SqlValue {
    fn from(v: i32) -> Self {
        SqlValue::Int(v.into())
    }
}

impl From<i64> for SqlValue {
    fn from(v: i64) -> Self {
        SqlValue::Int(v)
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<Decimal> for SqlValue {
    fn from(v: Decimal) -> Self {
        SqlValue::Decimal(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(SqlValue::Null, Into::into)
    }
}

type BoxError = Box<dyn Error + Sync + Send>;

/// `f32` represents every integer of magnitude up to 2^24.
const F32_EXACT_INT: u64 = 1 << 24;

/// `f64` represents every integer of magnitude up to 2^53.
const F64_EXACT_INT: u64 = 1 << 53;

/// Integer to float, refusing values the float type cannot hold exactly.
fn exact_float(v: i64, limit: u64) -> Result<f64, BoxError> {
    if v.unsigned_abs() > limit {
        return Err(format!("integer {v} cannot be represented exactly as a float").into());
    }
    Ok(v as f64)
}

/// `f64` to `f32`. Fractions round to the nearest `f32`; magnitudes beyond
/// the `f32` range are refused.
fn narrow_float(v: f64) -> Result<f32, BoxError> {
    let narrowed = v as f32;
    if v.is_finite() && narrowed.is_infinite() {
        return Err(format!("{v} is out of range for float4").into());
    }
    Ok(narrowed)
}

impl ToSql for SqlValue {
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, BoxError> {
        match self {
            SqlValue::Null => Ok(IsNull::Yes),
            SqlValue::Bool(v) => v.to_sql_checked(ty, out),
            SqlValue::Int(v) => match *ty {
                Type::INT2 => i16::try_from(*v)?.to_sql_checked(ty, out),
                Type::INT4 => i32::try_from(*v)?.to_sql_checked(ty, out),
                Type::FLOAT4 => (exact_float(*v, F32_EXACT_INT)? as f32).to_sql_checked(ty, out),
                Type::FLOAT8 => exact_float(*v, F64_EXACT_INT)?.to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::from(*v).to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            SqlValue::Float(v) => match *ty {
                Type::FLOAT4 => narrow_float(*v)?.to_sql_checked(ty, out),
                Type::NUMERIC => Decimal::try_from(*v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
            SqlValue::Decimal(v) => v.to_sql_checked(ty, out),
            SqlValue::Text(v) => match *ty {
                // request bodies carry decimals as strings
                Type::NUMERIC => Decimal::from_str(v)?.to_sql_checked(ty, out),
                _ => v.to_sql_checked(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }

    tokio_postgres::types::to_sql_checked!();
}
