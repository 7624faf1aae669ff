use std::fmt;

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::{
    errors::GraphBridgeError,
    types::{HostType, ScalarType, SqlType},
};

/// A nullable cell value, either loaded from a result set or held by the host graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int(i32),
    Long(i64),
    Double(#[serde(with = "double_repr")] f64),
    Text(String),
    List(Vec<Value>),
}

/// JSON has no literal for infinities or NaN, so those travel as strings.
mod double_repr {
    use std::fmt;

    use serde::{Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_finite() {
            serializer.serialize_f64(*value)
        } else if value.is_nan() {
            serializer.serialize_str("NaN")
        } else if value.is_sign_positive() {
            serializer.serialize_str("inf")
        } else {
            serializer.serialize_str("-inf")
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(DoubleVisitor)
    }

    struct DoubleVisitor;

    impl de::Visitor<'_> for DoubleVisitor {
        type Value = f64;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a number or one of \"inf\", \"-inf\", \"NaN\"")
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
            Ok(v as f64)
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
            match v {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "NaN" => Ok(f64::NAN),
                other => Err(E::invalid_value(de::Unexpected::Str(other), &self)),
            }
        }
    }
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Scalar type this value naturally belongs to, `None` for null.
    pub fn scalar_type(&self) -> Option<ScalarType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(ScalarType::Boolean),
            Value::Int(_) => Some(ScalarType::Integer),
            Value::Long(_) => Some(ScalarType::Long),
            Value::Double(_) => Some(ScalarType::Double),
            Value::Text(_) | Value::List(_) => Some(ScalarType::String),
        }
    }

    /// Stringified identity used to match external keys across loads.
    pub fn key_string(&self) -> Option<String> {
        match self {
            Value::Null => None,
            Value::Text(text) => Some(text.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Converts the value into the given scalar type.
    ///
    /// Nulls stay null for every target. Integral conversions are range
    /// checked and text is parsed; anything else is a [`GraphBridgeError::TypeMismatch`].
    pub fn cast_to(&self, target: ScalarType) -> Result<Value, GraphBridgeError> {
        if self.is_null() {
            return Ok(Value::Null);
        }
        let cast = match (target, self) {
            (ScalarType::String, Value::Text(text)) => Some(Value::Text(text.clone())),
            (ScalarType::String, other) => Some(Value::Text(other.to_string())),

            (ScalarType::Boolean, Value::Bool(b)) => Some(Value::Bool(*b)),
            (ScalarType::Boolean, Value::Int(i)) => int_to_bool(i64::from(*i)),
            (ScalarType::Boolean, Value::Long(i)) => int_to_bool(*i),
            (ScalarType::Boolean, Value::Text(text)) => parse_bool(text).map(Value::Bool),

            (ScalarType::Integer, Value::Int(i)) => Some(Value::Int(*i)),
            (ScalarType::Integer, Value::Long(i)) => i32::try_from(*i).ok().map(Value::Int),
            (ScalarType::Integer, Value::Double(d)) => integral(*d)
                .and_then(|i| i32::try_from(i).ok())
                .map(Value::Int),
            (ScalarType::Integer, Value::Text(text)) => text.trim().parse().ok().map(Value::Int),

            (ScalarType::Long, Value::Int(i)) => Some(Value::Long(i64::from(*i))),
            (ScalarType::Long, Value::Long(i)) => Some(Value::Long(*i)),
            (ScalarType::Long, Value::Double(d)) => integral(*d).map(Value::Long),
            (ScalarType::Long, Value::Text(text)) => text.trim().parse().ok().map(Value::Long),

            (ScalarType::Double, Value::Int(i)) => Some(Value::Double(f64::from(*i))),
            (ScalarType::Double, Value::Long(i)) => Some(Value::Double(*i as f64)),
            (ScalarType::Double, Value::Double(d)) => Some(Value::Double(*d)),
            (ScalarType::Double, Value::Text(text)) => {
                text.trim().parse().ok().map(Value::Double)
            }

            _ => None,
        };
        cast.ok_or_else(|| GraphBridgeError::type_mismatch(self.describe(), target.to_string()))
    }

    /// Converts the value into a host column type, element-wise for lists.
    pub fn cast_to_host(&self, target: HostType) -> Result<Value, GraphBridgeError> {
        match (target, self) {
            (_, Value::Null) => Ok(Value::Null),
            (HostType::List(element), Value::List(items)) => items
                .iter()
                .map(|item| item.cast_to(element))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::List),
            (HostType::List(_), other) => Err(GraphBridgeError::type_mismatch(
                other.describe(),
                target.to_string(),
            )),
            (scalar, other) => other.cast_to(scalar.scalar_type()),
        }
    }

    /// Materializes a raw SQLite cell according to the column's observed type.
    pub fn from_sql(raw: ValueRef<'_>, sql_type: SqlType) -> Value {
        let scalar = sql_type.scalar_type();
        match raw {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => match scalar {
                ScalarType::Boolean => Value::Bool(i != 0),
                ScalarType::Integer => i32::try_from(i).map_or(Value::Long(i), Value::Int),
                ScalarType::Long => Value::Long(i),
                ScalarType::Double => Value::Double(i as f64),
                ScalarType::String => Value::Text(i.to_string()),
            },
            ValueRef::Real(d) => match scalar {
                ScalarType::String => Value::Text(d.to_string()),
                _ => Value::Double(d),
            },
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
                let text = String::from_utf8_lossy(bytes).into_owned();
                match scalar {
                    ScalarType::Boolean => parse_bool(&text).map_or(Value::Text(text), Value::Bool),
                    ScalarType::Double => text.trim().parse().map_or(Value::Text(text), Value::Double),
                    _ => Value::Text(text),
                }
            }
        }
    }

    fn describe(&self) -> String {
        match self {
            Value::Text(text) => format!("'{text}'"),
            other => other.to_string(),
        }
    }
}

/// Relational type implied by a raw SQLite cell when no declared type exists.
pub fn storage_sql_type(raw: ValueRef<'_>) -> SqlType {
    match raw {
        ValueRef::Null => SqlType::Other,
        ValueRef::Integer(_) => SqlType::BigInt,
        ValueRef::Real(_) => SqlType::Double,
        ValueRef::Text(_) => SqlType::NVarchar,
        ValueRef::Blob(_) => SqlType::Blob,
    }
}

fn int_to_bool(value: i64) -> Option<Value> {
    match value {
        0 => Some(Value::Bool(false)),
        1 => Some(Value::Bool(true)),
        _ => None,
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        Some(false)
    } else {
        None
    }
}

fn integral(value: f64) -> Option<i64> {
    if value.fract() == 0.0 && value >= i64::MIN as f64 && value <= i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Long(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Text(text) => f.write_str(text),
            Value::List(items) => {
                f.write_str("[")?;
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        let out = match self {
            Value::Null => ToSqlOutput::Owned(rusqlite::types::Value::Null),
            Value::Bool(b) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*b))),
            Value::Int(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(i64::from(*i))),
            Value::Long(i) => ToSqlOutput::Owned(rusqlite::types::Value::Integer(*i)),
            Value::Double(d) => ToSqlOutput::Owned(rusqlite::types::Value::Real(*d)),
            Value::Text(text) => ToSqlOutput::Borrowed(ValueRef::Text(text.as_bytes())),
            Value::List(_) => {
                return Err(rusqlite::Error::ToSqlConversionFailure(Box::new(
                    GraphBridgeError::unsupported_type("list values cannot be bound"),
                )));
            }
        };
        Ok(out)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}
