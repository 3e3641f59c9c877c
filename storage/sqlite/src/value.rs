//! Conversions between [`Value`] and SQLite storage classes

use larder_proto::Value;
use rusqlite::types::{Value as SqlValue, ValueRef};

/// Booleans are stored as 0/1 integers, since SQLite has no boolean class
pub fn to_sql(value: &Value) -> SqlValue {
    match value {
        Value::Null => SqlValue::Null,
        Value::Bool(b) => SqlValue::Integer(*b as i64),
        Value::Integer(i) => SqlValue::Integer(*i),
        Value::Float(f) => SqlValue::Real(*f),
        Value::String(s) => SqlValue::Text(s.clone()),
    }
}

/// `declared` is the column's declared type. Integers in a column whose type mentions `BOOL`
/// come back as booleans.
pub fn from_sql(value: ValueRef<'_>, declared: Option<&str>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) if is_bool_type(declared) => Value::Bool(i != 0),
        ValueRef::Integer(i) => Value::Integer(i),
        ValueRef::Real(f) => Value::Float(f),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        // not written by this crate; surfaced as text rather than dropped
        ValueRef::Blob(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
    }
}

fn is_bool_type(declared: Option<&str>) -> bool { declared.is_some_and(|t| t.to_ascii_uppercase().contains("BOOL")) }
