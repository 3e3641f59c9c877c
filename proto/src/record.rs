use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::value::{Value, ValueError};

/// Name of the reserved primary key field.
pub const ID_FIELD: &str = "id";

/// A flat, insertion-ordered mapping of field name to scalar value.
///
/// Equality ignores field order, so `{id: 1, a: "x"}` equals `{a: "x", id: 1}`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct Record(IndexMap<String, Value>);

impl Record {
    pub fn new() -> Self { Self(IndexMap::new()) }

    pub fn with_capacity(n: usize) -> Self { Self(IndexMap::with_capacity(n)) }

    pub fn get(&self, field: &str) -> Option<&Value> { self.0.get(field) }

    pub fn contains(&self, field: &str) -> bool { self.0.contains_key(field) }

    /// Sets a field, keeping its original position if it already existed.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> { self.0.insert(field.into(), value.into()) }

    pub fn remove(&mut self, field: &str) -> Option<Value> { self.0.shift_remove(field) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    pub fn fields(&self) -> impl Iterator<Item = &str> { self.0.keys().map(|k| k.as_str()) }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> { self.0.iter().map(|(k, v)| (k.as_str(), v)) }

    /// The record's `id`, if it has a non-null one.
    pub fn id(&self) -> Option<&Value> { self.0.get(ID_FIELD).filter(|v| !v.is_null()) }

    /// Returns a copy of this record with `id` as its first field.
    pub fn with_id(&self, id: Value) -> Record {
        let mut fields = IndexMap::with_capacity(self.0.len() + 1);
        fields.insert(ID_FIELD.to_string(), id);
        for (k, v) in self.0.iter().filter(|(k, _)| k.as_str() != ID_FIELD) {
            fields.insert(k.clone(), v.clone());
        }
        Record(fields)
    }

    /// Copies every field of `partial` except `id` onto this record.
    pub fn merge(&mut self, partial: &Record) {
        for (k, v) in partial.0.iter().filter(|(k, _)| k.as_str() != ID_FIELD) {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn into_inner(self) -> IndexMap<String, Value> { self.0 }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self { Record(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect()) }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;
    fn into_iter(self) -> Self::IntoIter { self.0.into_iter() }
}

impl From<IndexMap<String, Value>> for Record {
    fn from(map: IndexMap<String, Value>) -> Self { Record(map) }
}

impl TryFrom<serde_json::Value> for Record {
    type Error = ValueError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Object(map) => {
                let mut record = Record::with_capacity(map.len());
                for (k, v) in map {
                    record.insert(k, Value::try_from(v)?);
                }
                Ok(record)
            }
            other => Err(ValueError::NotScalar(other.to_string())),
        }
    }
}

impl From<Record> for serde_json::Value {
    fn from(record: Record) -> Self { serde_json::Value::Object(record.0.into_iter().map(|(k, v)| (k, v.into())).collect()) }
}

/// Builds a [`Record`] from `field => value` pairs.
///
/// ```
/// use larder_proto::{record, Value};
/// let r = record! { "name" => "Ada", "age" => 36 };
/// assert_eq!(r.get("age"), Some(&Value::Integer(36)));
/// ```
#[macro_export]
macro_rules! record {
    () => { $crate::Record::new() };
    ($($field:expr => $value:expr),+ $(,)?) => {{
        let mut record = $crate::Record::new();
        $( record.insert($field, $value); )+
        record
    }};
}
