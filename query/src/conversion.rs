use larder_proto::Value;
use std::convert::TryFrom;

use crate::ast::{Condition, Conditions, Query};
use crate::error::QueryError;

/// `null` is every record, a scalar is an id lookup, and an object maps fields to a scalar
/// (equality) or an array of scalars (membership). Object key order is preserved.
impl TryFrom<serde_json::Value> for Query {
    type Error = QueryError;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Null => Ok(Query::All),
            serde_json::Value::Object(map) => {
                let mut conditions = Conditions::new();
                for (field, value) in map {
                    let condition = Condition::try_from(value).map_err(|got| QueryError::InvalidCondition { field: field.clone(), got })?;
                    conditions.insert(field, condition);
                }
                Ok(Query::Where(conditions))
            }
            serde_json::Value::Array(_) => Err(QueryError::InvalidQuery(json.to_string())),
            scalar => Value::try_from(scalar).map(Query::Id).map_err(|e| QueryError::InvalidQuery(e.to_string())),
        }
    }
}

impl TryFrom<&str> for Query {
    type Error = QueryError;

    fn try_from(json: &str) -> Result<Self, Self::Error> {
        let json: serde_json::Value = serde_json::from_str(json).map_err(|e| QueryError::InvalidQuery(e.to_string()))?;
        Query::try_from(json)
    }
}

impl TryFrom<serde_json::Value> for Condition {
    type Error = String;

    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        match json {
            serde_json::Value::Array(items) => {
                items.into_iter().map(|item| Value::try_from(item).map_err(|e| e.to_string())).collect::<Result<Vec<_>, _>>().map(Condition::In)
            }
            other => Value::try_from(other).map(Condition::Eq).map_err(|e| e.to_string()),
        }
    }
}
