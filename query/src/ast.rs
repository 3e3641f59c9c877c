use indexmap::IndexMap;
use larder_proto::{Value, ID_FIELD};
use serde::{Deserialize, Serialize};

/// What a `get`/`remove` call targets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub enum Query {
    /// No query: every record in the table.
    #[default]
    All,
    /// The single record whose `id` equals this value.
    Id(Value),
    /// Records matching every condition (AND only).
    Where(Conditions),
}

/// Field conditions in declaration order. Setting a field twice replaces the earlier condition in place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Conditions(IndexMap<String, Condition>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Condition {
    Eq(Value),
    In(Vec<Value>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Eq, // =
    In, // IN
}

/// One compiled filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Clause {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
}

impl Query {
    pub fn all() -> Self { Query::All }

    pub fn id(id: impl Into<Value>) -> Self { Query::Id(id.into()) }

    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self { Query::Where(Conditions::new().eq(field, value)) }

    pub fn any_of<V: Into<Value>>(field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Query::Where(Conditions::new().any_of(field, values))
    }

    pub fn is_id(&self) -> bool { matches!(self, Query::Id(_)) }

    /// The filter clauses this query selects with. An id lookup is a single `id` equality clause and
    /// bypasses the condition compiler.
    pub fn clauses(&self) -> Vec<Clause> {
        match self {
            Query::All => Vec::new(),
            Query::Id(id) => vec![Clause::id(id.clone())],
            Query::Where(conditions) => crate::compile(Some(conditions)),
        }
    }
}

impl From<Conditions> for Query {
    fn from(conditions: Conditions) -> Self { Query::Where(conditions) }
}

impl From<Value> for Query {
    fn from(id: Value) -> Self { Query::Id(id) }
}

impl<T: Into<Query>> From<Option<T>> for Query {
    fn from(query: Option<T>) -> Self { query.map(Into::into).unwrap_or(Query::All) }
}

impl Conditions {
    pub fn new() -> Self { Self(IndexMap::new()) }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(field.into(), Condition::Eq(value.into()));
        self
    }

    pub fn any_of<V: Into<Value>>(mut self, field: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        self.0.insert(field.into(), Condition::In(values.into_iter().map(Into::into).collect()));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, condition: Condition) { self.0.insert(field.into(), condition); }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Condition)> { self.0.iter().map(|(k, v)| (k.as_str(), v)) }

    pub fn len(&self) -> usize { self.0.len() }

    pub fn is_empty(&self) -> bool { self.0.is_empty() }
}

impl Clause {
    pub fn id(id: Value) -> Self { Clause::Eq { field: ID_FIELD.to_string(), value: id } }

    pub fn field(&self) -> &str {
        match self {
            Clause::Eq { field, .. } | Clause::In { field, .. } => field,
        }
    }

    pub fn operator(&self) -> Operator {
        match self {
            Clause::Eq { .. } => Operator::Eq,
            Clause::In { .. } => Operator::In,
        }
    }

    /// Bound parameter values, in placeholder order.
    pub fn values(&self) -> &[Value] {
        match self {
            Clause::Eq { value, .. } => std::slice::from_ref(value),
            Clause::In { values, .. } => values,
        }
    }
}
