//! The condition compiler: turns a query mapping into an ordered list of filter clauses.
//!
//! Clause order is observable (it fixes the WHERE text and parameter order of generated SQL) and
//! is compiled in two phases: every equality condition in declaration order, then every
//! membership condition in declaration order.

use tracing::trace;

use crate::ast::{Clause, Condition, Conditions};

/// Compiles `conditions` into clauses. `None` (no query) compiles to no clauses.
pub fn compile(conditions: Option<&Conditions>) -> Vec<Clause> {
    let Some(conditions) = conditions else { return Vec::new() };

    let mut clauses = Vec::with_capacity(conditions.len());
    for (field, condition) in conditions.iter() {
        if let Condition::Eq(value) = condition {
            clauses.push(Clause::Eq { field: field.to_string(), value: value.clone() });
        }
    }
    for (field, condition) in conditions.iter() {
        if let Condition::In(values) = condition {
            clauses.push(Clause::In { field: field.to_string(), values: values.clone() });
        }
    }

    trace!("compiled {} conditions into {:?}", conditions.len(), clauses);
    clauses
}
