//! Filter records against compiled clauses. Schema-less backends have no WHERE clause to push down,
//! so they scan their record lists and keep what this module says matches.

use larder_proto::{Record, Value};

use crate::ast::Clause;

pub trait Filterable {
    fn value(&self, name: &str) -> Option<&Value>;
}

impl Filterable for Record {
    fn value(&self, name: &str) -> Option<&Value> { self.get(name) }
}

impl<T: Filterable> Filterable for &T {
    fn value(&self, name: &str) -> Option<&Value> { (**self).value(name) }
}

/// An absent field compares like `null`, so `Eq(Null)` matches it and nothing else does.
pub fn evaluate_clause<R: Filterable>(record: &R, clause: &Clause) -> bool {
    let actual = record.value(clause.field()).unwrap_or(&Value::Null);
    match clause {
        Clause::Eq { value, .. } => actual.matches(value),
        Clause::In { values, .. } => values.iter().any(|v| actual.matches(v)),
    }
}

/// Conjunction of every clause. An empty clause list matches every record.
pub fn evaluate_clauses<R: Filterable>(record: &R, clauses: &[Clause]) -> bool { clauses.iter().all(|c| evaluate_clause(record, c)) }

pub struct FilterIterator<'a, I> {
    iter: I,
    clauses: &'a [Clause],
}

impl<'a, I, R> Iterator for FilterIterator<'a, I>
where
    I: Iterator<Item = R>,
    R: Filterable,
{
    type Item = R;

    fn next(&mut self) -> Option<Self::Item> { self.iter.by_ref().find(|record| evaluate_clauses(record, self.clauses)) }
}

pub trait FilterExt: Iterator + Sized {
    fn filter_clauses(self, clauses: &[Clause]) -> FilterIterator<'_, Self> { FilterIterator { iter: self, clauses } }
}

impl<I: Iterator> FilterExt for I {}
