//! Queries over larder tables.
//!
//! A [`Query`](ast::Query) is either every record, an id lookup, or an ordered set of field
//! conditions. [`compile`] turns field conditions into [`Clause`](ast::Clause)s, which SQL
//! backends render into statements and schema-less backends evaluate with
//! [`selection::filter`].

pub mod ast;
mod compile;
pub mod conversion;
pub mod error;
pub mod selection {
    pub mod filter;
}

pub use ast::{Clause, Condition, Conditions, Operator, Query};
pub use compile::compile;
pub use error::QueryError;
