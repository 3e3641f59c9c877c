use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("condition on `{field}` must be a scalar or a list of scalars, got {got}")]
    InvalidCondition { field: String, got: String },
    #[error("query must be null, a scalar id or an object of conditions, got {0}")]
    InvalidQuery(String),
}
