//! Errors surfaced by every connector.
//!
//! All backends report failures through these variants so that callers see the same failure
//! surface regardless of which connector is active.

use larder_proto::{TableName, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    /// The table was never registered with `ensure_table`
    #[error("table does not exist: {0}")]
    TableNotExist(TableName),

    /// No record with this id
    #[error("record {id} does not exist in {table}")]
    RecordNotExist { table: TableName, id: Value },

    /// A record with this id is already stored
    #[error("record {id} already exists in {table}")]
    RecordExists { table: TableName, id: Value },

    /// The storage substrate refused the operation
    #[error("permission denied: {0}")]
    PermissionDenied(Box<dyn std::error::Error + Send + Sync + 'static>),

    /// Table or column name outside `[A-Za-z_][A-Za-z0-9_]*`
    #[error("invalid name: {0:?}")]
    InvalidName(String),

    /// Persisted table data could not be decoded
    #[error("corrupt data in {table}: {reason}")]
    Corrupt { table: TableName, reason: String },
}

impl StorageError {
    pub fn permission_denied(err: impl Into<Box<dyn std::error::Error + Send + Sync + 'static>>) -> Self {
        StorageError::PermissionDenied(err.into())
    }

    pub fn is_table_not_exist(&self) -> bool { matches!(self, StorageError::TableNotExist(_)) }

    pub fn is_record_not_exist(&self) -> bool { matches!(self, StorageError::RecordNotExist { .. }) }

    pub fn is_permission_denied(&self) -> bool { matches!(self, StorageError::PermissionDenied(_)) }
}

/// Rejects names that cannot be used as a table identifier.
pub fn check_table_name(table: &TableName) -> Result<(), StorageError> {
    if table.is_sane() {
        Ok(())
    } else {
        Err(StorageError::InvalidName(table.to_string()))
    }
}
