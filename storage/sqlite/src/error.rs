//! Error types for the SQLite connector

use larder_core::StorageError;
use larder_proto::TableName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Task join error: {0}")]
    TaskJoin(String),

    /// A connector-level outcome decided inside a transaction (missing or duplicate record)
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl SqliteError {
    fn is_no_such_table(&self) -> bool {
        matches!(self, SqliteError::Rusqlite(rusqlite::Error::SqliteFailure(_, Some(msg))) if msg.starts_with("no such table"))
    }

    /// Maps to the shared taxonomy. Anything the engine refused becomes `PermissionDenied`.
    pub fn into_storage_error(self, table: &TableName) -> StorageError {
        match self {
            SqliteError::Storage(e) => e,
            e if e.is_no_such_table() => StorageError::TableNotExist(table.clone()),
            e => StorageError::permission_denied(e),
        }
    }
}

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Storage(e) => e,
            e => StorageError::permission_denied(e),
        }
    }
}
