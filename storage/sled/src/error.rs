use larder_core::StorageError;
use larder_proto::TableName;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SledError {
    #[error("Storage error: {0}")]
    StorageError(#[from] sled::Error),
    #[error("Bincode error: {0}")]
    BincodeError(#[from] bincode::Error),
}

impl SledError {
    /// Substrate failures are reported as `PermissionDenied`; undecodable blobs as `Corrupt`.
    pub fn into_storage_error(self, table: &TableName) -> StorageError {
        match self {
            SledError::StorageError(e) => StorageError::permission_denied(e),
            SledError::BincodeError(e) => StorageError::Corrupt { table: table.clone(), reason: e.to_string() },
        }
    }
}

impl From<SledError> for StorageError {
    fn from(err: SledError) -> Self { StorageError::permission_denied(err) }
}
