use std::sync::{Arc, Mutex};

use larder_proto::{Record, Schema, TableName, Value};
use larder_query::Query;
use tracing::debug;

use crate::connector::{Fetched, StorageConnector};
use crate::error::StorageError;
use crate::memory::MemoryConnector;

/// Entry point for callers: forwards every operation to the active connector.
///
/// The connector can be swapped at any time. Tables are not migrated between connectors; each
/// one keeps its own namespace, so a freshly installed backend starts out with whatever it
/// already held (nothing, unless it is durable).
pub struct Storage {
    connector: Mutex<Arc<dyn StorageConnector>>,
}

impl Default for Storage {
    fn default() -> Self { Self::new(Arc::new(MemoryConnector::new())) }
}

impl Storage {
    pub fn new(connector: Arc<dyn StorageConnector>) -> Self { Self { connector: Mutex::new(connector) } }

    /// The connector operations are currently forwarded to.
    pub fn connector(&self) -> Arc<dyn StorageConnector> { self.connector.lock().expect("Mutex poisoned").clone() }

    /// Installs `connector` and returns the one it replaces. Calls already in flight finish on the old one.
    pub fn set_connector(&self, connector: Arc<dyn StorageConnector>) -> Arc<dyn StorageConnector> {
        debug!("storage: swapping active connector");
        std::mem::replace(&mut *self.connector.lock().expect("Mutex poisoned"), connector)
    }

    pub async fn ensure_table(
        &self,
        table: impl Into<TableName>,
        schema: &Schema,
        seed: Vec<Record>,
        reset: bool,
    ) -> Result<(), StorageError> {
        self.connector().ensure_table(&table.into(), schema, seed, reset).await
    }

    pub async fn create(&self, table: impl Into<TableName>, record: Record) -> Result<Record, StorageError> {
        self.connector().create(&table.into(), record).await
    }

    pub async fn get(&self, table: impl Into<TableName>, query: impl Into<Query>) -> Result<Fetched, StorageError> {
        self.connector().get(&table.into(), &query.into()).await
    }

    pub async fn update(&self, table: impl Into<TableName>, id: impl Into<Value>, partial: Record) -> Result<Record, StorageError> {
        self.connector().update(&table.into(), &id.into(), partial).await
    }

    pub async fn remove(&self, table: impl Into<TableName>, query: impl Into<Query>) -> Result<usize, StorageError> {
        self.connector().remove(&table.into(), &query.into()).await
    }

    pub async fn clear_table(&self, table: impl Into<TableName>) -> Result<(), StorageError> { self.connector().clear_table(&table.into()).await }
}
