//! In-process connector. Nothing survives the connector being dropped.

use std::collections::BTreeMap;
use std::sync::RwLock;

use async_trait::async_trait;
use larder_proto::{Record, Schema, TableName, Value};
use larder_query::Query;
use tracing::debug;

use crate::connector::{Fetched, StorageConnector};
use crate::error::{check_table_name, StorageError};
use crate::table::RecordTable;

/// Keeps one [`RecordTable`] per table name. The schema passed to `ensure_table` is ignored.
#[derive(Default)]
pub struct MemoryConnector {
    tables: RwLock<BTreeMap<TableName, RecordTable>>,
}

impl MemoryConnector {
    pub fn new() -> Self { Self::default() }

    pub fn list_tables(&self) -> Vec<TableName> { self.tables.read().expect("RwLock poisoned").keys().cloned().collect() }

    pub fn delete_all_tables(&self) -> bool {
        let mut tables = self.tables.write().expect("RwLock poisoned");
        let any = !tables.is_empty();
        tables.clear();
        any
    }

    fn read<T>(&self, table: &TableName, f: impl FnOnce(&RecordTable) -> T) -> Result<T, StorageError> {
        let tables = self.tables.read().expect("RwLock poisoned");
        let records = tables.get(table).ok_or_else(|| StorageError::TableNotExist(table.clone()))?;
        Ok(f(records))
    }

    fn write<T>(&self, table: &TableName, f: impl FnOnce(&mut RecordTable) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let mut tables = self.tables.write().expect("RwLock poisoned");
        let records = tables.get_mut(table).ok_or_else(|| StorageError::TableNotExist(table.clone()))?;
        f(records)
    }
}

#[async_trait]
impl StorageConnector for MemoryConnector {
    async fn ensure_table(&self, table: &TableName, _schema: &Schema, seed: Vec<Record>, reset: bool) -> Result<(), StorageError> {
        check_table_name(table)?;
        let mut tables = self.tables.write().expect("RwLock poisoned");
        // built aside and swapped in whole, so a failing seed leaves the table as it was
        let mut records = tables.get(table).cloned().unwrap_or_default();
        if reset {
            records.clear();
        }
        for record in &seed {
            records.insert(table, record)?;
        }
        if tables.insert(table.clone(), records).is_none() {
            debug!("memory: registered table {table}");
        }
        Ok(())
    }

    async fn create(&self, table: &TableName, record: Record) -> Result<Record, StorageError> {
        self.write(table, |records| records.insert(table, &record))
    }

    async fn get(&self, table: &TableName, query: &Query) -> Result<Fetched, StorageError> { self.read(table, |records| records.select(query)) }

    async fn update(&self, table: &TableName, id: &Value, partial: Record) -> Result<Record, StorageError> {
        self.write(table, |records| records.update(table, id, &partial))
    }

    async fn remove(&self, table: &TableName, query: &Query) -> Result<usize, StorageError> {
        self.write(table, |records| Ok(records.remove(query)))
    }

    async fn clear_table(&self, table: &TableName) -> Result<(), StorageError> {
        self.write(table, |records| {
            records.clear();
            Ok(())
        })
    }
}
