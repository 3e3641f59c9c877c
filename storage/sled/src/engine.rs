use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use larder_core::{error::check_table_name, table::RecordTable, Fetched, StorageConnector, StorageError};
use larder_proto::{Record, Schema, TableName, Value};
use larder_query::Query;
use sled::{Config, Db, Tree};
use tracing::{debug, warn};

use crate::error::SledError;

/// Tree used when none is given.
pub const DEFAULT_TREE: &str = "larder";

const TABLE_PREFIX: &str = "table_";

pub struct SledConnector {
    db: Db,
    tree: Tree,
    // serializes read-modify-write cycles issued through this handle
    write_lock: Mutex<()>,
}

impl SledConnector {
    pub fn with_homedir_folder(folder_name: &str) -> anyhow::Result<Self> {
        let dir = dirs::home_dir().ok_or_else(|| anyhow::anyhow!("Failed to get home directory"))?.join(folder_name);

        Self::with_path(dir)
    }

    pub fn with_path(path: PathBuf) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&path)?;
        let dbpath = path.join("sled");
        let db = sled::open(&dbpath)?;
        Ok(Self::open(db, DEFAULT_TREE)?)
    }

    pub fn new() -> anyhow::Result<Self> { Self::with_homedir_folder(".larder") }

    pub fn new_test() -> anyhow::Result<Self> {
        let db = Config::new().temporary(true).flush_every_ms(None).open()?;
        Ok(Self::open(db, DEFAULT_TREE)?)
    }

    /// Uses `tree_name` of an already open database. Connectors on different trees of the same
    /// database have separate table namespaces.
    pub fn open(db: Db, tree_name: &str) -> Result<Self, SledError> {
        let tree = db.open_tree(tree_name)?;
        Ok(Self { db, tree, write_lock: Mutex::new(()) })
    }

    pub fn db(&self) -> &Db { &self.db }

    /// Lists registered tables by looking for keys that start with `table_`
    pub fn list_tables(&self) -> Result<Vec<TableName>, StorageError> {
        let mut tables = Vec::new();
        for item in self.tree.scan_prefix(TABLE_PREFIX) {
            let (key, _) = item.map_err(StorageError::permission_denied)?;
            // Skip keys that aren't valid UTF-8
            let Ok(name) = String::from_utf8(key.to_vec()) else { continue };
            if let Some(table) = name.strip_prefix(TABLE_PREFIX) {
                tables.push(table.into());
            }
        }
        Ok(tables)
    }

    pub async fn delete_all_tables(&self) -> Result<bool, StorageError> {
        let any_deleted = !self.tree.is_empty();
        self.tree.clear().map_err(StorageError::permission_denied)?;
        self.flush().await?;
        Ok(any_deleted)
    }

    fn key(table: &TableName) -> String { format!("{TABLE_PREFIX}{table}") }

    fn load(&self, table: &TableName) -> Result<Option<RecordTable>, StorageError> {
        let Some(bytes) = self.tree.get(Self::key(table)).map_err(|e| SledError::from(e).into_storage_error(table))? else {
            return Ok(None);
        };
        let records = bincode::deserialize(&bytes).map_err(|e| SledError::from(e).into_storage_error(table))?;
        Ok(Some(records))
    }

    fn store(&self, table: &TableName, records: &RecordTable) -> Result<(), StorageError> {
        let bytes = bincode::serialize(records).map_err(|e| SledError::from(e).into_storage_error(table))?;
        debug!("sled: writing {} ({} records, {} bytes)", table, records.len(), bytes.len());
        self.tree.insert(Self::key(table), bytes).map_err(|e| SledError::from(e).into_storage_error(table))?;
        Ok(())
    }

    /// Reads the table, applies `f`, and writes the table back if `f` succeeded.
    fn mutate<T>(&self, table: &TableName, f: impl FnOnce(&mut RecordTable) -> Result<T, StorageError>) -> Result<T, StorageError> {
        let _guard = self.write_lock.lock().expect("Mutex poisoned");
        let mut records = self.load(table)?.ok_or_else(|| StorageError::TableNotExist(table.clone()))?;
        let result = f(&mut records)?;
        self.store(table, &records)?;
        Ok(result)
    }

    async fn flush(&self) -> Result<(), StorageError> {
        self.tree.flush_async().await.map_err(StorageError::permission_denied)?;
        Ok(())
    }
}

#[async_trait]
impl StorageConnector for SledConnector {
    async fn ensure_table(&self, table: &TableName, _schema: &Schema, seed: Vec<Record>, reset: bool) -> Result<(), StorageError> {
        check_table_name(table)?;
        {
            let _guard = self.write_lock.lock().expect("Mutex poisoned");
            let existing = self.load(table)?;
            if existing.is_none() {
                debug!("sled: registered table {table}");
            }
            let untouched = existing.is_some() && !reset && seed.is_empty();
            let mut records = existing.unwrap_or_default();
            if reset {
                records.clear();
            }
            for record in &seed {
                records.insert(table, record)?;
            }
            if !untouched {
                self.store(table, &records)?;
            }
        }
        self.flush().await
    }

    async fn create(&self, table: &TableName, record: Record) -> Result<Record, StorageError> {
        let stored = self.mutate(table, |records| records.insert(table, &record))?;
        self.flush().await?;
        Ok(stored)
    }

    async fn get(&self, table: &TableName, query: &Query) -> Result<Fetched, StorageError> {
        let records = self.load(table)?.ok_or_else(|| StorageError::TableNotExist(table.clone()))?;
        Ok(records.select(query))
    }

    async fn update(&self, table: &TableName, id: &Value, partial: Record) -> Result<Record, StorageError> {
        let merged = self.mutate(table, |records| records.update(table, id, &partial))?;
        self.flush().await?;
        Ok(merged)
    }

    async fn remove(&self, table: &TableName, query: &Query) -> Result<usize, StorageError> {
        let removed = self.mutate(table, |records| Ok(records.remove(query)))?;
        if removed == 0 {
            debug!("sled: remove matched nothing in {table}");
        }
        self.flush().await?;
        Ok(removed)
    }

    async fn clear_table(&self, table: &TableName) -> Result<(), StorageError> {
        self.mutate(table, |records| {
            records.clear();
            Ok(())
        })
        .inspect_err(|e| {
            if e.is_table_not_exist() {
                warn!("sled: refusing to clear unregistered table {table}");
            }
        })?;
        self.flush().await
    }
}
