use async_trait::async_trait;
use larder_proto::{Record, Schema, TableName, Value};
use larder_query::Query;

use crate::error::StorageError;

/// Result of a `get`: a single optional record for an id lookup, a list for everything else.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched {
    One(Option<Record>),
    Many(Vec<Record>),
}

impl Fetched {
    pub fn into_one(self) -> Option<Record> {
        match self {
            Fetched::One(record) => record,
            Fetched::Many(records) => records.into_iter().next(),
        }
    }

    pub fn into_many(self) -> Vec<Record> {
        match self {
            Fetched::One(record) => record.into_iter().collect(),
            Fetched::Many(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Fetched::One(record) => record.is_some() as usize,
            Fetched::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// A storage backend.
///
/// Every operation completes through its returned future; failures are always an `Err`, never a
/// panic, so all backends present the same failure surface. Backends may assume a single logical
/// writer per table.
#[async_trait]
pub trait StorageConnector: Send + Sync {
    /// Registers `table` (creating it with `schema` on SQL backends), then deletes every row if
    /// `reset` is set, then inserts `seed` with the same semantics as [`create`](Self::create).
    async fn ensure_table(&self, table: &TableName, schema: &Schema, seed: Vec<Record>, reset: bool) -> Result<(), StorageError>;

    /// Stores a record, assigning an `id` if it has none, and returns it as stored.
    async fn create(&self, table: &TableName, record: Record) -> Result<Record, StorageError>;

    async fn get(&self, table: &TableName, query: &Query) -> Result<Fetched, StorageError>;

    /// Merges `partial` onto the record with this id and returns the merged record.
    async fn update(&self, table: &TableName, id: &Value, partial: Record) -> Result<Record, StorageError>;

    /// Deletes every matching record and returns how many went. Matching nothing is not an error.
    async fn remove(&self, table: &TableName, query: &Query) -> Result<usize, StorageError>;

    /// Deletes every record but keeps the table registered.
    async fn clear_table(&self, table: &TableName) -> Result<(), StorageError>;
}
