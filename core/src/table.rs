//! Schema-less table contents, shared by the in-memory and key-value connectors.
//!
//! A [`RecordTable`] is an insertion-ordered list of records plus the table's id counter. Every
//! operation is a linear scan; the key-value connector serializes the whole struct as one blob.

use larder_proto::{Record, TableName, Value};
use larder_query::selection::filter::{evaluate_clauses, FilterExt};
use larder_query::Query;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::connector::Fetched;
use crate::error::StorageError;
use crate::id::IdAllocator;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordTable {
    ids: IdAllocator,
    records: Vec<Record>,
}

impl RecordTable {
    pub fn new() -> Self { Self::default() }

    pub fn records(&self) -> &[Record] { &self.records }

    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    fn position(&self, id: &Value) -> Option<usize> { self.records.iter().position(|r| r.id().is_some_and(|v| v.matches(id))) }

    pub fn insert(&mut self, table: &TableName, record: &Record) -> Result<Record, StorageError> {
        if let Some(id) = record.id() {
            if self.position(id).is_some() {
                return Err(StorageError::RecordExists { table: table.clone(), id: id.clone() });
            }
        }
        let stored = self.ids.assign(record);
        debug!("{table}: stored record {:?}", stored.id());
        self.records.push(stored.clone());
        Ok(stored)
    }

    pub fn select(&self, query: &Query) -> Fetched {
        match query {
            Query::Id(id) => Fetched::One(self.position(id).map(|i| self.records[i].clone())),
            query => {
                let clauses = query.clauses();
                Fetched::Many(self.records.iter().filter_clauses(&clauses).cloned().collect())
            }
        }
    }

    pub fn update(&mut self, table: &TableName, id: &Value, partial: &Record) -> Result<Record, StorageError> {
        let index = self.position(id).ok_or_else(|| StorageError::RecordNotExist { table: table.clone(), id: id.clone() })?;
        let record = &mut self.records[index];
        record.merge(partial);
        Ok(record.clone())
    }

    /// Removes matching records and returns how many there were.
    pub fn remove(&mut self, query: &Query) -> usize {
        let before = self.records.len();
        match query {
            Query::Id(id) => {
                if let Some(index) = self.position(id) {
                    self.records.remove(index);
                }
            }
            query => {
                let clauses = query.clauses();
                self.records.retain(|r| !evaluate_clauses(r, &clauses));
            }
        }
        before - self.records.len()
    }

    /// Drops every record. The id counter keeps going.
    pub fn clear(&mut self) { self.records.clear(); }
}
