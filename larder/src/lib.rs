//! # Larder
//!
//! Named tables of flat records behind one asynchronous API, with the backend chosen at runtime.
//!
//! ## Core Concepts
//!
//! - **Record**: a flat map of field name to scalar [`Value`], plus a reserved `id` field
//! - **Table**: a named collection of records, registered with `ensure_table`
//! - **Query**: every record, a single id, or field conditions (equality and membership, ANDed)
//! - **Connector**: a backend implementing [`StorageConnector`]
//! - **Storage**: the facade that forwards every call to the active connector
//!
//! ## Connectors
//!
//! - [`MemoryConnector`]: process memory, nothing survives a restart
//! - `SledConnector` (feature `sled`): every table is one blob in a sled tree
//! - `SqliteConnector` (feature `sqlite`): every table is a SQLite table with declared columns
//!
//! ## Example
//!
//! ```rust
//! # use larder::{record, Query, Schema, Storage};
//! # #[tokio::main]
//! # async fn main() -> Result<(), larder::StorageError> {
//! let storage = Storage::default();
//! storage.ensure_table("albums", &Schema::new().column("name", "TEXT"), vec![], true).await?;
//!
//! let album = storage.create("albums", record! { "name" => "Origin of Symmetry" }).await?;
//! let id = album.id().cloned().unwrap();
//!
//! let found = storage.get("albums", Query::eq("name", "Origin of Symmetry")).await?.into_many();
//! assert_eq!(found, vec![album]);
//!
//! storage.update("albums", id.clone(), record! { "name" => "Absolution" }).await?;
//! assert_eq!(storage.remove("albums", Query::Id(id)).await?, 1);
//! # Ok(())
//! # }
//! ```
//!
//! Swapping the backend keeps each connector's tables where they are:
//!
//! ```rust,ignore
//! let previous = storage.set_connector(Arc::new(SqliteConnector::open("larder.db").await?));
//! ```

pub use larder_core as core;
pub use larder_proto as proto;
pub use larder_query as query;

pub use larder_core::{error, Fetched, MemoryConnector, Storage, StorageConnector, StorageError};
pub use larder_proto::{record, Record, Schema, TableName, Value};
pub use larder_query::{Condition, Conditions, Query};

#[cfg(feature = "sled")]
pub use larder_storage_sled::SledConnector;
#[cfg(feature = "sqlite")]
pub use larder_storage_sqlite::SqliteConnector;
