//! SQLite connector for larder
//!
//! Every table becomes a SQLite table with an `id INTEGER PRIMARY KEY AUTOINCREMENT` column
//! followed by the columns declared when the table was ensured. Statements are generated by
//! [`sql_builder`] and every connector operation runs in a single transaction.
//!
//! Only declared columns are stored: fields outside the schema are dropped on `create` and
//! `update`, and a query on an undeclared column behaves as if the column held NULL.
//!
//! SQLite has no boolean storage class. Booleans are written as `0`/`1` and read back as `Bool`
//! only from columns whose declared type contains `BOOL`; any other column returns them as
//! `Integer`. Declare boolean fields as `BOOLEAN` to keep the round trip exact.
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_storage_sqlite::SqliteConnector;
//!
//! // Open a file-based database
//! let connector = SqliteConnector::open("larder.db").await?;
//!
//! // Or use an in-memory database for testing
//! let connector = SqliteConnector::open_in_memory().await?;
//! ```

mod connection;
mod engine;
mod error;
pub mod sql_builder;
mod value;

pub use connection::{PooledConnection, SqliteConfig, SqliteConnectionManager, DEFAULT_POOL_SIZE};
pub use engine::SqliteConnector;
pub use error::SqliteError;
