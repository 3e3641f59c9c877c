//! Key-value backed connector for larder.
//!
//! Each table's full record list (plus its id counter) is stored bincode-encoded under a single
//! key of a Sled tree. Every mutation reads the whole table, changes it in memory and writes it
//! back, so the cost of an operation grows with the size of the table. Data survives process
//! restarts.
//!
//! # Example
//!
//! ```rust,ignore
//! use larder_storage_sled::SledConnector;
//!
//! // ~/.larder/sled
//! let connector = SledConnector::new()?;
//!
//! // Or a throwaway database for tests
//! let connector = SledConnector::new_test()?;
//! ```

mod engine;
mod error;

pub use engine::{SledConnector, DEFAULT_TREE};
pub use error::SledError;
