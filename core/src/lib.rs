pub mod connector;
pub mod error;
pub mod id;
pub mod memory;
pub mod storage;
pub mod table;

pub use connector::{Fetched, StorageConnector};
pub use error::StorageError;
pub use memory::MemoryConnector;
pub use storage::Storage;

pub use larder_proto as proto;
pub use larder_query as query;
