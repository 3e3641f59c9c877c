//! Data model shared by every larder crate: scalar [`Value`]s, flat [`Record`]s, and the
//! [`TableName`]/[`Schema`] pair that identifies and describes a table.

pub mod record;
pub mod table;
pub mod value;

pub use record::*;
pub use table::*;
pub use value::*;
