use std::str::FromStr;
use std::sync::Arc;

use larder::{MemoryConnector, Schema, SledConnector, SqliteConnector, StorageConnector};
use tracing::Level;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// One fresh instance of every connector, labelled for assertion messages
#[allow(unused)]
pub async fn connectors() -> anyhow::Result<Vec<(&'static str, Arc<dyn StorageConnector>)>> {
    Ok(vec![
        ("memory", Arc::new(MemoryConnector::new())),
        ("sled", Arc::new(SledConnector::new_test()?)),
        ("sqlite", Arc::new(SqliteConnector::open_in_memory().await?)),
    ])
}

/// Declares every column the tests touch, so the SQLite connector keeps them
#[allow(unused)]
pub fn schema() -> Schema { Schema::new().column("a", "TEXT").column("foo", "TEXT").column("baz", "TEXT") }
