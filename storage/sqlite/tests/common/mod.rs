use std::path::PathBuf;
use std::str::FromStr;

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

/// A database file path that does not exist yet
#[allow(unused)]
pub fn scratch_db() -> PathBuf { std::env::temp_dir().join(format!("larder-sqlite-{}.db", ulid::Ulid::new())) }
