//! Pooled rusqlite connections

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::SqliteError;

/// Default connection pool size for file databases
pub const DEFAULT_POOL_SIZE: u32 = 10;

static NEXT_MEMORY_DB: AtomicU64 = AtomicU64::new(0);

/// Where the database lives and how it is opened
#[derive(Clone, Debug)]
pub enum SqliteConfig {
    File(PathBuf),
    /// An existing database opened read-only. Every write is refused with `PermissionDenied`.
    ReadOnly(PathBuf),
    /// A database private to one manager, gone once the manager is dropped
    Memory,
}

enum Target {
    File(PathBuf),
    ReadOnly(PathBuf),
    // pooled connections share the database through the URI; `_keeper` holds it open between them
    Memory { uri: String, _keeper: std::sync::Mutex<Connection> },
}

impl Target {
    fn open(&self) -> Result<Connection, SqliteError> {
        let conn = match self {
            Target::File(path) => {
                let conn = Connection::open(path)?;
                conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
                conn
            }
            Target::ReadOnly(path) => Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX)?,
            Target::Memory { uri, .. } => Connection::open(uri)?,
        };
        // pooled writers wait on each other instead of failing with SQLITE_BUSY
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }
}

pub struct SqliteConnectionManager {
    target: Arc<Target>,
    max_size: u32,
}

impl SqliteConnectionManager {
    pub fn new(config: SqliteConfig) -> Result<Self, SqliteError> {
        let (target, max_size) = match config {
            SqliteConfig::File(path) => (Target::File(path), DEFAULT_POOL_SIZE),
            SqliteConfig::ReadOnly(path) => (Target::ReadOnly(path), DEFAULT_POOL_SIZE),
            SqliteConfig::Memory => {
                let uri = format!("file:larder-memory-{}?mode=memory&cache=shared", NEXT_MEMORY_DB.fetch_add(1, Ordering::Relaxed));
                debug!("sqlite: opening {uri}");
                let keeper = Connection::open(&uri)?;
                // shared-cache tables lock per connection, so writers are serialized by the pool
                (Target::Memory { uri, _keeper: std::sync::Mutex::new(keeper) }, 1)
            }
        };
        Ok(Self { target: Arc::new(target), max_size })
    }

    /// A pool builder sized for this database. Callers may tune it further before `build`.
    pub fn pool_builder(&self) -> bb8::Builder<Self> { bb8::Pool::builder().max_size(self.max_size) }
}

/// rusqlite connections are not `Sync`, so the pool hands out this wrapper and every call runs
/// under `spawn_blocking` with the connection locked.
pub struct PooledConnection(Arc<Mutex<Connection>>);

impl PooledConnection {
    pub async fn run<F, T>(&self, f: F) -> Result<T, SqliteError>
    where
        F: FnOnce(&mut Connection) -> Result<T, SqliteError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.0.clone();
        tokio::task::spawn_blocking(move || f(&mut conn.blocking_lock())).await.map_err(|e| SqliteError::TaskJoin(e.to_string()))?
    }
}

impl bb8::ManageConnection for SqliteConnectionManager {
    type Connection = PooledConnection;
    type Error = SqliteError;

    fn connect(&self) -> impl std::future::Future<Output = Result<Self::Connection, Self::Error>> + Send {
        let target = self.target.clone();
        async move {
            let conn = tokio::task::spawn_blocking(move || target.open()).await.map_err(|e| SqliteError::TaskJoin(e.to_string()))??;
            Ok(PooledConnection(Arc::new(Mutex::new(conn))))
        }
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> impl std::future::Future<Output = Result<(), Self::Error>> + Send {
        let conn = PooledConnection(conn.0.clone());
        async move { conn.run(|c| Ok(c.execute_batch("SELECT 1")?)).await }
    }

    fn has_broken(&self, _conn: &mut Self::Connection) -> bool { false }
}
