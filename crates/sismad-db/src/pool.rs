//! # Database Handle
//!
//! Store configuration and the `Database` handle that hands out typed
//! repositories.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Store Selection                                    │
//! │                                                                         │
//! │  App startup (sismad-app config)                                       │
//! │       │                                                                 │
//! │       ├── backend = "memory" ──► MemoryStore::new()                    │
//! │       │                                                                 │
//! │       └── backend = "sqlite" ──► DbConfig::new(path)                   │
//! │                                      │                                  │
//! │                                      ▼                                  │
//! │                              SqliteStore::connect(&config)             │
//! │                              (pool + migrations)                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Database::new(store)                                                  │
//! │       │                                                                 │
//! │       ├── clients()    ──► Repository<Client>                          │
//! │       ├── species()    ──► Repository<Species>                         │
//! │       ├── quotes()     ──► Repository<Quote>                           │
//! │       └── manifests()  ──► Repository<Manifest>                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::DbResult;
use crate::repository::{
    ClientRepository, ManifestRepository, QuoteRepository, Repository, SpeciesRepository,
};
use crate::store::{MemoryStore, SqliteStore, Store};

const IN_MEMORY_PATH: &str = ":memory:";

// =============================================================================
// Configuration
// =============================================================================

/// SQLite store configuration.
///
/// ## Example
/// ```rust
/// use sismad_db::DbConfig;
///
/// let config = DbConfig::new("/var/lib/sismad/sismad.db")
///     .max_connections(5)
///     .min_connections(1);
/// assert_eq!(config.max_connections, 5);
/// ```
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Path to the SQLite database file.
    pub database_path: PathBuf,

    /// Maximum number of connections in the pool.
    /// Default: 5
    pub max_connections: u32,

    /// Minimum number of connections to keep alive.
    /// Default: 1
    pub min_connections: u32,

    /// Pool acquire timeout.
    /// Default: 30 seconds
    pub connect_timeout: Duration,

    /// Idle timeout before closing a connection.
    /// Default: 10 minutes
    pub idle_timeout: Duration,

    /// Whether to run migrations on connect.
    /// Default: true
    pub run_migrations: bool,
}

impl DbConfig {
    /// Creates a configuration for the given file. The file is created if
    /// it doesn't exist.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            run_migrations: true,
        }
    }

    pub fn max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn run_migrations(mut self, run: bool) -> Self {
        self.run_migrations = run;
        self
    }

    /// Creates an in-memory SQLite configuration (for testing).
    ///
    /// A single connection that never idles out: closing it would drop
    /// the database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY_PATH),
            max_connections: 1,
            min_connections: 1,
            connect_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(24 * 60 * 60),
            run_migrations: true,
        }
    }

    pub fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY_PATH
    }
}

// =============================================================================
// Database
// =============================================================================

/// Main handle providing repository access.
///
/// Cloning is cheap: both store variants share their state between clones.
///
/// ## Usage
/// ```rust
/// use sismad_db::{Database, MemoryStore};
///
/// let db = Database::new(MemoryStore::new());
/// assert_eq!(db.backend_name(), "memory");
/// ```
#[derive(Debug, Clone)]
pub struct Database {
    store: Store,
}

impl Database {
    /// Wraps an already-built store.
    pub fn new(store: impl Into<Store>) -> Self {
        let store = store.into();
        info!(backend = store.backend_name(), "Database ready");
        Database { store }
    }

    /// A fresh, empty in-memory database.
    pub fn in_memory() -> Self {
        Database::new(MemoryStore::new())
    }

    /// Opens the SQLite store described by `config`.
    pub async fn sqlite(config: DbConfig) -> DbResult<Self> {
        let store = SqliteStore::connect(&config).await?;
        Ok(Database::new(store))
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn backend_name(&self) -> &'static str {
        self.store.backend_name()
    }

    pub fn clients(&self) -> ClientRepository {
        Repository::new(self.store.clone())
    }

    pub fn species(&self) -> SpeciesRepository {
        Repository::new(self.store.clone())
    }

    pub fn quotes(&self) -> QuoteRepository {
        Repository::new(self.store.clone())
    }

    pub fn manifests(&self) -> ManifestRepository {
        Repository::new(self.store.clone())
    }

    /// Checks the store is responsive.
    pub async fn health_check(&self) -> bool {
        self.store.health_check().await
    }

    /// Closes the store. After this, SQLite operations fail.
    pub async fn close(&self) {
        info!("Closing database");
        self.store.close().await;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
