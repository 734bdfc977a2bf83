//! # sismad-app: Application Layer
//!
//! Wires configuration, logging and the document store together and hands
//! the entry forms their services.
//!
//! ## Module Organization
//! ```text
//! sismad_app/
//! ├── lib.rs          ◄─── You are here (App startup)
//! ├── config.rs       ◄─── AppConfig (sismad.toml + SISMAD_* env)
//! ├── logging.rs      ◄─── tracing subscriber
//! ├── error.rs        ◄─── ApiError / AppError
//! └── services/
//!     ├── client.rs   ◄─── Client registry
//!     ├── species.rs  ◄─── Species catalog
//!     ├── quote.rs    ◄─── Quotes (orçamentos)
//!     └── manifest.rs ◄─── Manifests (romaneios)
//! ```
//!
//! ## Startup Sequence
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. AppConfig::load(path)  ── defaults → sismad.toml → SISMAD_* env    │
//! │  2. init_tracing(config.logging.filter)                                │
//! │  3. Store by config.store.backend                                      │
//! │       memory ──► MemoryStore::new()                                    │
//! │       sqlite ──► SqliteStore::connect (pool + migrations)              │
//! │  4. Database::new(store) ──► services                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//! ```rust
//! use sismad_app::{App, AppConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let app = App::from_config(AppConfig::in_memory()).await?;
//! assert_eq!(app.db().backend_name(), "memory");
//! let clients = app.clients().list().await?;
//! assert!(clients.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod services;

pub use config::{AppConfig, StoreBackend};
pub use error::{ApiError, ApiResult, AppError, AppResult, ErrorCode};
pub use services::{ClientService, ManifestService, QuoteService, SpeciesService};

use sismad_db::{Database, MemoryStore};
use std::path::PathBuf;
use tracing::info;

/// A running application: configuration plus the open store.
#[derive(Debug, Clone)]
pub struct App {
    config: AppConfig,
    db: Database,
}

impl App {
    /// Loads configuration, initializes logging and opens the store.
    pub async fn start(config_path: Option<PathBuf>) -> AppResult<Self> {
        let config = AppConfig::load(config_path)?;
        logging::init_tracing(config.logging.filter.as_deref());
        info!(
            backend = %config.store.backend,
            company = %config.business.company_name,
            "Starting SISMAD"
        );
        App::from_config(config).await
    }

    /// Opens the store described by an already-loaded configuration.
    pub async fn from_config(config: AppConfig) -> AppResult<Self> {
        config.validate()?;

        let db = match config.store.backend {
            StoreBackend::Memory => Database::new(MemoryStore::new()),
            StoreBackend::Sqlite => {
                let db_config = config.store.db_config()?;
                if !db_config.is_in_memory() {
                    if let Some(parent) = db_config.database_path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Database::sqlite(db_config).await?
            }
        };

        Ok(App { config, db })
    }

    /// Runs on an existing database handle (tests, seeded stores).
    pub fn with_database(config: AppConfig, db: Database) -> Self {
        App { config, db }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn clients(&self) -> ClientService {
        ClientService::new(self.db.clone())
    }

    pub fn species(&self) -> SpeciesService {
        SpeciesService::new(self.db.clone())
    }

    pub fn quotes(&self) -> QuoteService {
        QuoteService::new(self.db.clone(), self.config.business.quote_validity_days)
    }

    pub fn manifests(&self) -> ManifestService {
        ManifestService::new(self.db.clone())
    }

    pub async fn shutdown(&self) {
        info!("Shutting down");
        self.db.close().await;
    }
}
