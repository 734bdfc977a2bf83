//! # Application Configuration
//!
//! Settings for the store, business defaults and logging.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Sources                                │
//! │                                                                         │
//! │  1. Defaults (this file)                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  2. sismad.toml (explicit path, or the platform config dir)            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  3. Environment (SISMAD_*)                                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate() ──► AppConfig                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Environment Variables
//! | Variable | Setting |
//! |---|---|
//! | `SISMAD_STORE_BACKEND` | `store.backend` (`memory` / `sqlite`) |
//! | `SISMAD_DB_PATH` | `store.path` |
//! | `SISMAD_COMPANY_NAME` | `business.company_name` |
//! | `SISMAD_QUOTE_VALIDITY_DAYS` | `business.quote_validity_days` |
//! | `SISMAD_LOG_FILTER` | `logging.filter` |

use serde::{Deserialize, Serialize};
use sismad_core::MAX_QUOTE_VALIDITY_DAYS;
use sismad_db::DbConfig;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = "sismad.toml";
const DB_FILE_NAME: &str = "sismad.db";

// =============================================================================
// Store Settings
// =============================================================================

/// Which document store variant to run on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local store, empty at startup (development and demos).
    Memory,

    /// SQLite file.
    #[default]
    Sqlite,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::Sqlite => "sqlite",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StoreBackend::Memory),
            "sqlite" => Ok(StoreBackend::Sqlite),
            _ => Err(AppError::InvalidConfig(format!(
                "Unknown store backend: {}",
                s
            ))),
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    #[serde(default)]
    pub backend: StoreBackend,

    /// SQLite file. Defaults to `sismad.db` in the platform data dir.
    #[serde(default = "default_db_path")]
    pub path: Option<PathBuf>,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("br", "sismad", "sismad")
        .map(|dirs| dirs.data_dir().join(DB_FILE_NAME))
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl StoreSettings {
    /// SQLite configuration for these settings.
    ///
    /// `path = ":memory:"` gives a single-connection in-memory database.
    pub fn db_config(&self) -> AppResult<DbConfig> {
        let path = self
            .path
            .clone()
            .ok_or_else(|| AppError::InvalidConfig("store.path is not set".into()))?;
        let config = DbConfig::new(path);
        if config.is_in_memory() {
            return Ok(DbConfig::in_memory());
        }
        Ok(config.max_connections(self.max_connections))
    }
}

// =============================================================================
// Business Settings
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessSettings {
    /// Printed on quotes and manifests.
    #[serde(default = "default_company_name")]
    pub company_name: String,

    /// Days a new quote stays valid.
    #[serde(default = "default_quote_validity_days")]
    pub quote_validity_days: u32,
}

fn default_company_name() -> String {
    "SISMAD".to_string()
}

fn default_quote_validity_days() -> u32 {
    sismad_core::DEFAULT_QUOTE_VALIDITY_DAYS
}

impl Default for BusinessSettings {
    fn default() -> Self {
        Self {
            company_name: default_company_name(),
            quote_validity_days: default_quote_validity_days(),
        }
    }
}

// =============================================================================
// Logging Settings
// =============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// `EnvFilter` directives. `RUST_LOG` takes precedence when set.
    #[serde(default)]
    pub filter: Option<String>,
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Complete application configuration.
///
/// ## Example TOML
/// ```toml
/// [store]
/// backend = "sqlite"
/// path = "/var/lib/sismad/sismad.db"
/// max_connections = 5
///
/// [business]
/// company_name = "Madeireira Boa Vista"
/// quote_validity_days = 15
///
/// [logging]
/// filter = "info,sismad=debug"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub business: BusinessSettings,

    #[serde(default)]
    pub logging: LoggingSettings,
}

impl AppConfig {
    /// A configuration running on the in-memory store.
    pub fn in_memory() -> Self {
        let mut config = Self::default();
        config.store.backend = StoreBackend::Memory;
        config
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (sismad.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> AppResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| AppError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Config saved");
        Ok(())
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.store.backend == StoreBackend::Sqlite && self.store.path.is_none() {
            return Err(AppError::InvalidConfig(
                "store.path is required for the sqlite backend".into(),
            ));
        }

        if self.store.max_connections == 0 {
            return Err(AppError::InvalidConfig(
                "store.max_connections must be greater than 0".into(),
            ));
        }

        if !(1..=MAX_QUOTE_VALIDITY_DAYS).contains(&self.business.quote_validity_days) {
            return Err(AppError::InvalidConfig(format!(
                "business.quote_validity_days must be between 1 and {}",
                MAX_QUOTE_VALIDITY_DAYS
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(backend) = std::env::var("SISMAD_STORE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => {
                    debug!(backend = %backend, "Overriding store backend from environment");
                    self.store.backend = parsed;
                }
                Err(_) => warn!(backend = %backend, "Unknown store backend in environment"),
            }
        }

        if let Ok(path) = std::env::var("SISMAD_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.store.path = Some(PathBuf::from(path));
        }

        if let Ok(name) = std::env::var("SISMAD_COMPANY_NAME") {
            self.business.company_name = name;
        }

        if let Ok(days) = std::env::var("SISMAD_QUOTE_VALIDITY_DAYS") {
            if let Ok(d) = days.parse::<u32>() {
                debug!(days = d, "Overriding quote validity from environment");
                self.business.quote_validity_days = d;
            }
        }

        if let Ok(filter) = std::env::var("SISMAD_LOG_FILTER") {
            self.logging.filter = Some(filter);
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("br", "sismad", "sismad")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }
}
