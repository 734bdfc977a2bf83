//! # sismad-db: Document Store Layer for SISMAD
//!
//! Persistence for clients, species, quotes and manifests. Each document is
//! stored whole, as JSON, in a collection of a [`DocumentStore`].
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        SISMAD Data Flow                                 │
//! │                                                                         │
//! │  sismad-app service (save_quote)                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     sismad-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │    Store     │  │   │
//! │  │   │   (pool.rs)   │───►│  Repository<T>│───►│ memory       │  │   │
//! │  │   │               │    │  per document │    │ sqlite       │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  sismad.db (documents table) or process memory                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `DbConfig` and the `Database` handle
//! - [`store`] - `DocumentStore` trait and its two variants
//! - [`repository`] - Typed repositories
//! - [`migrations`] - Embedded SQLite migrations
//! - [`error`] - Database error types
//!
//! ## Usage
//!
//! ```rust,ignore
//! use sismad_db::{Database, DbConfig};
//!
//! let db = Database::sqlite(DbConfig::new("./sismad.db")).await?;
//! let quotes = db.quotes().list_by_client(&client_id).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::{
    ClientRepository, Document, ManifestRepository, QuoteRepository, Repository,
    SpeciesRepository,
};
pub use store::{DocumentStore, MemoryStore, SqliteStore, Store};
