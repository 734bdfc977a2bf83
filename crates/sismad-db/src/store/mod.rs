//! # Document Stores
//!
//! Generic collection CRUD over JSON documents.
//!
//! ## Variants
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      DocumentStore trait                                │
//! │   insert · get · upsert · delete · list · find_by_field · count        │
//! │                                                                         │
//! │        ┌───────────────────────┐      ┌───────────────────────────┐    │
//! │        │     MemoryStore       │      │       SqliteStore         │    │
//! │        │  RwLock<HashMap<      │      │  documents table          │    │
//! │        │   collection,         │      │  (collection, id, body)   │    │
//! │        │   BTreeMap<id, doc>>> │      │  json_extract for fields  │    │
//! │        └───────────┬───────────┘      └─────────────┬─────────────┘    │
//! │                    └───────────── Store ────────────┘                   │
//! │                         (enum, chosen once at startup)                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Semantics shared by both variants
//! - One write per call; the last writer wins
//! - `list` and `find_by_field` return documents ordered by id
//! - `find_by_field` matches a top-level field by equality; `null` also
//!   matches documents where the field is absent

pub mod memory;
pub mod sqlite;

use serde_json::Value;
use std::future::Future;

use crate::error::{DbError, DbResult};

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Collection-level operations on JSON documents.
pub trait DocumentStore: Send + Sync {
    /// Stores a new document. Fails with `UniqueViolation` if the id exists.
    fn insert(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> impl Future<Output = DbResult<()>> + Send;

    fn get(&self, collection: &str, id: &str) -> impl Future<Output = DbResult<Option<Value>>> + Send;

    /// Creates or fully replaces a document.
    fn upsert(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> impl Future<Output = DbResult<()>> + Send;

    /// Removes a document; `false` when it did not exist.
    fn delete(&self, collection: &str, id: &str) -> impl Future<Output = DbResult<bool>> + Send;

    fn list(&self, collection: &str) -> impl Future<Output = DbResult<Vec<Value>>> + Send;

    fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = DbResult<Vec<Value>>> + Send;

    fn count(&self, collection: &str) -> impl Future<Output = DbResult<u64>> + Send;
}

/// Checks a field name is safe to use in a query path.
///
/// Only top-level fields made of ASCII letters, digits and `_` are
/// queryable.
pub(crate) fn check_field_name(field: &str) -> DbResult<()> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(())
    } else {
        Err(DbError::InvalidField(field.to_string()))
    }
}

// =============================================================================
// Store
// =============================================================================

/// The configured store, built once at startup and handed to `Database`.
#[derive(Debug, Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
        }
    }

    /// Checks the store can serve requests.
    pub async fn health_check(&self) -> bool {
        match self {
            Store::Memory(_) => true,
            Store::Sqlite(store) => store.health_check().await,
        }
    }

    /// Releases the SQLite pool. No-op for the memory store.
    pub async fn close(&self) {
        if let Store::Sqlite(store) = self {
            store.close().await;
        }
    }
}

impl From<MemoryStore> for Store {
    fn from(store: MemoryStore) -> Self {
        Store::Memory(store)
    }
}

impl From<SqliteStore> for Store {
    fn from(store: SqliteStore) -> Self {
        Store::Sqlite(store)
    }
}

impl DocumentStore for Store {
    async fn insert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        match self {
            Store::Memory(s) => s.insert(collection, id, body).await,
            Store::Sqlite(s) => s.insert(collection, id, body).await,
        }
    }

    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Value>> {
        match self {
            Store::Memory(s) => s.get(collection, id).await,
            Store::Sqlite(s) => s.get(collection, id).await,
        }
    }

    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        match self {
            Store::Memory(s) => s.upsert(collection, id, body).await,
            Store::Sqlite(s) => s.upsert(collection, id, body).await,
        }
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<bool> {
        match self {
            Store::Memory(s) => s.delete(collection, id).await,
            Store::Sqlite(s) => s.delete(collection, id).await,
        }
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<Value>> {
        match self {
            Store::Memory(s) => s.list(collection).await,
            Store::Sqlite(s) => s.list(collection).await,
        }
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> DbResult<Vec<Value>> {
        match self {
            Store::Memory(s) => s.find_by_field(collection, field, value).await,
            Store::Sqlite(s) => s.find_by_field(collection, field, value).await,
        }
    }

    async fn count(&self, collection: &str) -> DbResult<u64> {
        match self {
            Store::Memory(s) => s.count(collection).await,
            Store::Sqlite(s) => s.count(collection).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_field_name() {
        assert!(check_field_name("client_id").is_ok());
        assert!(check_field_name("status2").is_ok());
        assert!(check_field_name("").is_err());
        assert!(check_field_name("a.b").is_err());
        assert!(check_field_name("x') OR 1=1 --").is_err());
    }
}
