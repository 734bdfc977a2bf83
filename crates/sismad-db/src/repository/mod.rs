//! # Repository Module
//!
//! Typed access to one collection of the document store.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  Service                                                               │
//! │       │  db.quotes().list_by_client("c1")                              │
//! │       ▼                                                                 │
//! │  Repository<Quote>                                                     │
//! │  ├── write: validate ─► serde_json::to_value ─► store.upsert          │
//! │  └── read:  store.get ─► from_value (dates coerced, lines re-derived)  │
//! │                          ─► normalize ─► validate                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  Store (memory | sqlite)                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reading one document by id that fails to decode or validate is reported
//! as [`DbError::InvalidDocument`]. Listings and field lookups leave such a
//! document out and log a warning, so one broken record does not hide the
//! rest of its collection.
//!
//! ## Available Repositories
//!
//! - [`ClientRepository`] - clients, lookup by tax id
//! - [`SpeciesRepository`] - species catalog, lookup by name
//! - [`QuoteRepository`] - quotes by client, status and number
//! - [`ManifestRepository`] - manifests by client, kind and quote

pub mod client;
pub mod manifest;
pub mod quote;
pub mod species;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use sismad_core::validation::validate_uuid;
use sismad_core::{Client, CoreResult, Manifest, Quote, Species};
use std::marker::PhantomData;
use tracing::{debug, warn};

use crate::error::{DbError, DbResult};
use crate::store::{DocumentStore, Store};

pub type ClientRepository = Repository<Client>;
pub type SpeciesRepository = Repository<Species>;
pub type QuoteRepository = Repository<Quote>;
pub type ManifestRepository = Repository<Manifest>;

/// A type stored as one document of a collection.
pub trait Document: Serialize + DeserializeOwned + Send + Sync {
    /// Collection name in the store.
    const COLLECTION: &'static str;

    /// Entity name used in `NotFound` errors.
    const ENTITY: &'static str;

    fn id(&self) -> &str;

    /// Checks the document before it is written and after it is read.
    fn validate(&self) -> CoreResult<()>;

    /// Re-derives computed fields after loading.
    fn normalize(&mut self) {}
}

/// Typed repository over one collection.
#[derive(Debug)]
pub struct Repository<T> {
    store: Store,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Repository {
            store: self.store.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T: Document> Repository<T> {
    pub fn new(store: Store) -> Self {
        Repository {
            store,
            _marker: PhantomData,
        }
    }

    fn decode(value: Value) -> DbResult<T> {
        let id = value
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or("<no id>")
            .to_string();

        let mut doc: T = serde_json::from_value(value)
            .map_err(|e| DbError::invalid_document(T::COLLECTION, &id, e))?;
        doc.normalize();
        doc.validate()
            .map_err(|e| DbError::invalid_document(T::COLLECTION, &id, e))?;
        Ok(doc)
    }

    /// Decodes a listing, leaving out documents that fail to load.
    fn decode_all(values: Vec<Value>) -> Vec<T> {
        values
            .into_iter()
            .filter_map(|value| match Self::decode(value) {
                Ok(doc) => Some(doc),
                Err(e) => {
                    warn!(collection = T::COLLECTION, error = %e, "Skipping invalid document");
                    None
                }
            })
            .collect()
    }

    fn encode(doc: &T) -> DbResult<Value> {
        doc.validate()?;
        Ok(serde_json::to_value(doc)?)
    }

    /// Stores a new document. Its id must be a fresh UUID.
    ///
    /// ## Errors
    /// - `Rejected` when the document is invalid or its id is not a UUID
    /// - `UniqueViolation` when the id already exists
    pub async fn insert(&self, doc: &T) -> DbResult<()> {
        validate_uuid(doc.id()).map_err(sismad_core::CoreError::from)?;
        let body = Self::encode(doc)?;
        self.store.insert(T::COLLECTION, doc.id(), &body).await?;
        debug!(collection = T::COLLECTION, id = %doc.id(), "Document inserted");
        Ok(())
    }

    /// Creates or replaces a document in one write.
    pub async fn save(&self, doc: &T) -> DbResult<()> {
        let body = Self::encode(doc)?;
        self.store.upsert(T::COLLECTION, doc.id(), &body).await?;
        debug!(collection = T::COLLECTION, id = %doc.id(), "Document saved");
        Ok(())
    }

    pub async fn get(&self, id: &str) -> DbResult<Option<T>> {
        self.store
            .get(T::COLLECTION, id)
            .await?
            .map(Self::decode)
            .transpose()
    }

    /// Like [`get`](Self::get), but a missing document is `NotFound`.
    pub async fn require(&self, id: &str) -> DbResult<T> {
        self.get(id)
            .await?
            .ok_or_else(|| DbError::not_found(T::ENTITY, id))
    }

    /// Deletes a document; `NotFound` if it did not exist.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        if !self.store.delete(T::COLLECTION, id).await? {
            return Err(DbError::not_found(T::ENTITY, id));
        }
        debug!(collection = T::COLLECTION, id = %id, "Document deleted");
        Ok(())
    }

    /// All valid documents of the collection, ordered by id.
    pub async fn list(&self) -> DbResult<Vec<T>> {
        Ok(Self::decode_all(self.store.list(T::COLLECTION).await?))
    }

    /// Valid documents whose top-level `field` equals `value`, ordered by id.
    pub async fn find_by(&self, field: &str, value: impl Into<Value>) -> DbResult<Vec<T>> {
        let value = value.into();
        let found = self.store.find_by_field(T::COLLECTION, field, &value).await?;
        Ok(Self::decode_all(found))
    }

    pub async fn count(&self) -> DbResult<u64> {
        self.store.count(T::COLLECTION).await
    }
}
