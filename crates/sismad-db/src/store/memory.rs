//! # In-Memory Store
//!
//! A process-local document store used by tests and demo runs. Nothing is
//! persisted; dropping the last clone drops the data.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::store::{check_field_name, DocumentStore};

type Collections = HashMap<String, BTreeMap<String, Value>>;

/// Shared in-memory document store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

/// Field equality with SQLite's semantics: numbers compare by value
/// (`1 == 1.0`) and `null` matches an absent field.
fn field_matches(doc: &Value, field: &str, expected: &Value) -> bool {
    match (doc.get(field), expected) {
        (None, Value::Null) => true,
        (Some(Value::Number(a)), Value::Number(b)) => match (a.as_f64(), b.as_f64()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        },
        (Some(actual), expected) => actual == expected,
        (None, _) => false,
    }
}

impl DocumentStore for MemoryStore {
    async fn insert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(id) {
            return Err(DbError::duplicate("id", id));
        }
        docs.insert(id.to_string(), body.clone());
        debug!(collection = %collection, id = %id, "Inserted document");
        Ok(())
    }

    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), body.clone());
        debug!(collection = %collection, id = %id, "Upserted document");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<bool> {
        let mut collections = self.collections.write().await;
        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.remove(id))
            .is_some();
        Ok(removed)
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<Value>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> DbResult<Vec<Value>> {
        check_field_name(field)?;
        if value.is_array() || value.is_object() {
            return Err(DbError::InvalidField(format!(
                "{field}: only scalar values can be matched"
            )));
        }

        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| field_matches(doc, field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn count(&self, collection: &str) -> DbResult<u64> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| docs.len() as u64)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_crud() {
        let store = MemoryStore::new();
        let doc = json!({"id": "a", "name": "Cedro"});

        store.insert("species", "a", &doc).await.unwrap();
        assert_eq!(store.get("species", "a").await.unwrap(), Some(doc.clone()));
        assert!(matches!(
            store.insert("species", "a", &doc).await,
            Err(DbError::UniqueViolation { .. })
        ));

        store
            .upsert("species", "a", &json!({"id": "a", "name": "Ipê"}))
            .await
            .unwrap();
        assert_eq!(
            store.get("species", "a").await.unwrap().unwrap()["name"],
            "Ipê"
        );

        assert!(store.delete("species", "a").await.unwrap());
        assert!(!store.delete("species", "a").await.unwrap());
        assert_eq!(store.count("species").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_clones_share_data() {
        let store = MemoryStore::new();
        let other = store.clone();
        store.upsert("clients", "c1", &json!({"id": "c1"})).await.unwrap();
        assert_eq!(other.count("clients").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_find_by_field() {
        let store = MemoryStore::new();
        store
            .upsert("quotes", "q2", &json!({"id": "q2", "client_id": "c1", "total": 10}))
            .await
            .unwrap();
        store
            .upsert("quotes", "q1", &json!({"id": "q1", "client_id": "c1", "notes": null}))
            .await
            .unwrap();
        store
            .upsert("quotes", "q3", &json!({"id": "q3", "client_id": "c2", "notes": "x"}))
            .await
            .unwrap();

        let found = store
            .find_by_field("quotes", "client_id", &json!("c1"))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|d| d["id"].as_str().unwrap()).collect();
        assert_eq!(ids, vec!["q1", "q2"]);

        let found = store.find_by_field("quotes", "total", &json!(10.0)).await.unwrap();
        assert_eq!(found.len(), 1);

        let found = store.find_by_field("quotes", "notes", &Value::Null).await.unwrap();
        assert_eq!(found.len(), 2);

        assert!(store
            .find_by_field("quotes", "items", &json!([]))
            .await
            .is_err());
    }
}
