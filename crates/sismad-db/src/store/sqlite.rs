//! # SQLite Document Store
//!
//! Documents are rows of a single `documents` table, keyed by
//! `(collection, id)`, with the whole document as JSON text in `body`.
//!
//! ## Field Queries
//! ```text
//! find_by_field("quotes", "client_id", "c1")
//!       │
//!       ▼
//! SELECT body FROM documents
//! WHERE collection = 'quotes'
//!   AND json_extract(body, '$.client_id') = 'c1'
//! ORDER BY id
//! ```
//! The path is built from a checked field name; the value is always bound.
//!
//! ## WAL Mode
//! File databases use WAL so readers don't block the writer.

use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteRow, SqliteSynchronous,
};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::pool::DbConfig;
use crate::store::{check_field_name, DocumentStore};

/// SQLite-backed document store.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and runs migrations when
    /// the config asks for it.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        info!(
            path = %config.database_path.display(),
            "Initializing document store"
        );

        let connect_options = if config.is_in_memory() {
            SqliteConnectOptions::from_str("sqlite::memory:")
                .map_err(|e| DbError::ConnectionFailed(e.to_string()))?
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .journal_mode(SqliteJournalMode::Wal)
                .synchronous(SqliteSynchronous::Normal)
                .create_if_missing(true)
        };

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .connect_with(connect_options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        info!(
            max_connections = config.max_connections,
            "Document store pool created"
        );

        let store = SqliteStore { pool };
        if config.run_migrations {
            migrations::run_migrations(&store.pool).await?;
        }
        Ok(store)
    }

    /// Wraps an existing pool. Migrations are the caller's concern.
    pub fn from_pool(pool: SqlitePool) -> Self {
        SqliteStore { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        info!("Closing document store pool");
        self.pool.close().await;
    }
}

fn parse_body(row: &SqliteRow) -> DbResult<Value> {
    let body: String = row.try_get("body")?;
    Ok(serde_json::from_str(&body)?)
}

fn parse_rows(rows: &[SqliteRow]) -> DbResult<Vec<Value>> {
    rows.iter().map(parse_body).collect()
}

impl DocumentStore for SqliteStore {
    async fn insert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body.to_string())
        .bind(now)
        .execute(&self.pool)
        .await;

        match result.map_err(DbError::from) {
            Ok(_) => {
                debug!(collection = %collection, id = %id, "Inserted document");
                Ok(())
            }
            Err(DbError::UniqueViolation { .. }) => Err(DbError::duplicate("id", id)),
            Err(e) => Err(e),
        }
    }

    async fn get(&self, collection: &str, id: &str) -> DbResult<Option<Value>> {
        let row = sqlx::query("SELECT body FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(parse_body).transpose()
    }

    async fn upsert(&self, collection: &str, id: &str, body: &Value) -> DbResult<()> {
        let now = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO documents (collection, id, body, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            ON CONFLICT (collection, id) DO UPDATE SET
                body = excluded.body,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(collection)
        .bind(id)
        .bind(body.to_string())
        .bind(now)
        .execute(&self.pool)
        .await?;

        debug!(collection = %collection, id = %id, "Upserted document");
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = ?1 AND id = ?2")
            .bind(collection)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self, collection: &str) -> DbResult<Vec<Value>> {
        let rows = sqlx::query("SELECT body FROM documents WHERE collection = ?1 ORDER BY id")
            .bind(collection)
            .fetch_all(&self.pool)
            .await?;

        parse_rows(&rows)
    }

    async fn find_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> DbResult<Vec<Value>> {
        check_field_name(field)?;
        let path = format!("$.{field}");

        const MATCH_SQL: &str = r#"
            SELECT body FROM documents
            WHERE collection = ?1 AND json_extract(body, ?2) = ?3
            ORDER BY id
        "#;

        // json_extract yields 1/0 for booleans, so numbers and booleans are
        // told apart by json_type
        const NUMBER_SQL: &str = r#"
            SELECT body FROM documents
            WHERE collection = ?1
              AND json_type(body, ?2) IN ('integer', 'real')
              AND json_extract(body, ?2) = ?3
            ORDER BY id
        "#;

        const BOOL_SQL: &str = r#"
            SELECT body FROM documents
            WHERE collection = ?1 AND json_type(body, ?2) = ?3
            ORDER BY id
        "#;

        let rows = match value {
            Value::Null => {
                sqlx::query(
                    r#"
                    SELECT body FROM documents
                    WHERE collection = ?1 AND json_extract(body, ?2) IS NULL
                    ORDER BY id
                    "#,
                )
                .bind(collection)
                .bind(&path)
                .fetch_all(&self.pool)
                .await?
            }
            Value::String(text) => {
                sqlx::query(MATCH_SQL)
                    .bind(collection)
                    .bind(&path)
                    .bind(text.as_str())
                    .fetch_all(&self.pool)
                    .await?
            }
            Value::Bool(flag) => {
                sqlx::query(BOOL_SQL)
                    .bind(collection)
                    .bind(&path)
                    .bind(if *flag { "true" } else { "false" })
                    .fetch_all(&self.pool)
                    .await?
            }
            Value::Number(number) => {
                if let Some(int) = number.as_i64() {
                    sqlx::query(NUMBER_SQL)
                        .bind(collection)
                        .bind(&path)
                        .bind(int)
                        .fetch_all(&self.pool)
                        .await?
                } else {
                    let float = number
                        .as_f64()
                        .ok_or_else(|| DbError::InvalidField(format!("{field}: {number}")))?;
                    sqlx::query(NUMBER_SQL)
                        .bind(collection)
                        .bind(&path)
                        .bind(float)
                        .fetch_all(&self.pool)
                        .await?
                }
            }
            Value::Array(_) | Value::Object(_) => {
                return Err(DbError::InvalidField(format!(
                    "{field}: only scalar values can be matched"
                )));
            }
        };

        debug!(
            collection = %collection,
            field = %field,
            count = rows.len(),
            "Field query"
        );
        parse_rows(&rows)
    }

    async fn count(&self, collection: &str) -> DbResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = ?1")
            .bind(collection)
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn store() -> SqliteStore {
        SqliteStore::connect(&DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_in_memory_store() {
        let store = store().await;
        assert!(store.health_check().await);

        let (total, applied) = migrations::migration_status(store.pool()).await.unwrap();
        assert_eq!(total, applied);
    }

    #[tokio::test]
    async fn test_crud() {
        let store = store().await;
        let doc = json!({"id": "c1", "name": "Serraria Bom Pinho", "active": true});

        store.insert("clients", "c1", &doc).await.unwrap();
        assert_eq!(store.get("clients", "c1").await.unwrap(), Some(doc.clone()));
        assert_eq!(store.get("species", "c1").await.unwrap(), None);

        assert!(matches!(
            store.insert("clients", "c1", &doc).await,
            Err(DbError::UniqueViolation { .. })
        ));

        store
            .upsert("clients", "c1", &json!({"id": "c1", "name": "Outro"}))
            .await
            .unwrap();
        assert_eq!(store.get("clients", "c1").await.unwrap().unwrap()["name"], "Outro");

        assert_eq!(store.count("clients").await.unwrap(), 1);
        assert!(store.delete("clients", "c1").await.unwrap());
        assert!(!store.delete("clients", "c1").await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_field_types() {
        let store = store().await;
        store
            .upsert("quotes", "b", &json!({"id": "b", "client_id": "c1", "status": "pending", "n": 3, "open": true}))
            .await
            .unwrap();
        store
            .upsert("quotes", "a", &json!({"id": "a", "client_id": "c1", "status": "approved", "n": 2.5, "open": false}))
            .await
            .unwrap();
        store
            .upsert("quotes", "c", &json!({"id": "c", "client_id": "c2", "status": "pending"}))
            .await
            .unwrap();

        let ids = |docs: Vec<Value>| -> Vec<String> {
            docs.iter()
                .map(|d| d["id"].as_str().unwrap().to_string())
                .collect()
        };

        let found = store.find_by_field("quotes", "client_id", &json!("c1")).await.unwrap();
        assert_eq!(ids(found), vec!["a", "b"]);

        let found = store.find_by_field("quotes", "n", &json!(3)).await.unwrap();
        assert_eq!(ids(found), vec!["b"]);

        let found = store.find_by_field("quotes", "n", &json!(2.5)).await.unwrap();
        assert_eq!(ids(found), vec!["a"]);

        let found = store.find_by_field("quotes", "open", &json!(true)).await.unwrap();
        assert_eq!(ids(found), vec!["b"]);

        let found = store.find_by_field("quotes", "open", &json!(false)).await.unwrap();
        assert_eq!(ids(found), vec!["a"]);

        let found = store.find_by_field("quotes", "open", &Value::Null).await.unwrap();
        assert_eq!(ids(found), vec!["c"]);

        assert!(matches!(
            store.find_by_field("quotes", "status'--", &json!("x")).await,
            Err(DbError::InvalidField(_))
        ));
    }
}
