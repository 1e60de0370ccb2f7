//! SQLite document store adapter.
#![allow(clippy::collapsible_if)]

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use std::str::FromStr;
use uuid::Uuid;

use converter_types::{DocumentId, DocumentStore, StoreError, StoredDocument};

// ─────────────────────────────────────────────────────────────────────────────
// SQLite Document Store
// ─────────────────────────────────────────────────────────────────────────────

/// SQLite document store. Bodies are stored as JSON text.
pub struct SqliteDocumentStore {
    pool: SqlitePool,
}

impl SqliteDocumentStore {
    /// Creates a new SQLite store with automatic migration.
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        // Ensure on-disk SQLite target directory exists (no-op for in-memory).
        if let Some(path) = database_url.strip_prefix("sqlite://") {
            // Remove query parameters
            let path = path.split('?').next().unwrap_or(path);
            if path != ":memory:" {
                let p = std::path::Path::new(path);
                if let Some(parent) = p.parent() {
                    if !parent.as_os_str().is_empty() {
                        tokio::fs::create_dir_all(parent).await?;
                    }
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to `:memory:` opens its own database.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 10 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.create_schema().await?;
        Ok(store)
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the database schema (idempotent).
    pub async fn create_schema(&self) -> Result<(), StoreError> {
        let ddl = include_str!("../migrations/0001_create_documents.sql");
        sqlx::raw_sql(ddl)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }
}

/// Classifies driver errors: connectivity problems may clear up, everything
/// else is a rejection of this write.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Io(_)
        | sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed => StoreError::Transient(err.to_string()),
        sqlx::Error::Database(ref db) if is_busy(db.code().as_deref()) => {
            StoreError::Transient(err.to_string())
        }
        other => StoreError::Permanent(other.to_string()),
    }
}

/// SQLITE_BUSY (5) and SQLITE_LOCKED (6), including extended codes.
fn is_busy(code: Option<&str>) -> bool {
    code.and_then(|c| c.parse::<i32>().ok())
        .is_some_and(|c| matches!(c & 0xff, 5 | 6))
}

// ─────────────────────────────────────────────────────────────────────────────
// Row mapping
// ─────────────────────────────────────────────────────────────────────────────

/// Document row from database.
#[derive(FromRow)]
struct DbDocument {
    id: String,
    collection: String,
    body: String,
    created_at: String,
}

impl DbDocument {
    fn into_domain(self) -> Result<StoredDocument, StoreError> {
        let id = Uuid::parse_str(&self.id).map_err(|e| StoreError::Permanent(e.to_string()))?;
        let body =
            serde_json::from_str(&self.body).map_err(|e| StoreError::Permanent(e.to_string()))?;
        let created_at = chrono::DateTime::parse_from_rfc3339(&self.created_at)
            .map_err(|e| StoreError::Permanent(e.to_string()))?
            .with_timezone(&chrono::Utc);

        Ok(StoredDocument {
            id: DocumentId::from_uuid(id),
            collection: self.collection,
            body,
            created_at,
        })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Store implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    async fn add(
        &self,
        collection: &str,
        document: serde_json::Value,
    ) -> Result<DocumentId, StoreError> {
        if !document.is_object() {
            return Err(StoreError::Permanent("document must be a JSON object".into()));
        }

        let id = DocumentId::new();
        let body =
            serde_json::to_string(&document).map_err(|e| StoreError::Permanent(e.to_string()))?;
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO documents (id, collection, body, created_at) VALUES (?, ?, ?, ?)"#,
        )
        .bind(id.to_string())
        .bind(collection)
        .bind(&body)
        .bind(&created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        tracing::debug!(document_id = %id, collection, "Document inserted");
        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let rows: Vec<DbDocument> = sqlx::query_as(
            r#"SELECT id, collection, body, created_at FROM documents WHERE collection = ? ORDER BY created_at ASC, rowid ASC"#,
        )
        .bind(collection)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DbDocument::into_domain).collect()
    }
}
