//! # Converter Repository
//!
//! Concrete adapters for the converter's ports:
//! - `identity` - in-memory `IdentityProvider` with hashed credentials
//! - `memory` - in-memory `DocumentStore`
//! - `sqlite` - SQLite-backed `DocumentStore` (feature `sqlite`)

use async_trait::async_trait;
use converter_types::{DocumentId, DocumentStore, StoreError, StoredDocument};

pub mod identity;
pub mod memory;
pub mod security;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "sqlite")]
#[cfg(test)]
mod sqlite_tests;

pub use identity::MemoryIdentityProvider;
pub use memory::MemoryDocumentStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteDocumentStore;

/// Unified document store wrapper selected at startup.
pub enum Store {
    Memory(MemoryDocumentStore),
    #[cfg(feature = "sqlite")]
    Sqlite(SqliteDocumentStore),
}

/// Build a document store from an optional database URL.
///
/// No URL selects the in-memory store. A `sqlite:` URL connects, runs
/// migrations and returns a ready-to-use SQLite store.
///
/// # Examples
///
/// ```ignore
/// let store = build_store(None).await?;
/// let store = build_store(Some("sqlite://data/converter.db?mode=rwc")).await?;
/// ```
pub async fn build_store(database_url: Option<&str>) -> anyhow::Result<Store> {
    match database_url {
        None => Ok(Store::Memory(MemoryDocumentStore::new())),
        #[cfg(feature = "sqlite")]
        Some(url) if url.starts_with("sqlite:") => {
            Ok(Store::Sqlite(SqliteDocumentStore::new(url).await?))
        }
        Some(url) => anyhow::bail!(
            "Unsupported database URL: {} (SQLite URLs require the `sqlite` feature)",
            url
        ),
    }
}

impl Store {
    pub fn kind(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            #[cfg(feature = "sqlite")]
            Store::Sqlite(_) => "sqlite",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Implement DocumentStore for Store (delegation)
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait]
impl DocumentStore for Store {
    async fn add(
        &self,
        collection: &str,
        document: serde_json::Value,
    ) -> Result<DocumentId, StoreError> {
        match self {
            Store::Memory(inner) => inner.add(collection, document).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.add(collection, document).await,
        }
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        match self {
            Store::Memory(inner) => inner.list(collection).await,
            #[cfg(feature = "sqlite")]
            Store::Sqlite(inner) => inner.list(collection).await,
        }
    }
}
