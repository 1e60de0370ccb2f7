//! Document store port.
//!
//! The store accepts schemaless JSON documents grouped in named collections.
//! Adapters (in-memory, SQLite) implement this trait.

use crate::domain::{DocumentId, StoredDocument};
use crate::error::StoreError;

/// Port trait for document stores.
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Adds a document to `collection` and returns its assigned id.
    async fn add(
        &self,
        collection: &str,
        document: serde_json::Value,
    ) -> Result<DocumentId, StoreError>;

    /// Lists every document in `collection`, oldest first.
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError>;
}
