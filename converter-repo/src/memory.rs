//! In-memory document store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;

use converter_types::{DocumentId, DocumentStore, StoreError, StoredDocument};

/// Document store held in process memory, one vector per collection.
#[derive(Default)]
pub struct MemoryDocumentStore {
    collections: DashMap<String, Vec<StoredDocument>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in `collection`.
    pub fn count(&self, collection: &str) -> usize {
        self.collections
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(
        &self,
        collection: &str,
        document: serde_json::Value,
    ) -> Result<DocumentId, StoreError> {
        if !document.is_object() {
            return Err(StoreError::Permanent("document must be a JSON object".into()));
        }

        let stored = StoredDocument {
            id: DocumentId::new(),
            collection: collection.to_string(),
            body: document,
            created_at: Utc::now(),
        };
        let id = stored.id;
        self.collections
            .entry(collection.to_string())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        Ok(self
            .collections
            .get(collection)
            .map(|docs| docs.value().clone())
            .unwrap_or_default())
    }
}
