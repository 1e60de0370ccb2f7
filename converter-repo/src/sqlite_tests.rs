//! SQLite document store integration tests.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use converter_types::{
        CONVERSIONS_COLLECTION, ConversionRecord, ConversionResult, Currency, DocumentStore,
        StoreError, UserId,
    };

    use converter_hex::ConversionRecorder;
    use converter_types::IdentityProvider;

    use crate::{MemoryIdentityProvider, SqliteDocumentStore};

    async fn setup_store() -> SqliteDocumentStore {
        SqliteDocumentStore::new("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list_record() {
        let store = setup_store().await;
        let result = ConversionResult::compute(100.0, Currency::USD, Currency::PEN, 3.8, Utc::now());
        let record = ConversionRecord::new(&result, UserId::new("uid-1"));

        let id = store
            .add(CONVERSIONS_COLLECTION, record.to_document().unwrap())
            .await
            .unwrap();

        let docs = store.list(CONVERSIONS_COLLECTION).await.unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, id);
        assert_eq!(docs[0].collection, CONVERSIONS_COLLECTION);

        let back = ConversionRecord::from_document(&docs[0].body).unwrap();
        assert_eq!(back, record);
    }

    #[tokio::test]
    async fn test_collections_are_separate() {
        let store = setup_store().await;

        store
            .add("a", serde_json::json!({ "n": 1 }))
            .await
            .unwrap();
        store
            .add("b", serde_json::json!({ "n": 2 }))
            .await
            .unwrap();
        store
            .add("a", serde_json::json!({ "n": 3 }))
            .await
            .unwrap();

        let docs = store.list("a").await.unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].body["n"], 1);
        assert_eq!(docs[1].body["n"], 3);
        assert!(store.list("c").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_object_rejected() {
        let store = setup_store().await;

        let result = store.add("a", serde_json::json!("text")).await;

        assert!(matches!(result, Err(StoreError::Permanent(_))));
    }

    #[tokio::test]
    async fn test_on_disk_database_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("nested/converter.db").display()
        );

        {
            let store = SqliteDocumentStore::new(&url).await.unwrap();
            store
                .add(CONVERSIONS_COLLECTION, serde_json::json!({ "amount": 5.0 }))
                .await
                .unwrap();
            store.pool().close().await;
        }

        let reopened = SqliteDocumentStore::new(&url).await.unwrap();
        let docs = reopened.list(CONVERSIONS_COLLECTION).await.unwrap();
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_restart_with_fresh_identity() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!(
            "sqlite://{}?mode=rwc",
            dir.path().join("converter.db").display()
        );
        let users = [("ana@example.com", "secret")];

        let saved_id = {
            let identity = MemoryIdentityProvider::with_users(users);
            let user = identity.sign_in("ana@example.com", "secret").await.unwrap();
            let recorder = ConversionRecorder::new(SqliteDocumentStore::new(&url).await.unwrap());
            let result =
                ConversionResult::compute(100.0, Currency::USD, Currency::EUR, 0.92, Utc::now());

            let id = recorder.record(&result, Some(user)).await.unwrap();
            recorder.store().pool().close().await;
            id
        };

        let identity = MemoryIdentityProvider::with_users(users);
        let user = identity.sign_in("ana@example.com", "secret").await.unwrap();
        let recorder = ConversionRecorder::new(SqliteDocumentStore::new(&url).await.unwrap());

        let history = recorder.history(&user).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].user_id, user);
        assert_eq!(history[0].amount, 100.0);

        let docs = recorder.store().list(CONVERSIONS_COLLECTION).await.unwrap();
        assert_eq!(docs[0].id, saved_id);
    }
}
