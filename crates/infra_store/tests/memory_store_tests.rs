//! Integration tests for the in-memory document store
//!
//! These exercise the store port contract end-to-end: atomic batches are
//! all-or-nothing, version pins reject stale writers, and injected
//! transient failures clear after the configured count.

use infra_store::MemoryStore;
use serde_json::json;

use core_kernel::{AtomicOperation, DocumentStore, StoreError};

mod atomic_batch_tests {
    use super::*;

    #[tokio::test]
    async fn test_batch_applies_updates_and_creates_together() {
        let store = MemoryStore::new();
        store
            .create("accounts", json!({"id": "acc-1", "balance": 100}))
            .await
            .unwrap();

        let operations = vec![
            AtomicOperation::Update {
                collection: "accounts".to_string(),
                id: "acc-1".to_string(),
                data: json!({"balance": 70}),
                expected_version: Some(1),
            },
            AtomicOperation::Create {
                collection: "entries".to_string(),
                data: json!({"id": "ent-1", "amount": 30}),
            },
        ];
        store.run_atomic(operations).await.unwrap();

        let account = store.get("accounts", "acc-1").await.unwrap();
        assert_eq!(account.data["balance"], 70);
        assert_eq!(account.version, 2);
        assert_eq!(store.document_count("entries").await, 1);
    }

    #[tokio::test]
    async fn test_version_mismatch_rolls_back_whole_batch() {
        let store = MemoryStore::new();
        store
            .create("accounts", json!({"id": "acc-1", "balance": 100}))
            .await
            .unwrap();

        let operations = vec![
            AtomicOperation::Create {
                collection: "entries".to_string(),
                data: json!({"id": "ent-1"}),
            },
            AtomicOperation::Update {
                collection: "accounts".to_string(),
                id: "acc-1".to_string(),
                data: json!({"balance": 0}),
                expected_version: Some(99),
            },
        ];
        let err = store.run_atomic(operations).await.unwrap_err();
        assert!(err.is_conflict());

        // Nothing from the batch landed, including the create listed first.
        assert_eq!(store.document_count("entries").await, 0);
        let account = store.get("accounts", "acc-1").await.unwrap();
        assert_eq!(account.data["balance"], 100);
        assert_eq!(account.version, 1);
    }

    #[tokio::test]
    async fn test_update_of_missing_document_fails_batch() {
        let store = MemoryStore::new();
        let operations = vec![AtomicOperation::Update {
            collection: "accounts".to_string(),
            id: "ghost".to_string(),
            data: json!({"balance": 1}),
            expected_version: None,
        }];
        let err = store.run_atomic(operations).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_unpinned_update_in_batch_ignores_version() {
        let store = MemoryStore::new();
        store
            .create("accounts", json!({"id": "acc-1", "balance": 100}))
            .await
            .unwrap();
        store
            .update("accounts", "acc-1", json!({"balance": 90}))
            .await
            .unwrap();

        let operations = vec![AtomicOperation::Update {
            collection: "accounts".to_string(),
            id: "acc-1".to_string(),
            data: json!({"balance": 50}),
            expected_version: None,
        }];
        store.run_atomic(operations).await.unwrap();

        let account = store.get("accounts", "acc-1").await.unwrap();
        assert_eq!(account.data["balance"], 50);
        assert_eq!(account.version, 3);
    }
}

mod failure_injection_tests {
    use super::*;

    #[tokio::test]
    async fn test_atomic_batch_respects_injected_failures() {
        let store = MemoryStore::new();
        store.with_transient_failures(1);

        let operations = vec![AtomicOperation::Create {
            collection: "entries".to_string(),
            data: json!({"id": "ent-1"}),
        }];
        let err = store.run_atomic(operations.clone()).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(store.document_count("entries").await, 0);

        store.run_atomic(operations).await.unwrap();
        assert_eq!(store.document_count("entries").await, 1);
    }
}

mod typed_roundtrip_tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Gadget {
        id: String,
        label: String,
    }

    #[tokio::test]
    async fn test_decode_recovers_typed_entity() {
        let store = MemoryStore::new();
        let gadget = Gadget {
            id: "g-1".to_string(),
            label: "flux".to_string(),
        };
        store
            .create("gadgets", serde_json::to_value(&gadget).unwrap())
            .await
            .unwrap();

        let doc = store.get("gadgets", "g-1").await.unwrap();
        let decoded: Gadget = doc.decode().unwrap();
        assert_eq!(decoded, gadget);
    }
}
