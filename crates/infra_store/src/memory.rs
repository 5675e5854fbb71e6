//! In-memory document store
//!
//! This adapter keeps every collection in a process-local map behind a
//! single async lock. `run_atomic` validates the whole batch against the
//! current state before touching anything, so a batch either applies in
//! full or leaves the store unchanged.
//!
//! Failure injection (`with_transient_failures`) makes the next N store
//! calls fail with a transient error, which is how retry behaviour is
//! exercised in tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{AtomicOperation, DocumentStore, StoreError, StoredDocument, ID_FIELD};

type Collections = HashMap<String, HashMap<String, StoredDocument>>;

/// In-memory implementation of [`DocumentStore`]
///
/// Cloning is cheap; clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<tokio::sync::RwLock<Collections>>,
    transient_failures: Arc<AtomicU32>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` store calls fail with a transient error
    pub fn with_transient_failures(&self, count: u32) {
        self.transient_failures.store(count, Ordering::SeqCst);
    }

    /// Number of documents currently held in a collection
    pub async fn document_count(&self, collection: &str) -> usize {
        self.collections
            .read()
            .await
            .get(collection)
            .map_or(0, HashMap::len)
    }

    /// Snapshot of every document in a collection, oldest first
    pub async fn documents(&self, collection: &str) -> Vec<StoredDocument> {
        let guard = self.collections.read().await;
        let mut docs: Vec<StoredDocument> = guard
            .get(collection)
            .map(|c| c.values().cloned().collect())
            .unwrap_or_default();
        docs.sort_by_key(|d| d.created_at);
        docs
    }

    fn take_transient_failure(&self) -> Result<(), StoreError> {
        let injected = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            return Err(StoreError::Unavailable {
                message: "injected transient failure".to_string(),
            });
        }
        Ok(())
    }
}

/// Pulls the document key out of the payload, or mints a fresh one
fn document_id(data: &Value) -> String {
    data.get(ID_FIELD)
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

/// Shallow-merges a patch into a document and bumps its version
fn apply_patch(doc: &mut StoredDocument, patch: Value) {
    match (doc.data.as_object_mut(), patch) {
        (Some(target), Value::Object(fields)) => {
            for (key, value) in fields {
                target.insert(key, value);
            }
        }
        (_, patch) => doc.data = patch,
    }
    doc.version += 1;
    doc.updated_at = Utc::now();
}

#[async_trait]
impl DocumentStore for MemoryStore {
    #[instrument(skip(self), level = "debug")]
    async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StoreError> {
        self.take_transient_failure()?;
        self.collections
            .read()
            .await
            .get(collection)
            .and_then(|c| c.get(id))
            .cloned()
            .ok_or_else(|| StoreError::not_found(collection, id))
    }

    #[instrument(skip(self, data), level = "debug")]
    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        self.take_transient_failure()?;
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection.to_string()).or_default();

        let id = document_id(&data);
        if docs.contains_key(&id) {
            return Err(StoreError::conflict(format!(
                "document '{id}' already exists in '{collection}'"
            )));
        }

        let now = Utc::now();
        docs.insert(
            id.clone(),
            StoredDocument {
                id: id.clone(),
                data,
                version: 1,
                created_at: now,
                updated_at: now,
            },
        );
        debug!(collection, id = %id, "document created");
        Ok(id)
    }

    #[instrument(skip(self, patch), level = "debug")]
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        self.take_transient_failure()?;
        let mut guard = self.collections.write().await;
        let doc = guard
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or_else(|| StoreError::not_found(collection, id))?;
        apply_patch(doc, patch);
        Ok(())
    }

    #[instrument(skip(self, operations), level = "debug")]
    async fn run_atomic(&self, operations: Vec<AtomicOperation>) -> Result<(), StoreError> {
        self.take_transient_failure()?;
        let mut guard = self.collections.write().await;

        // Validate everything before mutating anything.
        for operation in &operations {
            match operation {
                AtomicOperation::Create { collection, data } => {
                    if let Some(id) = data.get(ID_FIELD).and_then(Value::as_str) {
                        let exists = guard
                            .get(collection.as_str())
                            .is_some_and(|c| c.contains_key(id));
                        if exists {
                            return Err(StoreError::conflict(format!(
                                "document '{id}' already exists in '{collection}'"
                            )));
                        }
                    }
                }
                AtomicOperation::Update {
                    collection,
                    id,
                    expected_version,
                    ..
                } => {
                    let doc = guard
                        .get(collection.as_str())
                        .and_then(|c| c.get(id.as_str()))
                        .ok_or_else(|| StoreError::not_found(collection, id))?;
                    if let Some(expected) = expected_version {
                        if doc.version != *expected {
                            return Err(StoreError::conflict(format!(
                                "version mismatch on '{collection}/{id}': expected {expected}, found {}",
                                doc.version
                            )));
                        }
                    }
                }
            }
        }

        let count = operations.len();
        for operation in operations {
            match operation {
                AtomicOperation::Create { collection, data } => {
                    let docs = guard.entry(collection).or_default();
                    let id = document_id(&data);
                    let now = Utc::now();
                    docs.insert(
                        id.clone(),
                        StoredDocument {
                            id,
                            data,
                            version: 1,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                }
                AtomicOperation::Update {
                    collection, id, data, ..
                } => {
                    // Validated above, so the document is present.
                    if let Some(doc) = guard.get_mut(&collection).and_then(|c| c.get_mut(&id)) {
                        apply_patch(doc, data);
                    }
                }
            }
        }
        debug!(operations = count, "atomic batch applied");
        Ok(())
    }
}
