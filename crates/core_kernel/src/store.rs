//! Document-store port
//!
//! The ledger core persists through exactly one collaborator: a document
//! store offering per-document reads, creates, shallow-merge updates, and an
//! all-or-nothing atomic batch. Implementations are injected wherever ledger
//! operations run; the core never reaches for a global client.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │   Domain services (treasury, sales)          │
//! │   read-compute-write over the port           │
//! └─────────────────────────────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────────┐
//! │   DocumentStore trait (this module)          │
//! │   get / create / update / run_atomic         │
//! └─────────────────────────────────────────────┘
//!            ▲                      ▲
//!            │                      │
//!   ┌────────┴────────┐    ┌───────┴─────────┐
//!   │   MemoryStore   │    │ any server-side │
//!   │  (infra_store)  │    │ document store  │
//!   └─────────────────┘    └─────────────────┘
//! ```
//!
//! Concurrency contract: documents carry a `version` that increments on every
//! write. `AtomicOperation::Update` may pin an `expected_version`; a mismatch
//! fails the whole batch with [`StoreError::Conflict`] and the caller retries
//! the full read-compute-write unit. That optimistic loop is how concurrent
//! credits and debits against the same bank serialize without lost updates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::error::CoreError;

/// Reserved field consulted by `create`: when the payload carries a string
/// `"id"`, the store uses it as the document id instead of generating one.
/// Registry documents (banks) keep stable slugs this way.
pub const ID_FIELD: &str = "id";

/// Error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested document was not found
    #[error("Not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    /// The operation conflicts with existing data or a pinned version
    #[error("Conflict: {message}")]
    Conflict { message: String },

    /// A document payload could not be serialized or deserialized
    #[error("Serialization error: {source}")]
    Serialization {
        #[from]
        source: serde_json::Error,
    },

    /// Connection to the underlying store failed
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation timed out
    #[error("Timeout after {duration_ms}ms: {operation}")]
    Timeout { operation: String, duration_ms: u64 },

    /// The store is temporarily unavailable
    #[error("Store unavailable: {message}")]
    Unavailable { message: String },

    /// An internal adapter error occurred
    #[error("Internal store error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl StoreError {
    /// Creates a NotFound error
    pub fn not_found(collection: impl Into<String>, id: impl fmt::Display) -> Self {
        StoreError::NotFound {
            collection: collection.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Conflict error
    pub fn conflict(message: impl Into<String>) -> Self {
        StoreError::Conflict {
            message: message.into(),
        }
    }

    /// Creates a Connection error
    pub fn connection(message: impl Into<String>) -> Self {
        StoreError::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        StoreError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Returns true if this failure may succeed on retry
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Connection { .. }
                | StoreError::Timeout { .. }
                | StoreError::Unavailable { .. }
        )
    }

    /// Returns true if this error indicates the document was not found
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Returns true if this error is an optimistic-concurrency conflict
    pub fn is_conflict(&self) -> bool {
        matches!(self, StoreError::Conflict { .. })
    }
}

/// A document as held by the store
///
/// `version` starts at 1 and increments on every write; `created_at` and
/// `updated_at` are assigned by the store, not the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredDocument {
    pub id: String,
    pub data: Value,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredDocument {
    /// Deserializes the document payload into a domain entity
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// One operation inside an atomic batch
#[derive(Debug, Clone)]
pub enum AtomicOperation {
    /// Create a new document (honours an embedded `"id"` field)
    Create { collection: String, data: Value },
    /// Shallow-merge `data` into an existing document, optionally pinning
    /// the version observed when the caller read it
    Update {
        collection: String,
        id: String,
        data: Value,
        expected_version: Option<u64>,
    },
}

impl AtomicOperation {
    /// Builds a create operation from a serializable entity
    pub fn create<T: Serialize>(collection: &str, entity: &T) -> Result<Self, StoreError> {
        Ok(AtomicOperation::Create {
            collection: collection.to_string(),
            data: serde_json::to_value(entity)?,
        })
    }

    /// Builds a version-pinned update from a serializable entity
    pub fn update<T: Serialize>(
        collection: &str,
        id: impl fmt::Display,
        entity: &T,
        expected_version: u64,
    ) -> Result<Self, StoreError> {
        Ok(AtomicOperation::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            data: serde_json::to_value(entity)?,
            expected_version: Some(expected_version),
        })
    }

    /// Returns the collection this operation targets
    pub fn collection(&self) -> &str {
        match self {
            AtomicOperation::Create { collection, .. } => collection,
            AtomicOperation::Update { collection, .. } => collection,
        }
    }
}

/// The port every ledger operation persists through
///
/// All methods are async and return `Result<T, StoreError>` so the same
/// service code runs against the in-memory adapter and any server-side
/// document store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Retrieves a document, or `StoreError::NotFound`
    async fn get(&self, collection: &str, id: &str) -> Result<StoredDocument, StoreError>;

    /// Creates a document and returns its id
    ///
    /// The store assigns `created_at`; an embedded string `"id"` field is
    /// honoured as the document id, otherwise the store generates one.
    /// Creating an id that already exists is a `Conflict`.
    async fn create(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Shallow-merges the patch object's top-level fields into a document
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Applies a batch of operations all-or-nothing
    ///
    /// Any failure (missing target, create conflict, version mismatch)
    /// leaves no operation of the batch visible to readers.
    async fn run_atomic(&self, operations: Vec<AtomicOperation>) -> Result<(), StoreError>;
}

/// Retry knobs for the optimistic write loop
///
/// Only transient store failures and version conflicts are retried; domain
/// validation errors surface immediately.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Additional attempts after the first failure
    pub max_retries: u32,
    /// Base delay between attempts (exponential backoff)
    pub retry_delay_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_delay_ms: 25,
        }
    }
}

impl StoreConfig {
    /// Loads configuration from `LEDGER_`-prefixed environment variables,
    /// falling back to defaults for anything unset
    pub fn from_env() -> Result<Self, CoreError> {
        config::Config::builder()
            .add_source(config::Environment::with_prefix("LEDGER"))
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| CoreError::configuration(e.to_string()))
    }

    /// Backoff delay before the given retry attempt (0-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(1u64 << attempt.min(6)))
    }

    /// Whether a failed atomic write should be attempted again
    ///
    /// Transient store failures and optimistic-concurrency conflicts are
    /// retryable; everything else surfaces immediately. `attempt` counts
    /// completed tries beyond the first (0-based).
    pub fn should_retry(&self, error: &StoreError, attempt: u32) -> bool {
        attempt < self.max_retries && (error.is_transient() || error.is_conflict())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_store_error_not_found() {
        let error = StoreError::not_found("banks", "cost_vault");
        assert!(error.is_not_found());
        assert!(!error.is_transient());
        assert!(error.to_string().contains("banks/cost_vault"));
    }

    #[test]
    fn test_store_error_transient_classification() {
        let timeout = StoreError::Timeout {
            operation: "run_atomic".to_string(),
            duration_ms: 5000,
        };
        assert!(timeout.is_transient());

        let unavailable = StoreError::Unavailable {
            message: "maintenance".to_string(),
        };
        assert!(unavailable.is_transient());

        let conflict = StoreError::conflict("version moved");
        assert!(!conflict.is_transient());
        assert!(conflict.is_conflict());
    }

    #[test]
    fn test_atomic_operation_builders() {
        let op = AtomicOperation::create("movements", &json!({"amount": "10.00"})).unwrap();
        assert_eq!(op.collection(), "movements");

        let op = AtomicOperation::update("banks", "cost_vault", &json!({"x": 1}), 7).unwrap();
        match op {
            AtomicOperation::Update {
                id,
                expected_version,
                ..
            } => {
                assert_eq!(id, "cost_vault");
                assert_eq!(expected_version, Some(7));
            }
            _ => panic!("expected update"),
        }
    }

    #[test]
    fn test_stored_document_decode() {
        let doc = StoredDocument {
            id: "d1".to_string(),
            data: json!({"name": "Cost Vault", "count": 3}),
            version: 1,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        #[derive(Deserialize)]
        struct Payload {
            name: String,
            count: u32,
        }

        let payload: Payload = doc.decode().unwrap();
        assert_eq!(payload.name, "Cost Vault");
        assert_eq!(payload.count, 3);
    }

    #[test]
    fn test_store_config_defaults_and_backoff() {
        let config = StoreConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_delay_ms, 25);

        assert_eq!(config.retry_delay(0), Duration::from_millis(25));
        assert_eq!(config.retry_delay(1), Duration::from_millis(50));
        assert_eq!(config.retry_delay(2), Duration::from_millis(100));
    }

    #[test]
    fn test_store_config_from_env_overrides() {
        std::env::set_var("LEDGER_MAX_RETRIES", "5");
        let config = StoreConfig::from_env().unwrap();
        std::env::remove_var("LEDGER_MAX_RETRIES");

        assert_eq!(config.max_retries, 5);
        // Anything unset falls back to the default.
        assert_eq!(config.retry_delay_ms, 25);
    }

    #[test]
    fn test_should_retry_classification() {
        let config = StoreConfig::default();

        let transient = StoreError::connection("socket closed");
        assert!(config.should_retry(&transient, 0));
        assert!(config.should_retry(&transient, 2));
        assert!(!config.should_retry(&transient, 3));

        let conflict = StoreError::conflict("version moved");
        assert!(config.should_retry(&conflict, 0));

        let not_found = StoreError::not_found("banks", "missing");
        assert!(!config.should_retry(&not_found, 0));
    }
}
