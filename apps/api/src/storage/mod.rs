//! Document persistence.
//!
//! `DocumentStore` is the only seam the rest of the service sees. Two
//! backends: PostgreSQL when `DATABASE_URL` is configured, and an in-process
//! store for local runs and tests. Callers do not depend on either backend's
//! consistency model.

pub mod handlers;
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::content::{ContentModel, DocumentKind};

pub use memory::InMemoryDocumentStore;
pub use postgres::PgDocumentStore;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredDocument {
    pub id: Uuid,
    pub owner_id: String,
    pub kind: DocumentKind,
    pub title: String,
    pub content: ContentModel,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("document {0} not found")]
    NotFound(Uuid),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("stored document {id} is unreadable: {reason}")]
    Corrupt { id: Uuid, reason: String },
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Persists a freshly generated document and returns its id.
    async fn save(&self, content: &ContentModel, owner_id: &str) -> Result<Uuid, StorageError>;

    /// All documents of an owner, newest first.
    async fn list(&self, owner_id: &str) -> Result<Vec<StoredDocument>, StorageError>;

    async fn get(&self, id: Uuid) -> Result<StoredDocument, StorageError>;

    /// Renames a document. The running-header title follows the new name.
    async fn rename(&self, id: Uuid, title: &str) -> Result<(), StorageError>;

    /// Deletes every listed id that exists. Returns the number removed.
    async fn delete(&self, ids: &[Uuid]) -> Result<u64, StorageError>;
}
