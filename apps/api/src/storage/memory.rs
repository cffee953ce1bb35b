use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::content::ContentModel;
use crate::storage::{DocumentStore, StorageError, StoredDocument};

/// Process-local store used when no database is configured.
#[derive(Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<StoredDocument>>,
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn save(&self, content: &ContentModel, owner_id: &str) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        self.documents.write().await.push(StoredDocument {
            id,
            owner_id: owner_id.to_string(),
            kind: content.kind,
            title: content.title.clone(),
            content: content.clone(),
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<StoredDocument>, StorageError> {
        // Insertion order is chronological; reverse for newest first.
        Ok(self
            .documents
            .read()
            .await
            .iter()
            .rev()
            .filter(|d| d.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn get(&self, id: Uuid) -> Result<StoredDocument, StorageError> {
        self.documents
            .read()
            .await
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(StorageError::NotFound(id))
    }

    async fn rename(&self, id: Uuid, title: &str) -> Result<(), StorageError> {
        let mut documents = self.documents.write().await;
        let document = documents
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or(StorageError::NotFound(id))?;
        document.title = title.to_string();
        document.content.title = title.to_string();
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<u64, StorageError> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| !ids.contains(&d.id));
        Ok((before - documents.len()) as u64)
    }
}
