use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::content::{ContentModel, DocumentKind};
use crate::models::document::DocumentRow;
use crate::storage::{DocumentStore, StorageError, StoredDocument};

/// PostgreSQL-backed store. Content is kept as JSONB so the model can grow
/// optional fields without migrations.
#[derive(Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the documents table if it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                id          UUID PRIMARY KEY,
                owner_id    TEXT NOT NULL,
                kind        TEXT NOT NULL,
                title       TEXT NOT NULL,
                content     JSONB NOT NULL,
                created_at  TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS documents_owner_created_idx \
             ON documents (owner_id, created_at DESC)",
        )
        .execute(&self.pool)
        .await?;

        info!("documents schema ready");
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn save(&self, content: &ContentModel, owner_id: &str) -> Result<Uuid, StorageError> {
        let id = Uuid::new_v4();
        let payload = serde_json::to_value(content).map_err(|e| StorageError::Corrupt {
            id,
            reason: e.to_string(),
        })?;

        sqlx::query(
            r#"
            INSERT INTO documents (id, owner_id, kind, title, content)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(id)
        .bind(owner_id)
        .bind(content.kind.as_str())
        .bind(&content.title)
        .bind(&payload)
        .execute(&self.pool)
        .await?;

        info!("Saved document {id} for owner {owner_id}");
        Ok(id)
    }

    async fn list(&self, owner_id: &str) -> Result<Vec<StoredDocument>, StorageError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            "SELECT * FROM documents WHERE owner_id = $1 ORDER BY created_at DESC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(row_to_document).collect()
    }

    async fn get(&self, id: Uuid) -> Result<StoredDocument, StorageError> {
        let row = sqlx::query_as::<_, DocumentRow>("SELECT * FROM documents WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StorageError::NotFound(id))?;

        row_to_document(row)
    }

    async fn rename(&self, id: Uuid, title: &str) -> Result<(), StorageError> {
        let result = sqlx::query(
            r#"
            UPDATE documents
            SET title = $1,
                content = jsonb_set(content, '{title}', to_jsonb($1::text))
            WHERE id = $2
            "#,
        )
        .bind(title)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound(id));
        }
        Ok(())
    }

    async fn delete(&self, ids: &[Uuid]) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM documents WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

fn row_to_document(row: DocumentRow) -> Result<StoredDocument, StorageError> {
    let kind = DocumentKind::parse(&row.kind).ok_or_else(|| StorageError::Corrupt {
        id: row.id,
        reason: format!("unknown document kind '{}'", row.kind),
    })?;
    let content: ContentModel =
        serde_json::from_value(row.content).map_err(|e| StorageError::Corrupt {
            id: row.id,
            reason: e.to_string(),
        })?;

    Ok(StoredDocument {
        id: row.id,
        owner_id: row.owner_id,
        kind,
        title: row.title,
        content,
        created_at: row.created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn make_row(kind: &str, content: serde_json::Value) -> DocumentRow {
        DocumentRow {
            id: Uuid::new_v4(),
            owner_id: "owner".to_string(),
            kind: kind.to_string(),
            title: "Stored".to_string(),
            content,
            created_at: Utc::now(),
        }
    }

    fn content_json() -> serde_json::Value {
        json!({
            "title": "Stored",
            "kind": "thesis_outline",
            "introduction": "Intro",
            "sections": [{"heading": "A", "body": "Body"}],
            "conclusion": "End",
            "estimated_pages": 5
        })
    }

    #[test]
    fn test_row_to_document_decodes_jsonb_content() {
        let doc = row_to_document(make_row("thesis_outline", content_json())).unwrap();
        assert_eq!(doc.kind, DocumentKind::ThesisOutline);
        assert_eq!(doc.content.sections.len(), 1);
        assert!(!doc.content.sections[0].is_color_recommended);
        assert!(doc.content.bibliography.is_empty());
    }

    #[test]
    fn test_row_with_unknown_kind_is_corrupt() {
        let result = row_to_document(make_row("memo", content_json()));
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_row_with_unreadable_content_is_corrupt() {
        let result = row_to_document(make_row("essay", json!({"title": 3})));
        assert!(matches!(result, Err(StorageError::Corrupt { .. })));
    }
}
