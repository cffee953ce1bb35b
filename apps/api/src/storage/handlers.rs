//! Axum route handlers for stored documents.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::state::AppState;
use crate::storage::StoredDocument;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub owner_id: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: Uuid,
    pub kind: String,
    pub title: String,
    pub estimated_pages: u32,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub documents: Vec<DocumentSummary>,
}

#[derive(Debug, Deserialize)]
pub struct RenameRequest {
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    pub ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: u64,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/documents?owner_id=
///
/// Newest first. Content bodies are left out; fetch a single document for those.
pub async fn handle_list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, AppError> {
    if query.owner_id.trim().is_empty() {
        return Err(AppError::Validation("owner_id cannot be empty".to_string()));
    }

    let documents = state
        .store
        .list(&query.owner_id)
        .await?
        .into_iter()
        .map(|d| DocumentSummary {
            id: d.id,
            kind: d.kind.as_str().to_string(),
            title: d.title,
            estimated_pages: d.content.estimated_pages,
            created_at: d.created_at,
        })
        .collect();

    Ok(Json(ListResponse { documents }))
}

/// GET /api/v1/documents/:id
pub async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredDocument>, AppError> {
    Ok(Json(state.store.get(id).await?))
}

/// PATCH /api/v1/documents/:id
///
/// Renames a document. Running headers of later exports use the new title.
pub async fn handle_rename_document(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RenameRequest>,
) -> Result<Json<StoredDocument>, AppError> {
    let title = request.title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }

    state.store.rename(id, title).await?;
    Ok(Json(state.store.get(id).await?))
}

/// POST /api/v1/documents/delete
///
/// Ids that do not exist are skipped; the response counts what was removed.
pub async fn handle_delete_documents(
    State(state): State<AppState>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, AppError> {
    if request.ids.is_empty() {
        return Err(AppError::Validation("ids cannot be empty".to_string()));
    }

    let deleted = state.store.delete(&request.ids).await?;
    tracing::info!("Deleted {deleted} of {} requested documents", request.ids.len());
    Ok(Json(DeleteResponse { deleted }))
}
