use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{project, TocEntry};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct TocResponse {
    pub document_id: Uuid,
    pub entries: Vec<TocEntry>,
}

/// GET /api/v1/documents/:id/toc
pub async fn handle_get_toc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TocResponse>, AppError> {
    let document = state.store.get(id).await?;
    Ok(Json(TocResponse {
        document_id: id,
        entries: project(&document.content),
    }))
}
