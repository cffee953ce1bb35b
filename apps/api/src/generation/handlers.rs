//! Axum route handlers for the Generation API.

use axum::{extract::State, Json};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::budget::{estimate_for_model, BudgetEstimate};
use crate::content::ContentModel;
use crate::errors::AppError;
use crate::generation::{GenerationError, GenerationRequest};
use crate::layout::{project, TocEntry};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub document_id: Uuid,
    pub document: ContentModel,
    pub estimate: BudgetEstimate,
    pub toc: Vec<TocEntry>,
}

/// POST /api/v1/documents/generate
///
/// Generate → validate → save → estimate → project TOC.
/// The budget verdict is advisory: an over-budget document is still saved.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerationRequest>,
) -> Result<Json<GenerateResponse>, AppError> {
    request.validate()?;

    let document = state.generator.generate(&request).await?;
    document
        .validate()
        .map_err(|e| GenerationError::Malformed(e.to_string()))?;

    let document_id = state.store.save(&document, &request.owner_id).await?;
    let estimate = estimate_for_model(&document, &request.prices, request.budget)?;
    let toc = project(&document);

    info!(
        "Document {document_id}: {} pages, cost {} {} (over budget: {})",
        estimate.pages, estimate.cost, estimate.currency, estimate.over_budget
    );

    Ok(Json(GenerateResponse {
        document_id,
        document,
        estimate,
        toc,
    }))
}
