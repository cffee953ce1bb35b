use axum::{
    extract::{Path, State},
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::budget::{estimate_for_model, BudgetEstimate, PriceSchedule};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EstimateRequest {
    #[serde(default)]
    pub prices: PriceSchedule,
    pub budget: Decimal,
}

/// POST /api/v1/documents/:id/estimate
///
/// Re-prices a stored document against a new schedule or budget.
pub async fn handle_estimate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<EstimateRequest>,
) -> Result<Json<BudgetEstimate>, AppError> {
    let document = state.store.get(id).await?;
    let estimate = estimate_for_model(&document.content, &request.prices, request.budget)?;
    tracing::info!(
        "Re-estimated {id}: cost {} {} against {} (over budget: {})",
        estimate.cost,
        estimate.currency,
        estimate.budget,
        estimate.over_budget
    );
    Ok(Json(estimate))
}
