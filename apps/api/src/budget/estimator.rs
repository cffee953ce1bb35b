//! Budget Estimator: printing cost and budget verdict for a generated document.
//!
//! # Cost policy
//! - Page count is the producer's estimate, raised to the structural baseline
//!   (cover + contents + introduction + conclusion) when it undershoots.
//! - Colour-recommended sections are priced at the colour rate, one page each.
//! - `cost = (pages - color_pages) * black_white + color_pages * color`
//! - `over_budget = cost > budget`. Advisory only: nothing here blocks export.
//!
//! All money is `rust_decimal::Decimal`, so `cost == budget` is exact.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::ContentModel;

// ────────────────────────────────────────────────────────────────────────────
// Types
// ────────────────────────────────────────────────────────────────────────────

/// Per-page print prices in a single currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSchedule {
    pub currency: String,
    pub black_white: Decimal,
    pub color: Decimal,
}

impl Default for PriceSchedule {
    /// Typical copy-shop rates the product form starts with.
    fn default() -> Self {
        Self {
            currency: "XAF".to_string(),
            black_white: Decimal::from(25),
            color: Decimal::from(100),
        }
    }
}

/// What the estimator needs to know about a document's shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDemand {
    /// The generator's page estimate (untrusted hint).
    pub producer_estimate: u32,
    /// Sections flagged for colour printing.
    pub color_pages: u32,
    /// Minimum physical pages any document of this shape occupies.
    pub baseline: u32,
}

impl PageDemand {
    pub fn from_model(model: &ContentModel) -> Self {
        Self {
            producer_estimate: model.estimated_pages,
            color_pages: model.color_section_count(),
            baseline: baseline_pages(model.cover.is_some()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetEstimate {
    pub pages: u32,
    pub color_pages: u32,
    pub cost: Decimal,
    pub budget: Decimal,
    pub currency: String,
    pub over_budget: bool,
    pub advisory: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum BudgetError {
    #[error("{field} price must not be negative (got {value})")]
    NegativePrice { field: &'static str, value: Decimal },

    #[error("budget must not be negative (got {0})")]
    NegativeBudget(Decimal),

    #[error("printing cost of {pages} pages is too large to compute")]
    Overflow { pages: u32 },
}

// ────────────────────────────────────────────────────────────────────────────
// Core functions
// ────────────────────────────────────────────────────────────────────────────

/// Contents + introduction + conclusion, plus the cover when there is one.
pub fn baseline_pages(has_cover: bool) -> u32 {
    3 + u32::from(has_cover)
}

/// Rejects negative prices or budgets. Zero is valid everywhere.
pub fn validate_inputs(prices: &PriceSchedule, budget: Decimal) -> Result<(), BudgetError> {
    if prices.black_white.is_sign_negative() && !prices.black_white.is_zero() {
        return Err(BudgetError::NegativePrice {
            field: "black_white",
            value: prices.black_white,
        });
    }
    if prices.color.is_sign_negative() && !prices.color.is_zero() {
        return Err(BudgetError::NegativePrice {
            field: "color",
            value: prices.color,
        });
    }
    if budget.is_sign_negative() && !budget.is_zero() {
        return Err(BudgetError::NegativeBudget(budget));
    }
    Ok(())
}

/// Computes the printing cost and the over-budget verdict for a page demand.
pub fn estimate(
    prices: &PriceSchedule,
    budget: Decimal,
    demand: PageDemand,
) -> Result<BudgetEstimate, BudgetError> {
    validate_inputs(prices, budget)?;

    let pages = demand.producer_estimate.max(demand.baseline);
    let color_pages = demand.color_pages.min(pages);
    let bw_pages = pages - color_pages;

    let overflow = || BudgetError::Overflow { pages };
    let cost = Decimal::from(bw_pages)
        .checked_mul(prices.black_white)
        .zip(Decimal::from(color_pages).checked_mul(prices.color))
        .and_then(|(bw, color)| bw.checked_add(color))
        .ok_or_else(overflow)?;
    let over_budget = cost > budget;

    let mut advisory = if over_budget {
        let mut text = format!(
            "Estimated printing cost {:.2} {cur} exceeds the {:.2} {cur} budget by {:.2} {cur}.",
            cost,
            budget,
            cost.checked_sub(budget).ok_or_else(overflow)?,
            cur = prices.currency
        );
        if color_pages > 0 {
            let all_bw = Decimal::from(pages)
                .checked_mul(prices.black_white)
                .ok_or_else(overflow)?;
            text.push_str(&format!(
                " Printing the {color_pages} colour-recommended page(s) in black and white would cost {:.2} {}.",
                all_bw, prices.currency
            ));
        }
        text
    } else {
        format!(
            "Estimated printing cost {:.2} {cur} fits the {:.2} {cur} budget ({:.2} {cur} remaining).",
            cost,
            budget,
            budget.checked_sub(cost).ok_or_else(overflow)?,
            cur = prices.currency
        )
    };

    if demand.producer_estimate < demand.baseline {
        advisory.push_str(&format!(
            " Page estimate raised from {} to the {}-page minimum.",
            demand.producer_estimate, demand.baseline
        ));
    }

    Ok(BudgetEstimate {
        pages,
        color_pages,
        cost,
        budget,
        currency: prices.currency.clone(),
        over_budget,
        advisory,
    })
}

/// Estimates a stored document, appending the producer's own recommendation
/// to the advisory when it gave one.
pub fn estimate_for_model(
    model: &ContentModel,
    prices: &PriceSchedule,
    budget: Decimal,
) -> Result<BudgetEstimate, BudgetError> {
    let mut estimate = estimate(prices, budget, PageDemand::from_model(model))?;
    if let Some(recommendation) = model
        .recommendation
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
    {
        estimate.advisory.push(' ');
        estimate.advisory.push_str(recommendation);
    }
    Ok(estimate)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
