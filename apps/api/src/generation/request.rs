//! Generation request accepted by `POST /api/v1/documents/generate`.

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

use crate::budget::estimator::{validate_inputs, BudgetError, PriceSchedule};
use crate::content::{DocumentKind, ImageAsset, Language};

pub const MAX_PAGE_COUNT: u32 = 60;

fn default_budget() -> Decimal {
    Decimal::from(1000)
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationRequest {
    pub owner_id: String,
    /// Printed on the cover as the presenting author.
    pub author_name: String,
    #[serde(default)]
    pub kind: DocumentKind,
    pub topic: String,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub prices: PriceSchedule,
    #[serde(default = "default_budget")]
    pub budget: Decimal,
    /// Target length for essay-like kinds.
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
    #[serde(default)]
    pub supervisor: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub objectives: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub citation: Option<String>,
    /// Caller-supplied generator key. Takes precedence over the server key.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub logo: Option<ImageAsset>,
    #[serde(default)]
    pub emblem: Option<ImageAsset>,
}

#[derive(Debug, Error, PartialEq)]
pub enum RequestError {
    #[error("'{0}' cannot be empty")]
    EmptyField(&'static str),

    #[error("{0} documents need a page_count")]
    MissingPageCount(&'static str),

    #[error("page_count must be between 1 and {} (got {0})", MAX_PAGE_COUNT)]
    PageCountOutOfRange(u32),

    #[error(transparent)]
    Budget(#[from] BudgetError),
}

impl GenerationRequest {
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.owner_id.trim().is_empty() {
            return Err(RequestError::EmptyField("owner_id"));
        }
        if self.topic.trim().is_empty() {
            return Err(RequestError::EmptyField("topic"));
        }
        if self.kind.is_essay_like() {
            match self.page_count {
                None => return Err(RequestError::MissingPageCount(self.kind.as_str())),
                Some(n) if n == 0 || n > MAX_PAGE_COUNT => {
                    return Err(RequestError::PageCountOutOfRange(n))
                }
                Some(_) => {}
            }
        }
        validate_inputs(&self.prices, self.budget)?;
        Ok(())
    }
}
