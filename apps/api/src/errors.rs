use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::budget::BudgetError;
use crate::export::ExportError;
use crate::generation::{GenerationError, RequestError};
use crate::layout::LayoutError;
use crate::storage::StorageError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::NotFound(id) => AppError::NotFound(format!("document {id}")),
            StorageError::Database(e) => AppError::Database(e),
            corrupt @ StorageError::Corrupt { .. } => AppError::Internal(corrupt.into()),
        }
    }
}

impl From<BudgetError> for AppError {
    fn from(e: BudgetError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl From<RequestError> for AppError {
    fn from(e: RequestError) -> Self {
        AppError::Validation(e.to_string())
    }
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Generation(e) => match e {
                GenerationError::MissingCredential => "MISSING_CREDENTIAL",
                GenerationError::InvalidCredential(_) => "INVALID_CREDENTIAL",
                GenerationError::Network(_) => "UPSTREAM_NETWORK",
                GenerationError::UpstreamEmpty | GenerationError::Malformed(_) => "UPSTREAM_EMPTY",
            },
            AppError::Layout(_) => "PARTITION_INVARIANT",
            AppError::Export(e) => match e {
                ExportError::Rasterization { .. } => "RASTERIZATION_FAILED",
                ExportError::Cancelled { .. } => "EXPORT_CANCELLED",
                ExportError::Empty => "PARTITION_INVARIANT",
                ExportError::Encoding(_) => "INTERNAL_ERROR",
            },
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Generation(e) => match e {
                GenerationError::MissingCredential | GenerationError::InvalidCredential(_) => {
                    StatusCode::UNAUTHORIZED
                }
                _ => StatusCode::BAD_GATEWAY,
            },
            AppError::Export(ExportError::Rasterization { .. }) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Export(ExportError::Cancelled { .. }) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Layout(_)
            | AppError::Export(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let message = match &self {
            AppError::Layout(e) => {
                tracing::error!("Partition invariant violated: {e}");
                e.to_string()
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                "A database error occurred".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                "An internal server error occurred".to_string()
            }
            AppError::Export(e @ ExportError::Encoding(_)) => {
                tracing::error!("Export error: {e}");
                "The artifact could not be encoded".to_string()
            }
            AppError::Generation(e) => {
                tracing::warn!("Generation failed: {e}");
                e.to_string()
            }
            other => other.to_string(),
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}
