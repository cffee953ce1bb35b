//! Axum route handlers for PDF and `.doc` export.
//!
//! Both endpoints accept an optional multipart body with `logo` and `emblem`
//! image fields. Uploaded images override the cover placeholders for this
//! export only; nothing is written back to the stored document.

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderName},
    response::IntoResponse,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::content::ImageAsset;
use crate::errors::AppError;
use crate::export::Artifact;
use crate::layout::{partition, CosmeticOverrides, PageBlock};
use crate::state::AppState;

const PAGE_COUNT_HEADER: HeaderName = HeaderName::from_static("x-page-count");

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/documents/:id/export/pdf
///
/// Rasterizes on the blocking pool. If the client goes away mid-export the
/// request future is dropped, which cancels the token; the pipeline then stops
/// before the next page.
pub async fn handle_export_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Option<Multipart>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = read_overrides(multipart).await?;
    let blocks = load_blocks(&state, id, &overrides).await?;
    info!("PDF export of {id}: {} pages", blocks.len());

    let cancel = tokio_util::sync::CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let exporter = state.exporter.clone();
    let artifact = tokio::task::spawn_blocking(move || exporter.export_pdf(&blocks, &cancel))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export task failed: {e}")))??;

    archive(&state, id, &artifact).await;
    Ok(attachment(artifact))
}

/// POST /api/v1/documents/:id/export/doc
pub async fn handle_export_doc(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    multipart: Option<Multipart>,
) -> Result<impl IntoResponse, AppError> {
    let overrides = read_overrides(multipart).await?;
    let blocks = load_blocks(&state, id, &overrides).await?;

    let artifact = state.exporter.export_document(&blocks)?;

    archive(&state, id, &artifact).await;
    Ok(attachment(artifact))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_blocks(
    state: &AppState,
    id: Uuid,
    overrides: &CosmeticOverrides,
) -> Result<Vec<PageBlock>, AppError> {
    let document = state.store.get(id).await?;
    if !overrides.is_empty() {
        info!("Applying uploaded cover images to {id}");
    }
    Ok(partition(&document.content, overrides)?)
}

/// Collects `logo` / `emblem` uploads. Empty fields and unknown names are skipped.
async fn read_overrides(multipart: Option<Multipart>) -> Result<CosmeticOverrides, AppError> {
    let mut overrides = CosmeticOverrides::default();
    let Some(mut multipart) = multipart else {
        return Ok(overrides);
    };

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("could not read field '{name}': {e}")))?;
        if data.is_empty() {
            continue;
        }

        match name.as_str() {
            "logo" => overrides.logo = Some(ImageAsset::new(data.to_vec())),
            "emblem" => overrides.emblem = Some(ImageAsset::new(data.to_vec())),
            other => warn!("Ignoring unexpected upload field '{other}'"),
        }
    }

    Ok(overrides)
}

/// Archiving never fails the download.
async fn archive(state: &AppState, id: Uuid, artifact: &Artifact) {
    if let Some(archive) = &state.archive {
        if let Err(e) = archive.store(id, artifact).await {
            warn!("Could not archive {}: {e:#}", artifact.file_name);
        }
    }
}

fn attachment(artifact: Artifact) -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.file_name),
            ),
            (PAGE_COUNT_HEADER, artifact.page_count.to_string()),
        ],
        artifact.bytes,
    )
}
