//! Export pipeline: PageBlocks to PDF or `.doc`.
//!
//! # PDF export
//! 1. Open one render surface for the whole call.
//! 2. For each block in order: check cancellation, render, capture, JPEG-encode,
//!    append as one A4 page. A started block always runs to completion.
//! 3. Release the surface, then serialize the PDF.
//!
//! Any failing block fails the export; no partial artifact is returned.
//! The PDF export is CPU-bound and synchronous. Async callers run it on the
//! blocking pool.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::export::document::render_document;
use crate::export::naming::artifact_file_name;
use crate::export::pdf::{encode_jpeg, PdfBuilder};
use crate::export::raster::PageRenderer;
use crate::export::ExportError;
use crate::layout::PageBlock;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DOC_CONTENT_TYPE: &str = "application/msword";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSettings {
    /// Prefix of every download name.
    pub product_name: String,
    pub jpeg_quality: u8,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            product_name: "Folio".to_string(),
            jpeg_quality: 95,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Artifact {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
    pub page_count: usize,
}

pub struct ExportPipeline {
    renderer: Arc<dyn PageRenderer>,
    settings: ExportSettings,
}

impl ExportPipeline {
    pub fn new(renderer: Arc<dyn PageRenderer>, settings: ExportSettings) -> Self {
        Self { renderer, settings }
    }

    /// Rasterizes every block onto its own A4 PDF page.
    pub fn export_pdf(
        &self,
        blocks: &[PageBlock],
        cancel: &CancellationToken,
    ) -> Result<Artifact, ExportError> {
        let title = document_title(blocks)?;
        let total = blocks.len();
        let mut pdf = PdfBuilder::new();

        {
            let mut surface = self.renderer.open_surface()?;
            for block in blocks {
                if cancel.is_cancelled() {
                    warn!(
                        "PDF export cancelled before page {} of {}",
                        block.ordinal, total
                    );
                    return Err(ExportError::Cancelled {
                        next_ordinal: block.ordinal,
                        total,
                    });
                }

                let raster = surface.render(block)?;
                let jpeg = encode_jpeg(&raster, self.settings.jpeg_quality)?;
                pdf.add_jpeg_page(&jpeg, raster.width, raster.height);
                debug!(
                    "Page {}/{} captured ({} bytes JPEG)",
                    block.ordinal,
                    total,
                    jpeg.len()
                );
            }
            // Surface is released here, before the PDF is serialized.
        }

        let page_count = pdf.page_count();
        if page_count != total {
            return Err(ExportError::Encoding(format!(
                "PDF has {page_count} pages for {total} blocks"
            )));
        }

        let bytes = pdf.finish();
        let file_name = artifact_file_name(&self.settings.product_name, title, "pdf");
        info!(
            "Exported {} ({} pages, {} bytes)",
            file_name,
            page_count,
            bytes.len()
        );

        Ok(Artifact {
            file_name,
            content_type: PDF_CONTENT_TYPE,
            bytes,
            page_count,
        })
    }

    /// Writes every block as one page-break-delimited fragment.
    pub fn export_document(&self, blocks: &[PageBlock]) -> Result<Artifact, ExportError> {
        let title = document_title(blocks)?;
        let html = render_document(blocks)?;
        let file_name = artifact_file_name(&self.settings.product_name, title, "doc");
        info!("Exported {} ({} pages)", file_name, blocks.len());

        Ok(Artifact {
            file_name,
            content_type: DOC_CONTENT_TYPE,
            bytes: html.into_bytes(),
            page_count: blocks.len(),
        })
    }
}

fn document_title(blocks: &[PageBlock]) -> Result<&str, ExportError> {
    blocks
        .first()
        .map(|b| b.header.title.as_str())
        .ok_or(ExportError::Empty)
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
