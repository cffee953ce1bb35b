// Export: PageBlocks in, binary artifacts out.
// Both exporters walk the same block slice so the PDF and the .doc always
// have one physical page per block.

pub mod archive;
pub mod document;
pub mod geometry;
pub mod handlers;
pub mod naming;
pub mod pdf;
pub mod pipeline;
pub mod raster;
pub mod svg;

use thiserror::Error;

use crate::content::ImageAsset;
use crate::layout::PageBlock;

pub use archive::ArtifactArchive;
pub use geometry::PageGeometry;
pub use pipeline::{Artifact, ExportPipeline, ExportSettings};
pub use raster::{PageRenderer, RasterImage, RenderSurface, SvgRenderer};

#[derive(Debug, Error)]
pub enum ExportError {
    /// A single page could not be rasterized. The whole export is aborted.
    #[error("failed to rasterize page {ordinal} ({kind}): {reason}")]
    Rasterization {
        ordinal: u32,
        kind: &'static str,
        reason: String,
    },

    #[error("export cancelled before page {next_ordinal} of {total}")]
    Cancelled { next_ordinal: u32, total: usize },

    #[error("nothing to export: the page list is empty")]
    Empty,

    #[error("artifact encoding failed: {0}")]
    Encoding(String),
}

/// Both exporters reject a cover image that is not a decodable PNG or JPEG,
/// so the PDF and the `.doc` fail on the same page.
pub(crate) fn check_cover_image(asset: &ImageAsset, block: &PageBlock) -> Result<(), ExportError> {
    let failure = |reason: String| ExportError::Rasterization {
        ordinal: block.ordinal,
        kind: block.kind.as_str(),
        reason,
    };
    if asset.media_type().is_none() {
        return Err(failure("cover image is not PNG or JPEG".to_string()));
    }
    image::load_from_memory(asset.bytes())
        .map_err(|e| failure(format!("cover image could not be decoded: {e}")))?;
    Ok(())
}
