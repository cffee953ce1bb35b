//! Rasterization seam.
//!
//! `PageRenderer` hands out a `RenderSurface` that is owned by exactly one
//! export call. The surface renders blocks one at a time; the pixels of page
//! N are captured and the surface cleared before page N+1 is drawn. Dropping
//! the surface releases it, on success and on failure alike.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::export::geometry::PageGeometry;
use crate::export::svg::page_svg;
use crate::export::ExportError;
use crate::layout::PageBlock;

/// Captured page pixels, 8-bit RGB, row-major, no padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

pub trait PageRenderer: Send + Sync {
    /// Allocates a fresh surface for one export.
    fn open_surface(&self) -> Result<Box<dyn RenderSurface + '_>, ExportError>;
}

pub trait RenderSurface {
    fn render(&mut self, block: &PageBlock) -> Result<RasterImage, ExportError>;
}

// ────────────────────────────────────────────────────────────────────────────
// SVG renderer (usvg + resvg + tiny-skia)
// ────────────────────────────────────────────────────────────────────────────

pub struct SvgRenderer {
    geometry: PageGeometry,
    fontdb: Arc<usvg::fontdb::Database>,
}

impl SvgRenderer {
    /// Renderer backed by the system fonts.
    pub fn new(geometry: PageGeometry) -> Self {
        let mut fontdb = usvg::fontdb::Database::new();
        fontdb.load_system_fonts();
        if fontdb.is_empty() {
            warn!("No system fonts found, page text will not be rendered");
        } else {
            debug!("Loaded {} font faces for page rendering", fontdb.len());
        }
        Self::with_fontdb(geometry, Arc::new(fontdb))
    }

    pub fn with_fontdb(geometry: PageGeometry, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { geometry, fontdb }
    }
}

impl PageRenderer for SvgRenderer {
    fn open_surface(&self) -> Result<Box<dyn RenderSurface + '_>, ExportError> {
        let (width, height) = (self.geometry.pixel_width(), self.geometry.pixel_height());
        let pixmap = tiny_skia::Pixmap::new(width, height).ok_or_else(|| {
            ExportError::Encoding(format!("Failed to create pixmap ({width}x{height})"))
        })?;
        Ok(Box::new(SvgSurface {
            renderer: self,
            pixmap,
            rendered: 0,
        }))
    }
}

struct SvgSurface<'a> {
    renderer: &'a SvgRenderer,
    pixmap: tiny_skia::Pixmap,
    rendered: u32,
}

impl RenderSurface for SvgSurface<'_> {
    fn render(&mut self, block: &PageBlock) -> Result<RasterImage, ExportError> {
        let failure = |reason: String| ExportError::Rasterization {
            ordinal: block.ordinal,
            kind: block.kind.as_str(),
            reason,
        };

        let svg = page_svg(block)?;
        let tree = {
            let mut opts = usvg::Options::default();
            opts.fontdb = Arc::clone(&self.renderer.fontdb);
            usvg::Tree::from_str(&svg, &opts)
                .map_err(|e| failure(format!("SVG parsing failed: {e}")))?
        };

        let scale = self.renderer.geometry.scale();
        self.pixmap.fill(tiny_skia::Color::WHITE);
        resvg::render(
            &tree,
            tiny_skia::Transform::from_scale(scale, scale),
            &mut self.pixmap.as_mut(),
        );

        let image = capture_rgb(&self.pixmap);
        // Clear before the next page is drawn.
        self.pixmap.fill(tiny_skia::Color::TRANSPARENT);
        self.rendered += 1;

        debug!(
            "Rasterized page {} ({}) at {}x{}",
            block.ordinal,
            block.kind.as_str(),
            image.width,
            image.height
        );
        Ok(image)
    }
}

impl Drop for SvgSurface<'_> {
    fn drop(&mut self) {
        debug!("Released render surface after {} page(s)", self.rendered);
    }
}

/// Drops the alpha channel. The page is filled opaque white before drawing,
/// so premultiplied and straight colour are identical here.
fn capture_rgb(pixmap: &tiny_skia::Pixmap) -> RasterImage {
    let rgb = pixmap
        .data()
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();
    RasterImage {
        width: pixmap.width(),
        height: pixmap.height(),
        rgb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{PageKind, PagePayload, RunningFooter, RunningHeader};

    fn make_renderer(scale: f32) -> SvgRenderer {
        // No fonts: text is skipped, shapes still render.
        SvgRenderer::with_fontdb(
            PageGeometry::new(scale),
            Arc::new(usvg::fontdb::Database::new()),
        )
    }

    fn make_block(ordinal: u32, hint: Option<&str>) -> PageBlock {
        PageBlock {
            kind: PageKind::Section,
            ordinal,
            header: RunningHeader {
                title: "Doc".to_string(),
                label: "Part 1".to_string(),
            },
            footer: RunningFooter {
                page_number: Some(ordinal),
            },
            payload: PagePayload::Section {
                heading: "Heading".to_string(),
                body: "Body".to_string(),
                visual_hint: hint.map(str::to_string),
                color: true,
            },
        }
    }

    #[test]
    fn test_surface_renders_at_geometry_size() {
        let renderer = make_renderer(0.5);
        let mut surface = renderer.open_surface().unwrap();
        let image = surface.render(&make_block(1, None)).unwrap();
        assert_eq!((image.width, image.height), (397, 562));
        assert_eq!(image.rgb.len(), 397 * 562 * 3);
    }

    #[test]
    fn test_blank_page_is_white() {
        let renderer = make_renderer(0.5);
        let mut surface = renderer.open_surface().unwrap();
        let image = surface.render(&make_block(1, None)).unwrap();
        // Top-left corner is margin: pure white.
        assert_eq!(&image.rgb[..3], &[255, 255, 255]);
    }

    #[test]
    fn test_surface_is_cleared_between_pages() {
        let renderer = make_renderer(0.5);
        let mut surface = renderer.open_surface().unwrap();
        let with_box = surface.render(&make_block(1, Some("chart"))).unwrap();
        let without_box = surface.render(&make_block(2, None)).unwrap();
        let plain = renderer
            .open_surface()
            .unwrap()
            .render(&make_block(2, None))
            .unwrap();
        assert_ne!(with_box.rgb, without_box.rgb);
        assert_eq!(without_box.rgb, plain.rgb);
    }
}
