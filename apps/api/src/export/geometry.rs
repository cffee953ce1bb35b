//! A4 page geometry shared by the SVG builder, the rasterizer and the PDF writer.
//!
//! Page markup is laid out on a fixed CSS-pixel canvas (96 dpi). The render
//! scale only changes how many device pixels that canvas is rasterized to;
//! the PDF page size is always A4 in points.

/// A4 at 96 dpi: 210 mm x 297 mm.
pub const CANVAS_WIDTH: f32 = 794.0;
pub const CANVAS_HEIGHT: f32 = 1123.0;

/// A4 in PDF points (1/72 inch).
pub const A4_WIDTH_PT: f32 = 595.28;
pub const A4_HEIGHT_PT: f32 = 841.89;

pub const MIN_SCALE: f32 = 0.25;
pub const MAX_SCALE: f32 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    scale: f32,
}

impl PageGeometry {
    /// Clamps the resolution multiplier into a renderable range.
    /// Non-finite values fall back to 1.0.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() {
            scale.clamp(MIN_SCALE, MAX_SCALE)
        } else {
            1.0
        };
        Self { scale }
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn pixel_width(&self) -> u32 {
        (CANVAS_WIDTH * self.scale).round() as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (CANVAS_HEIGHT * self.scale).round() as u32
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::new(2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pixel_size_follows_scale() {
        let g = PageGeometry::new(2.0);
        assert_eq!((g.pixel_width(), g.pixel_height()), (1588, 2246));

        let half = PageGeometry::new(0.5);
        assert_eq!((half.pixel_width(), half.pixel_height()), (397, 562));
    }

    #[test]
    fn test_scale_is_clamped() {
        assert_eq!(PageGeometry::new(100.0).scale(), MAX_SCALE);
        assert_eq!(PageGeometry::new(0.0).scale(), MIN_SCALE);
        assert_eq!(PageGeometry::new(f32::NAN).scale(), 1.0);
    }

    #[test]
    fn test_canvas_keeps_a4_aspect_ratio() {
        let canvas = CANVAS_HEIGHT / CANVAS_WIDTH;
        let paper = A4_HEIGHT_PT / A4_WIDTH_PT;
        assert!((canvas - paper).abs() < 0.002);
    }
}
