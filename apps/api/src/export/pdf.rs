//! Raster PDF assembly with `pdf-writer`.
//!
//! Each page is one JPEG image XObject stretched over an A4 media box.

use image::codecs::jpeg::JpegEncoder;
use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref};

use crate::export::geometry::{A4_HEIGHT_PT, A4_WIDTH_PT};
use crate::export::raster::RasterImage;
use crate::export::ExportError;

const PAGE_IMAGE: Name<'static> = Name(b"Im1");

pub struct PdfBuilder {
    pdf: Pdf,
    next_id: i32,
    catalog_id: Ref,
    pages_id: Ref,
    page_ids: Vec<Ref>,
}

impl Default for PdfBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfBuilder {
    pub fn new() -> Self {
        Self {
            pdf: Pdf::new(),
            next_id: 3,
            catalog_id: Ref::new(1),
            pages_id: Ref::new(2),
            page_ids: Vec::new(),
        }
    }

    fn alloc(&mut self) -> Ref {
        let r = Ref::new(self.next_id);
        self.next_id += 1;
        r
    }

    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Appends one A4 page showing a baseline JPEG of `width` x `height` pixels.
    pub fn add_jpeg_page(&mut self, jpeg: &[u8], width: u32, height: u32) {
        let page_id = self.alloc();
        let image_id = self.alloc();
        let content_id = self.alloc();

        {
            let mut xobj = self.pdf.image_xobject(image_id, jpeg);
            xobj.filter(Filter::DctDecode);
            xobj.width(width as i32);
            xobj.height(height as i32);
            xobj.color_space().device_rgb();
            xobj.bits_per_component(8);
        }

        let mut content = Content::new();
        content.save_state();
        content.transform([A4_WIDTH_PT, 0.0, 0.0, A4_HEIGHT_PT, 0.0, 0.0]);
        content.x_object(PAGE_IMAGE);
        content.restore_state();
        self.pdf.stream(content_id, &content.finish());

        {
            let mut page = self.pdf.page(page_id);
            page.media_box(Rect::new(0.0, 0.0, A4_WIDTH_PT, A4_HEIGHT_PT))
                .parent(self.pages_id)
                .contents(content_id);
            page.resources().x_objects().pair(PAGE_IMAGE, image_id);
        }

        self.page_ids.push(page_id);
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.pdf.catalog(self.catalog_id).pages(self.pages_id);
        self.pdf
            .pages(self.pages_id)
            .kids(self.page_ids.iter().copied())
            .count(self.page_ids.len() as i32);
        self.pdf.finish()
    }
}

pub fn encode_jpeg(image: &RasterImage, quality: u8) -> Result<Vec<u8>, ExportError> {
    let expected = image.width as usize * image.height as usize * 3;
    if image.rgb.len() != expected {
        return Err(ExportError::Encoding(format!(
            "raster buffer holds {} bytes, expected {expected} for {}x{} RGB",
            image.rgb.len(),
            image.width,
            image.height
        )));
    }

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality.clamp(1, 100))
        .encode(
            &image.rgb,
            image.width,
            image.height,
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| ExportError::Encoding(format!("JPEG encoding failed: {e}")))?;
    Ok(buf)
}
