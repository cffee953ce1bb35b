//! Word-compatible `.doc` export.
//!
//! Word opens HTML saved with the Office namespaces as a regular document.
//! Every `PageBlock` becomes one `<div class="page">` followed by a forced
//! page break, so the page count matches the PDF exactly.

use crate::content::CoverArt;
use crate::export::{check_cover_image, ExportError};
use crate::layout::{CoverPage, PageBlock, PageKind, PagePayload};

const STYLES: &str = r#"
@page { size: 21cm 29.7cm; margin: 2cm; }
body { font-family: Calibri, Arial, sans-serif; font-size: 12pt; color: #1a1a1a; }
div.page { page-break-after: always; }
p.running-header { font-size: 9pt; color: #666666; border-bottom: 1px solid #cccccc; }
p.running-footer { font-size: 9pt; color: #666666; text-align: center; }
div.cover { text-align: center; }
div.cover h1 { font-size: 26pt; color: #1f4e8c; margin-top: 6cm; }
div.cover .caption { color: #666666; font-size: 10pt; }
div.visual-hint { border: 1px dashed #888888; padding: 12pt; font-style: italic; text-align: center; }
div.visual-hint.color { border-color: #1f4e8c; background: #e8f1fb; }
table.toc { width: 100%; }
table.toc td.page { text-align: right; width: 3em; }
"#;

/// Builds the whole `.doc` file, BOM included.
pub fn render_document(blocks: &[PageBlock]) -> Result<String, ExportError> {
    let title = blocks
        .first()
        .map(|b| b.header.title.as_str())
        .unwrap_or_default();

    let mut out = String::with_capacity(4096 + blocks.len() * 2048);
    out.push('\u{FEFF}');
    out.push_str(
        "<html xmlns:o=\"urn:schemas-microsoft-com:office:office\" \
         xmlns:w=\"urn:schemas-microsoft-com:office:word\" \
         xmlns=\"http://www.w3.org/TR/REC-html40\">\n<head>\n\
         <meta charset=\"utf-8\">\n",
    );
    out.push_str(&format!("<title>{}</title>\n", html_escape(title)));
    out.push_str("<!--[if gte mso 9]><xml><w:WordDocument><w:View>Print</w:View></w:WordDocument></xml><![endif]-->\n");
    out.push_str(&format!("<style>{STYLES}</style>\n</head>\n<body>\n"));

    for block in blocks {
        out.push_str(&page_fragment(block)?);
    }

    out.push_str("</body>\n</html>\n");
    Ok(out)
}

fn page_fragment(block: &PageBlock) -> Result<String, ExportError> {
    let mut html = format!(
        "<div class=\"page {}\" data-ordinal=\"{}\">\n",
        block.kind.as_str(),
        block.ordinal
    );

    if block.kind != PageKind::Cover {
        html.push_str(&format!(
            "<p class=\"running-header\">{} &middot; {}</p>\n",
            html_escape(&block.header.title),
            html_escape(&block.header.label)
        ));
    }

    match &block.payload {
        PagePayload::Cover(cover) => html.push_str(&cover_fragment(cover, block)?),
        PagePayload::Contents { heading, entries } => {
            html.push_str(&format!("<h1>{}</h1>\n<table class=\"toc\">\n", html_escape(heading)));
            for entry in entries {
                html.push_str(&format!(
                    "<tr><td>{}</td><td class=\"page\">{}</td></tr>\n",
                    html_escape(&entry.title),
                    entry.page_number
                ));
            }
            html.push_str("</table>\n");
        }
        PagePayload::Prose { heading, body } => {
            html.push_str(&format!("<h1>{}</h1>\n", html_escape(heading)));
            html.push_str(&paragraphs(body));
        }
        PagePayload::Section {
            heading,
            body,
            visual_hint,
            color,
        } => {
            html.push_str(&format!("<h1>{}</h1>\n", html_escape(heading)));
            html.push_str(&paragraphs(body));
            if let Some(hint) = visual_hint {
                html.push_str(&format!(
                    "<div class=\"visual-hint{}\">{}</div>\n",
                    if *color { " color" } else { "" },
                    html_escape(hint)
                ));
            }
        }
        PagePayload::Bibliography { heading, entries } => {
            html.push_str(&format!("<h1>{}</h1>\n<ol>\n", html_escape(heading)));
            for entry in entries {
                html.push_str(&format!("<li>{}</li>\n", html_escape(entry)));
            }
            html.push_str("</ol>\n");
        }
    }

    if let Some(number) = block.footer.page_number {
        html.push_str(&format!("<p class=\"running-footer\">{number}</p>\n"));
    }
    html.push_str("</div>\n");
    Ok(html)
}

fn cover_fragment(cover: &CoverPage, block: &PageBlock) -> Result<String, ExportError> {
    let mut html = String::from("<div class=\"cover\">\n");
    for art in [&cover.logo, &cover.emblem].into_iter().flatten() {
        html.push_str(&art_fragment(art, block)?);
    }
    if let Some(institution) = &cover.institution {
        html.push_str(&format!("<p><b>{}</b></p>\n", html_escape(institution)));
    }
    if let Some(level) = &cover.level {
        html.push_str(&format!("<p class=\"caption\">{}</p>\n", html_escape(level)));
    }
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(&cover.title)));
    if let Some(subtitle) = &cover.subtitle {
        html.push_str(&format!("<h2><i>{}</i></h2>\n", html_escape(subtitle)));
    }
    if !cover.author.trim().is_empty() {
        html.push_str(&format!(
            "<p class=\"caption\">{}</p>\n<p><b>{}</b></p>\n",
            html_escape(&cover.presented_by_caption),
            html_escape(&cover.author)
        ));
    }
    if let Some(supervisor) = &cover.supervisor {
        html.push_str(&format!(
            "<p class=\"caption\">{}</p>\n<p><b>{}</b></p>\n",
            html_escape(&cover.supervisor_caption),
            html_escape(supervisor)
        ));
    }
    if let Some(date) = &cover.date {
        html.push_str(&format!("<p>{}</p>\n", html_escape(date)));
    }
    html.push_str("</div>\n");
    Ok(html)
}

fn art_fragment(art: &CoverArt, block: &PageBlock) -> Result<String, ExportError> {
    match art {
        CoverArt::Image(asset) => {
            check_cover_image(asset, block)?;
            Ok(format!(
                "<img src=\"{}\" width=\"110\" height=\"110\" alt=\"\">\n",
                asset.data_uri()
            ))
        }
        CoverArt::Text(placeholder) => Ok(format!(
            "<p class=\"caption\">[{}]</p>\n",
            html_escape(placeholder)
        )),
    }
}

fn paragraphs(body: &str) -> String {
    body.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(|p| format!("<p>{}</p>\n", html_escape(p).replace('\n', "<br>")))
        .collect()
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ImageAsset;
    use crate::layout::{RunningFooter, RunningHeader, TocEntry};

    fn make_block(ordinal: u32, kind: PageKind, payload: PagePayload) -> PageBlock {
        PageBlock {
            kind,
            ordinal,
            header: RunningHeader {
                title: "Rivers <& Lakes>".to_string(),
                label: "Introduction".to_string(),
            },
            footer: RunningFooter {
                page_number: (kind != PageKind::Contents).then_some(ordinal),
            },
            payload,
        }
    }

    fn make_blocks() -> Vec<PageBlock> {
        vec![
            make_block(
                1,
                PageKind::Contents,
                PagePayload::Contents {
                    heading: "Contents".to_string(),
                    entries: vec![TocEntry {
                        title: "Introduction".to_string(),
                        page_number: 1,
                    }],
                },
            ),
            make_block(
                2,
                PageKind::Introduction,
                PagePayload::Prose {
                    heading: "Introduction".to_string(),
                    body: "First paragraph.\n\nSecond <paragraph>.".to_string(),
                },
            ),
        ]
    }

    #[test]
    fn test_one_page_div_per_block() {
        let doc = render_document(&make_blocks()).unwrap();
        assert_eq!(doc.matches("<div class=\"page ").count(), 2);
    }

    #[test]
    fn test_document_starts_with_bom_and_office_namespace() {
        let doc = render_document(&make_blocks()).unwrap();
        assert!(doc.starts_with('\u{FEFF}'));
        assert!(doc.contains("urn:schemas-microsoft-com:office:word"));
        assert!(doc.contains("page-break-after: always"));
    }

    #[test]
    fn test_text_is_escaped() {
        let doc = render_document(&make_blocks()).unwrap();
        assert!(doc.contains("Rivers &lt;&amp; Lakes&gt;"));
        assert!(doc.contains("<p>Second &lt;paragraph&gt;.</p>"));
        assert!(!doc.contains("<paragraph>"));
    }

    #[test]
    fn test_footer_only_on_numbered_pages() {
        let doc = render_document(&make_blocks()).unwrap();
        assert_eq!(doc.matches("class=\"running-footer\"").count(), 1);
    }

    #[test]
    fn test_visual_hint_is_marked_for_color() {
        let block = make_block(
            3,
            PageKind::Section,
            PagePayload::Section {
                heading: "Part".to_string(),
                body: "Body".to_string(),
                visual_hint: Some("Bar chart".to_string()),
                color: true,
            },
        );
        let doc = render_document(&[block]).unwrap();
        assert!(doc.contains("<div class=\"visual-hint color\">Bar chart</div>"));
    }

    fn make_cover_block(logo: ImageAsset) -> PageBlock {
        make_block(
            1,
            PageKind::Cover,
            PagePayload::Cover(CoverPage {
                title: "Rivers".to_string(),
                subtitle: None,
                author: "Ada".to_string(),
                supervisor: None,
                date: None,
                institution: None,
                level: None,
                logo: Some(CoverArt::Image(logo)),
                emblem: None,
                presented_by_caption: "Presented by".to_string(),
                supervisor_caption: "Supervised by".to_string(),
            }),
        )
    }

    #[test]
    fn test_cover_png_is_inlined() {
        let mut buf = std::io::Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(image::RgbImage::new(4, 4))
            .write_to(&mut buf, image::ImageFormat::Png)
            .unwrap();
        let doc = render_document(&[make_cover_block(ImageAsset::new(buf.into_inner()))]).unwrap();
        assert!(doc.contains("<img src=\"data:image/png;base64,"));
    }

    #[test]
    fn test_undecodable_cover_image_fails() {
        let result = render_document(&[make_cover_block(ImageAsset::new(b"garbage".to_vec()))]);
        assert!(matches!(
            result,
            Err(ExportError::Rasterization {
                ordinal: 1,
                kind: "cover",
                ..
            })
        ));
    }
}
