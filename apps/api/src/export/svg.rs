//! Page markup: one standalone SVG document per `PageBlock`.
//!
//! Everything is laid out on the fixed 794x1123 canvas from `geometry`.
//! Text is wrapped greedily with approximate glyph widths. A body that does
//! not fit on its page is clipped at the bottom margin, never carried over.

use crate::content::CoverArt;
use crate::export::geometry::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::export::{check_cover_image, ExportError};
use crate::layout::{CoverPage, PageBlock, PageKind, PagePayload, TocEntry};

const MARGIN_X: f32 = 72.0;
const HEADER_BASELINE: f32 = 52.0;
const HEADER_RULE: f32 = 64.0;
const FOOTER_BASELINE: f32 = CANVAS_HEIGHT - 48.0;
const CONTENT_TOP: f32 = 140.0;
const CONTENT_BOTTOM: f32 = CANVAS_HEIGHT - 90.0;
const CONTENT_WIDTH: f32 = CANVAS_WIDTH - 2.0 * MARGIN_X;
const RIGHT_EDGE: f32 = CANVAS_WIDTH - MARGIN_X;
const CENTER_X: f32 = CANVAS_WIDTH / 2.0;

const FONT_FAMILY: &str = "DejaVu Sans, Liberation Sans, Arial, sans-serif";
const INK: &str = "#1a1a1a";
const MUTED: &str = "#666666";
const ACCENT: &str = "#1f4e8c";

const SPACE_EM: f32 = 0.28;
const COVER_ART_SIZE: f32 = 120.0;
const HINT_BOX_HEIGHT: f32 = 150.0;

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

/// Builds the SVG document for one page.
///
/// Fails only when an embedded cover image cannot be decoded.
pub fn page_svg(block: &PageBlock) -> Result<String, ExportError> {
    let mut canvas = Canvas::new();

    if block.kind != PageKind::Cover {
        draw_running_header(&mut canvas, block);
        if let Some(number) = block.footer.page_number {
            canvas.text(
                CENTER_X,
                FOOTER_BASELINE,
                &number.to_string(),
                TextStyle::new(12.0).anchor("middle").fill(MUTED),
            );
        }
    }

    match &block.payload {
        PagePayload::Cover(cover) => draw_cover(&mut canvas, cover, block)?,
        PagePayload::Contents { heading, entries } => draw_contents(&mut canvas, heading, entries),
        PagePayload::Prose { heading, body } => {
            let top = draw_heading(&mut canvas, heading, INK);
            canvas.paragraph(MARGIN_X, top, body, TextStyle::new(14.0), 22.0, CONTENT_BOTTOM);
        }
        PagePayload::Section {
            heading,
            body,
            visual_hint,
            color,
        } => {
            let top = draw_heading(&mut canvas, heading, if *color { ACCENT } else { INK });
            let body_bottom = match visual_hint {
                Some(hint) => {
                    let box_top = CONTENT_BOTTOM - HINT_BOX_HEIGHT;
                    draw_visual_hint(&mut canvas, hint, box_top, *color);
                    box_top - 20.0
                }
                None => CONTENT_BOTTOM,
            };
            canvas.paragraph(MARGIN_X, top, body, TextStyle::new(14.0), 22.0, body_bottom);
        }
        PagePayload::Bibliography { heading, entries } => {
            draw_bibliography(&mut canvas, heading, entries)
        }
    }

    Ok(canvas.finish())
}

// ────────────────────────────────────────────────────────────────────────────
// Page parts
// ────────────────────────────────────────────────────────────────────────────

fn draw_running_header(canvas: &mut Canvas, block: &PageBlock) {
    let label_width = text_width(&block.header.label, 11.0);
    let title = truncate_to_width(
        &block.header.title,
        11.0,
        CONTENT_WIDTH - label_width - 24.0,
    );
    canvas.text(
        MARGIN_X,
        HEADER_BASELINE,
        &title,
        TextStyle::new(11.0).fill(MUTED),
    );
    canvas.text(
        RIGHT_EDGE,
        HEADER_BASELINE,
        &block.header.label,
        TextStyle::new(11.0).anchor("end").fill(MUTED),
    );
    canvas.line(MARGIN_X, HEADER_RULE, RIGHT_EDGE, HEADER_RULE, "#cccccc");
}

/// Draws a page heading and returns the baseline where the body starts.
fn draw_heading(canvas: &mut Canvas, heading: &str, fill: &str) -> f32 {
    let style = TextStyle::new(24.0).bold().fill(fill);
    let lines = wrap_text(heading, 24.0, CONTENT_WIDTH);
    let mut y = CONTENT_TOP;
    for line in lines.iter().take(3) {
        canvas.text(MARGIN_X, y, line, style);
        y += 32.0;
    }
    y + 24.0
}

fn draw_cover(canvas: &mut Canvas, cover: &CoverPage, block: &PageBlock) -> Result<(), ExportError> {
    if let Some(logo) = &cover.logo {
        canvas.cover_art(logo, MARGIN_X, 60.0, block)?;
    }
    if let Some(emblem) = &cover.emblem {
        canvas.cover_art(emblem, RIGHT_EDGE - COVER_ART_SIZE, 60.0, block)?;
    }

    let between_art = CONTENT_WIDTH - 2.0 * (COVER_ART_SIZE + 10.0);
    if let Some(institution) = non_blank(&cover.institution) {
        let style = TextStyle::new(16.0).bold().anchor("middle");
        let mut y = 110.0;
        for line in wrap_text(institution, 16.0, between_art).iter().take(3) {
            canvas.text(CENTER_X, y, line, style);
            y += 22.0;
        }
    }
    if let Some(level) = non_blank(&cover.level) {
        canvas.text(
            CENTER_X,
            230.0,
            level,
            TextStyle::new(14.0).anchor("middle").fill(MUTED),
        );
    }

    canvas.line(200.0, 360.0, CANVAS_WIDTH - 200.0, 360.0, ACCENT);
    let mut y = 430.0;
    let title_style = TextStyle::new(30.0).bold().anchor("middle").fill(ACCENT);
    for line in wrap_text(&cover.title, 30.0, CONTENT_WIDTH).iter().take(4) {
        canvas.text(CENTER_X, y, line, title_style);
        y += 40.0;
    }
    if let Some(subtitle) = non_blank(&cover.subtitle) {
        y += 10.0;
        let style = TextStyle::new(18.0).italic().anchor("middle").fill("#444444");
        for line in wrap_text(subtitle, 18.0, CONTENT_WIDTH).iter().take(3) {
            canvas.text(CENTER_X, y, line, style);
            y += 26.0;
        }
    }
    canvas.line(200.0, y + 10.0, CANVAS_WIDTH - 200.0, y + 10.0, ACCENT);

    let caption = TextStyle::new(13.0).anchor("middle").fill(MUTED);
    let name = TextStyle::new(18.0).bold().anchor("middle");
    if !cover.author.trim().is_empty() {
        canvas.text(CENTER_X, 760.0, &cover.presented_by_caption, caption);
        canvas.text(CENTER_X, 786.0, cover.author.trim(), name);
    }
    if let Some(supervisor) = non_blank(&cover.supervisor) {
        canvas.text(CENTER_X, 846.0, &cover.supervisor_caption, caption);
        canvas.text(CENTER_X, 872.0, supervisor, name);
    }
    if let Some(date) = non_blank(&cover.date) {
        canvas.text(
            CENTER_X,
            1010.0,
            date,
            TextStyle::new(13.0).anchor("middle"),
        );
    }
    Ok(())
}

fn draw_contents(canvas: &mut Canvas, heading: &str, entries: &[TocEntry]) {
    let mut y = draw_heading(canvas, heading, INK) + 10.0;
    let style = TextStyle::new(14.0);
    let number_column = 48.0;

    for entry in entries {
        if y > CONTENT_BOTTOM {
            break;
        }
        let title = truncate_to_width(&entry.title, 14.0, CONTENT_WIDTH - number_column - 16.0);
        let title_end = MARGIN_X + text_width(&title, 14.0) + 6.0;
        canvas.text(MARGIN_X, y, &title, style);
        canvas.dotted_line(title_end, y, RIGHT_EDGE - number_column + 12.0);
        canvas.text(
            RIGHT_EDGE,
            y,
            &entry.page_number.to_string(),
            style.anchor("end"),
        );
        y += 32.0;
    }
}

fn draw_visual_hint(canvas: &mut Canvas, hint: &str, top: f32, color: bool) {
    let (fill, stroke) = if color {
        ("#e8f1fb", ACCENT)
    } else {
        ("#f4f4f4", "#888888")
    };
    canvas.push(format!(
        r#"<rect x="{MARGIN_X}" y="{top}" width="{CONTENT_WIDTH}" height="{HINT_BOX_HEIGHT}" rx="8" fill="{fill}" stroke="{stroke}" stroke-width="1.5" stroke-dasharray="6 4"/>"#
    ));

    let style = TextStyle::new(12.0).italic().anchor("middle").fill(stroke);
    let lines = wrap_text(hint, 12.0, CONTENT_WIDTH - 40.0);
    let shown = lines.len().min(6);
    let mut y = top + HINT_BOX_HEIGHT / 2.0 - (shown as f32 * 18.0) / 2.0 + 12.0;
    for line in lines.iter().take(shown) {
        canvas.text(CENTER_X, y, line, style);
        y += 18.0;
    }
}

fn draw_bibliography(canvas: &mut Canvas, heading: &str, entries: &[String]) {
    let mut y = draw_heading(canvas, heading, INK);
    let style = TextStyle::new(13.0);
    let indent = 28.0;

    'entries: for (i, entry) in entries.iter().enumerate() {
        canvas.text(MARGIN_X, y, &format!("{}.", i + 1), style);
        for line in wrap_text(entry, 13.0, CONTENT_WIDTH - indent) {
            if y > CONTENT_BOTTOM {
                break 'entries;
            }
            canvas.text(MARGIN_X + indent, y, &line, style);
            y += 20.0;
        }
        y += 8.0;
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

// ────────────────────────────────────────────────────────────────────────────
// Canvas
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct TextStyle<'a> {
    size: f32,
    weight: &'a str,
    font_style: &'a str,
    anchor: &'a str,
    fill: &'a str,
}

impl<'a> TextStyle<'a> {
    fn new(size: f32) -> Self {
        Self {
            size,
            weight: "normal",
            font_style: "normal",
            anchor: "start",
            fill: INK,
        }
    }

    fn bold(mut self) -> Self {
        self.weight = "bold";
        self
    }

    fn italic(mut self) -> Self {
        self.font_style = "italic";
        self
    }

    fn anchor(mut self, anchor: &'a str) -> Self {
        self.anchor = anchor;
        self
    }

    fn fill(mut self, fill: &'a str) -> Self {
        self.fill = fill;
        self
    }
}

struct Canvas {
    markup: String,
}

impl Canvas {
    fn new() -> Self {
        let mut markup = String::with_capacity(16 * 1024);
        markup.push_str(&format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = CANVAS_WIDTH,
            h = CANVAS_HEIGHT
        ));
        markup.push_str(r##"<rect width="100%" height="100%" fill="#ffffff"/>"##);
        Self { markup }
    }

    fn push(&mut self, element: String) {
        self.markup.push_str(&element);
    }

    fn text(&mut self, x: f32, y: f32, content: &str, style: TextStyle<'_>) {
        if content.is_empty() {
            return;
        }
        self.push(format!(
            r#"<text x="{x}" y="{y}" font-family="{FONT_FAMILY}" font-size="{}" font-weight="{}" font-style="{}" text-anchor="{}" fill="{}">{}</text>"#,
            style.size,
            style.weight,
            style.font_style,
            style.anchor,
            style.fill,
            escape_xml(content)
        ));
    }

    fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, stroke: &str) {
        self.push(format!(
            r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{stroke}" stroke-width="1"/>"#
        ));
    }

    fn dotted_line(&mut self, from_x: f32, baseline: f32, to_x: f32) {
        if to_x <= from_x {
            return;
        }
        self.push(format!(
            r##"<line x1="{from_x}" y1="{baseline}" x2="{to_x}" y2="{baseline}" stroke="#999999" stroke-width="1" stroke-dasharray="1 4"/>"##
        ));
    }

    /// Wrapped body text starting at `top`, clipped once a line would pass `bottom`.
    fn paragraph(
        &mut self,
        x: f32,
        top: f32,
        body: &str,
        style: TextStyle<'_>,
        line_height: f32,
        bottom: f32,
    ) {
        let mut y = top;
        for line in wrap_text(body, style.size, CONTENT_WIDTH) {
            if y > bottom {
                break;
            }
            self.text(x, y, &line, style);
            y += line_height;
        }
    }

    /// Cover decoration slot. Images are decoded up front so a corrupt upload
    /// fails the page instead of silently rendering nothing.
    fn cover_art(
        &mut self,
        art: &CoverArt,
        x: f32,
        y: f32,
        block: &PageBlock,
    ) -> Result<(), ExportError> {
        let size = COVER_ART_SIZE;
        match art {
            CoverArt::Image(asset) => {
                check_cover_image(asset, block)?;
                self.push(format!(
                    r#"<image x="{x}" y="{y}" width="{size}" height="{size}" preserveAspectRatio="xMidYMid meet" xlink:href="{}"/>"#,
                    asset.data_uri()
                ));
            }
            CoverArt::Text(placeholder) => {
                self.push(format!(
                    r##"<rect x="{x}" y="{y}" width="{size}" height="{size}" rx="6" fill="#fafafa" stroke="#bbbbbb" stroke-width="1"/>"##
                ));
                let style = TextStyle::new(11.0).anchor("middle").fill(MUTED);
                let mut line_y = y + 40.0;
                for line in wrap_text(placeholder, 11.0, size - 12.0).iter().take(5) {
                    self.text(x + size / 2.0, line_y, line, style);
                    line_y += 15.0;
                }
            }
        }
        Ok(())
    }

    fn finish(mut self) -> String {
        self.markup.push_str("</svg>");
        self.markup
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Text helpers
// ────────────────────────────────────────────────────────────────────────────

pub(crate) fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters are not allowed in XML 1.0.
            c if c.is_control() && c != '\t' => {}
            c => out.push(c),
        }
    }
    out
}

/// Approximate glyph advance in em for a proportional sans-serif face.
fn glyph_em(c: char) -> f32 {
    match c {
        ' ' => SPACE_EM,
        'i' | 'j' | 'l' | '.' | ',' | ';' | ':' | '\'' | '|' | '!' => 0.26,
        'f' | 't' | 'r' | '(' | ')' | '[' | ']' | '-' => 0.36,
        'm' | 'w' | 'M' | 'W' | '@' => 0.86,
        'A'..='Z' => 0.66,
        '0'..='9' => 0.56,
        _ => 0.54,
    }
}

pub(crate) fn text_width(s: &str, font_size: f32) -> f32 {
    s.chars().map(glyph_em).sum::<f32>() * font_size
}

/// Greedy word wrap. Blank source lines are kept as paragraph breaks;
/// trailing blank lines are dropped.
pub(crate) fn wrap_text(text: &str, font_size: f32, max_width: f32) -> Vec<String> {
    let space = SPACE_EM * font_size;
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut current = String::new();
        let mut current_width = 0.0_f32;
        for word in paragraph.split_whitespace() {
            let word_width = text_width(word, font_size);
            if !current.is_empty() && current_width + space + word_width > max_width {
                lines.push(std::mem::take(&mut current));
                current_width = 0.0;
            }
            if !current.is_empty() {
                current.push(' ');
                current_width += space;
            }
            current.push_str(word);
            current_width += word_width;
        }
        lines.push(current);
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines
}

fn truncate_to_width(s: &str, font_size: f32, max_width: f32) -> String {
    let s = s.trim();
    if text_width(s, font_size) <= max_width {
        return s.to_string();
    }
    let budget = max_width - text_width("…", font_size);
    let mut out = String::new();
    let mut width = 0.0;
    for c in s.chars() {
        let w = glyph_em(c) * font_size;
        if width + w > budget {
            break;
        }
        out.push(c);
        width += w;
    }
    format!("{}…", out.trim_end())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
