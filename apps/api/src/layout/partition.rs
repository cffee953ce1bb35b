//! Page Partitioner: splits a ContentModel into one `PageBlock` per physical page.
//!
//! # Partitioning policy
//! 1. Cover (if present)
//! 2. Contents (always)
//! 3. Introduction
//! 4. One page per section, in array order. Long bodies are never split.
//! 5. Conclusion
//! 6. Bibliography (if non-empty)
//!
//! Cover and contents pages carry no visible page number. Every other footer
//! is numbered from `toc::content_slots`, the same rule the TOC uses.
//!
//! `PageBlock` is the sole contract with the exporters: payloads are plain
//! layout values and hold no reference to the ContentModel.

use serde::Serialize;
use tracing::debug;

use crate::content::{ContentModel, CoverArt};
use crate::layout::labels::StructuralLabels;
use crate::layout::overrides::CosmeticOverrides;
use crate::layout::toc::{content_slots, project, slot_title, verify_toc, ContentSlot, TocEntry};
use crate::layout::LayoutError;

// ────────────────────────────────────────────────────────────────────────────
// Page block types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Cover,
    Contents,
    Introduction,
    Section,
    Conclusion,
    Bibliography,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Cover => "cover",
            PageKind::Contents => "contents",
            PageKind::Introduction => "introduction",
            PageKind::Section => "section",
            PageKind::Conclusion => "conclusion",
            PageKind::Bibliography => "bibliography",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningHeader {
    pub title: String,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunningFooter {
    /// Visible page number. `None` on the cover and contents pages.
    pub page_number: Option<u32>,
}

/// Everything the cover renderer needs, with overrides already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct CoverPage {
    pub title: String,
    pub subtitle: Option<String>,
    pub author: String,
    pub supervisor: Option<String>,
    pub date: Option<String>,
    pub institution: Option<String>,
    pub level: Option<String>,
    pub logo: Option<CoverArt>,
    pub emblem: Option<CoverArt>,
    pub presented_by_caption: String,
    pub supervisor_caption: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PagePayload {
    Cover(CoverPage),
    Contents {
        heading: String,
        entries: Vec<TocEntry>,
    },
    /// Introduction or conclusion.
    Prose {
        heading: String,
        body: String,
    },
    Section {
        heading: String,
        body: String,
        visual_hint: Option<String>,
        color: bool,
    },
    Bibliography {
        heading: String,
        entries: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageBlock {
    pub kind: PageKind,
    /// One-based physical position in the output.
    pub ordinal: u32,
    pub header: RunningHeader,
    pub footer: RunningFooter,
    pub payload: PagePayload,
}

/// `(1 if cover) + 1 + 1 + sections + 1 + (1 if bibliography)`.
pub fn expected_block_count(model: &ContentModel) -> usize {
    usize::from(model.cover.is_some()) + 3 + model.sections.len()
        + usize::from(model.has_bibliography())
}

// ────────────────────────────────────────────────────────────────────────────
// Core function
// ────────────────────────────────────────────────────────────────────────────

/// Lays the model out into physical pages.
///
/// Pure and deterministic. Errors only on an internal numbering mismatch,
/// which cannot happen for a model that passed `ContentModel::validate`.
pub fn partition(
    model: &ContentModel,
    overrides: &CosmeticOverrides,
) -> Result<Vec<PageBlock>, LayoutError> {
    let labels = StructuralLabels::for_language(model.language);
    let title = model.title.trim().to_string();
    let toc = project(model);
    verify_toc(model, &toc)?;

    let mut blocks = Vec::with_capacity(expected_block_count(model));
    let mut push = |kind: PageKind, label: String, page_number: Option<u32>, payload| {
        let ordinal = blocks.len() as u32 + 1;
        blocks.push(PageBlock {
            kind,
            ordinal,
            header: RunningHeader {
                title: title.clone(),
                label,
            },
            footer: RunningFooter { page_number },
            payload,
        });
    };

    if let Some(cover) = &model.cover {
        let (logo, emblem) = overrides.resolve(cover);
        push(
            PageKind::Cover,
            labels.cover.to_string(),
            None,
            PagePayload::Cover(CoverPage {
                title: cover.title.clone(),
                subtitle: cover.subtitle.clone(),
                author: cover.author.clone(),
                supervisor: cover.supervisor.clone(),
                date: cover.date.clone(),
                institution: cover.institution.clone(),
                level: cover.level.clone(),
                logo,
                emblem,
                presented_by_caption: labels.presented_by.to_string(),
                supervisor_caption: labels.supervisor.to_string(),
            }),
        );
    }

    push(
        PageKind::Contents,
        labels.contents.to_string(),
        None,
        PagePayload::Contents {
            heading: labels.contents.to_string(),
            entries: toc.clone(),
        },
    );

    for (slot, page_number) in content_slots(model) {
        let heading = slot_title(model, &labels, slot);
        let (kind, label, payload) = match slot {
            ContentSlot::Introduction => (
                PageKind::Introduction,
                labels.introduction.to_string(),
                PagePayload::Prose {
                    heading,
                    body: model.introduction.clone(),
                },
            ),
            ContentSlot::Section(i) => {
                let section = &model.sections[i];
                (
                    PageKind::Section,
                    labels.part_label(i),
                    PagePayload::Section {
                        heading,
                        body: section.body.clone(),
                        visual_hint: section
                            .visual_hint
                            .as_deref()
                            .map(str::trim)
                            .filter(|h| !h.is_empty())
                            .map(str::to_string),
                        color: section.is_color_recommended,
                    },
                )
            }
            ContentSlot::Conclusion => (
                PageKind::Conclusion,
                labels.conclusion.to_string(),
                PagePayload::Prose {
                    heading,
                    body: model.conclusion.clone(),
                },
            ),
            ContentSlot::Bibliography => (
                PageKind::Bibliography,
                labels.bibliography.to_string(),
                PagePayload::Bibliography {
                    heading,
                    entries: model.bibliography.clone(),
                },
            ),
        };
        push(kind, label, Some(page_number), payload);
    }

    verify_footers(&blocks, &toc)?;
    debug!(
        "Partitioned '{}' into {} page blocks ({} TOC entries)",
        title,
        blocks.len(),
        toc.len()
    );
    Ok(blocks)
}

/// Footers of numbered pages must equal the TOC page numbers, entry for entry.
pub fn verify_footers(blocks: &[PageBlock], toc: &[TocEntry]) -> Result<(), LayoutError> {
    let numbered: Vec<u32> = blocks
        .iter()
        .filter_map(|b| b.footer.page_number)
        .collect();
    let listed: Vec<u32> = toc.iter().map(|e| e.page_number).collect();
    if numbered != listed {
        return Err(LayoutError::InvariantViolation(format!(
            "footer numbers {numbered:?} disagree with contents {listed:?}"
        )));
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
