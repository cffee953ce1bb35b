//! Table-of-contents projection.
//!
//! The TOC is synthesised from the *shape* of the model: one entry for the
//! introduction, one per section in array order, one for the conclusion and
//! one for the bibliography when present. Generator-supplied TOC text is never
//! consulted, so structural labels such as "cover" can't leak into the list.
//!
//! `content_slots` is the single counting rule. The partitioner numbers its
//! footers from the same function, so TOC page numbers and footers agree by
//! construction; `verify_toc` re-checks the invariant before export.

use serde::{Deserialize, Serialize};

use crate::content::ContentModel;
use crate::layout::labels::StructuralLabels;
use crate::layout::LayoutError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TocEntry {
    pub title: String,
    pub page_number: u32,
}

/// A numbered content page, in reading order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ContentSlot {
    Introduction,
    Section(usize),
    Conclusion,
    Bibliography,
}

/// Content pages with their visible page numbers. Numbering starts at 1 on
/// the first page after the cover and contents pages.
pub(crate) fn content_slots(model: &ContentModel) -> Vec<(ContentSlot, u32)> {
    let mut slots = Vec::with_capacity(expected_entry_count(model));
    slots.push(ContentSlot::Introduction);
    slots.extend((0..model.sections.len()).map(ContentSlot::Section));
    slots.push(ContentSlot::Conclusion);
    if model.has_bibliography() {
        slots.push(ContentSlot::Bibliography);
    }
    slots
        .into_iter()
        .enumerate()
        .map(|(i, slot)| (slot, i as u32 + 1))
        .collect()
}

/// `2 + sections + (1 if bibliography)`.
pub fn expected_entry_count(model: &ContentModel) -> usize {
    2 + model.sections.len() + usize::from(model.has_bibliography())
}

/// Projects the TOC for a model. Total over any model.
pub fn project(model: &ContentModel) -> Vec<TocEntry> {
    let labels = StructuralLabels::for_language(model.language);
    content_slots(model)
        .into_iter()
        .map(|(slot, page_number)| TocEntry {
            title: slot_title(model, &labels, slot),
            page_number,
        })
        .collect()
}

pub(crate) fn slot_title(
    model: &ContentModel,
    labels: &StructuralLabels,
    slot: ContentSlot,
) -> String {
    match slot {
        ContentSlot::Introduction => labels.introduction.to_string(),
        ContentSlot::Section(i) => model.sections[i].heading.trim().to_string(),
        ContentSlot::Conclusion => labels.conclusion.to_string(),
        ContentSlot::Bibliography => labels.bibliography.to_string(),
    }
}

/// Checks entry count and contiguous numbering from 1.
pub fn verify_toc(model: &ContentModel, toc: &[TocEntry]) -> Result<(), LayoutError> {
    let expected = expected_entry_count(model);
    if toc.len() != expected {
        return Err(LayoutError::InvariantViolation(format!(
            "table of contents has {} entries, expected {expected}",
            toc.len()
        )));
    }
    for (i, entry) in toc.iter().enumerate() {
        let want = i as u32 + 1;
        if entry.page_number != want {
            return Err(LayoutError::InvariantViolation(format!(
                "entry '{}' is numbered {} but sits at position {want}",
                entry.title, entry.page_number
            )));
        }
    }
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
