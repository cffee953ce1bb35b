//! ContentModel: the typed logical document handed over by the generation step.
//!
//! Once constructed the model is read-only. Section order is the only ordering
//! authority for the table of contents and for pagination; nothing downstream
//! re-derives order or titles from generated text.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::content::assets::ImageAsset;

// ────────────────────────────────────────────────────────────────────────────
// Enumerations
// ────────────────────────────────────────────────────────────────────────────

/// The document shapes the product can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    /// Oral presentation support ("exposé") with objectives and a cover page.
    #[default]
    Presentation,
    /// Detailed plan and synthesis for a thesis.
    ThesisOutline,
    /// Structured essay of a target length.
    Essay,
    /// Argumentative text of a target length.
    ArgumentativeEssay,
}

impl DocumentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::Presentation => "presentation",
            DocumentKind::ThesisOutline => "thesis_outline",
            DocumentKind::Essay => "essay",
            DocumentKind::ArgumentativeEssay => "argumentative_essay",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "presentation" => Some(DocumentKind::Presentation),
            "thesis_outline" => Some(DocumentKind::ThesisOutline),
            "essay" => Some(DocumentKind::Essay),
            "argumentative_essay" => Some(DocumentKind::ArgumentativeEssay),
            _ => None,
        }
    }

    /// Essay-like kinds are sized by a requested page count instead of a cover/budget form.
    pub fn is_essay_like(&self) -> bool {
        matches!(self, DocumentKind::Essay | DocumentKind::ArgumentativeEssay)
    }
}

/// Language of the structural labels (Introduction, Part N, Contents, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fr,
    Es,
}

// ────────────────────────────────────────────────────────────────────────────
// Cover
// ────────────────────────────────────────────────────────────────────────────

/// A cover decoration slot: either a textual placeholder supplied by the
/// generator or an actual image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CoverArt {
    Text(String),
    Image(ImageAsset),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cover {
    pub title: String,
    #[serde(default)]
    pub subtitle: Option<String>,
    pub author: String,
    #[serde(default)]
    pub supervisor: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub institution: Option<String>,
    #[serde(default)]
    pub institution_logo: Option<CoverArt>,
    #[serde(default)]
    pub jurisdiction_symbol: Option<CoverArt>,
    #[serde(default)]
    pub level: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Body
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub heading: String,
    pub body: String,
    #[serde(default)]
    pub visual_hint: Option<String>,
    #[serde(default)]
    pub is_color_recommended: bool,
}

/// Rehearsal question carried for presentation kinds. Stored, never paginated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QaPair {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentModel {
    pub title: String,
    #[serde(default)]
    pub kind: DocumentKind,
    #[serde(default)]
    pub language: Language,
    #[serde(default)]
    pub cover: Option<Cover>,
    pub introduction: String,
    pub sections: Vec<Section>,
    pub conclusion: String,
    /// Ordered citations. An empty list means "no bibliography page".
    #[serde(default)]
    pub bibliography: Vec<String>,
    #[serde(default)]
    pub qa: Vec<QaPair>,
    #[serde(default)]
    pub speech: Option<String>,
    /// Producer hint only. The budget estimator re-validates it.
    pub estimated_pages: u32,
    #[serde(default)]
    pub recommendation: Option<String>,
}

impl ContentModel {
    pub fn has_bibliography(&self) -> bool {
        !self.bibliography.is_empty()
    }

    pub fn color_section_count(&self) -> u32 {
        self.sections
            .iter()
            .filter(|s| s.is_color_recommended)
            .count() as u32
    }

    /// Checks the structural rules every downstream component relies on.
    ///
    /// A model that passes is guaranteed to paginate: the TOC projector and
    /// partitioner are total over validated models.
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.title.trim().is_empty() {
            return Err(ContentError::MissingField("title"));
        }
        if self.introduction.trim().is_empty() {
            return Err(ContentError::MissingField("introduction"));
        }
        if self.conclusion.trim().is_empty() {
            return Err(ContentError::MissingField("conclusion"));
        }
        if let Some(cover) = &self.cover {
            if cover.title.trim().is_empty() {
                return Err(ContentError::MissingField("cover.title"));
            }
        }
        if let Some(index) = self
            .sections
            .iter()
            .position(|s| s.heading.trim().is_empty())
        {
            return Err(ContentError::UntitledSection { index });
        }
        if let Some(index) = self.bibliography.iter().position(|c| c.trim().is_empty()) {
            return Err(ContentError::BlankCitation { index });
        }
        Ok(())
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ContentError {
    #[error("content is missing required field '{0}'")]
    MissingField(&'static str),

    #[error("section {index} has an empty heading")]
    UntitledSection { index: usize },

    #[error("bibliography entry {index} is blank")]
    BlankCitation { index: usize },
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn make_section(heading: &str, color: bool) -> Section {
        Section {
            heading: heading.to_string(),
            body: format!("Body of {heading}"),
            visual_hint: None,
            is_color_recommended: color,
        }
    }

    fn make_model() -> ContentModel {
        ContentModel {
            title: "Water Scarcity".to_string(),
            kind: DocumentKind::Presentation,
            language: Language::En,
            cover: None,
            introduction: "Intro".to_string(),
            sections: vec![make_section("A", false), make_section("B", true)],
            conclusion: "Done".to_string(),
            bibliography: vec![],
            qa: vec![],
            speech: None,
            estimated_pages: 6,
            recommendation: None,
        }
    }

    #[test]
    fn test_valid_model_passes() {
        assert_eq!(make_model().validate(), Ok(()));
    }

    #[test]
    fn test_blank_introduction_rejected() {
        let mut model = make_model();
        model.introduction = "   ".to_string();
        assert_eq!(
            model.validate(),
            Err(ContentError::MissingField("introduction"))
        );
    }

    #[test]
    fn test_untitled_section_reports_index() {
        let mut model = make_model();
        model.sections.push(make_section(" ", false));
        assert_eq!(
            model.validate(),
            Err(ContentError::UntitledSection { index: 2 })
        );
    }

    #[test]
    fn test_blank_citation_rejected() {
        let mut model = make_model();
        model.bibliography = vec!["Smith 2020".to_string(), String::new()];
        assert_eq!(model.validate(), Err(ContentError::BlankCitation { index: 1 }));
    }

    #[test]
    fn test_bibliography_presence_follows_emptiness() {
        let mut model = make_model();
        assert!(!model.has_bibliography());
        model.bibliography.push("Doe, J. (2021)".to_string());
        assert!(model.has_bibliography());
    }

    #[test]
    fn test_color_section_count() {
        assert_eq!(make_model().color_section_count(), 1);
    }

    #[test]
    fn test_document_kind_round_trips_through_str() {
        for kind in [
            DocumentKind::Presentation,
            DocumentKind::ThesisOutline,
            DocumentKind::Essay,
            DocumentKind::ArgumentativeEssay,
        ] {
            assert_eq!(DocumentKind::parse(kind.as_str()), Some(kind));
        }
        assert_eq!(DocumentKind::parse("memo"), None);
    }

    #[test]
    fn test_cover_art_serializes_tagged() {
        let art = CoverArt::Text("REPUBLIC OF CAMEROON".to_string());
        let json = serde_json::to_value(&art).unwrap();
        assert_eq!(json["type"], "text");
        assert_eq!(json["value"], "REPUBLIC OF CAMEROON");
    }
}
