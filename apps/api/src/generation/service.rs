//! GenerationService: turns a GenerationRequest into a ContentModel.
//!
//! # Flow
//! 1. Resolve the API key: request key first, then the server key.
//! 2. Build the kind-specific prompt and call the LLM once.
//! 3. Map the generator's camelCase JSON into the typed model. Its `toc`
//!    field is never read; the TOC is always projected from the sections.
//! 4. Enrich the cover with request data (author, supervisor, date, level,
//!    institution fallback, uploaded images).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use crate::content::{ContentModel, Cover, CoverArt, QaPair, Section};
use crate::generation::prompts::{build_generation_prompt, generation_system};
use crate::generation::request::GenerationRequest;
use crate::generation::GenerationError;
use crate::layout::labels::StructuralLabels;
use crate::llm_client::LlmClient;

/// Upper bound accepted for the producer's page estimate.
const MAX_ESTIMATED_PAGES: f64 = 500.0;

#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentModel, GenerationError>;
}

pub struct GeminiGenerationService {
    llm: LlmClient,
    default_api_key: Option<String>,
}

impl GeminiGenerationService {
    pub fn new(llm: LlmClient, default_api_key: Option<String>) -> Self {
        Self {
            llm,
            default_api_key,
        }
    }
}

#[async_trait]
impl GenerationService for GeminiGenerationService {
    async fn generate(&self, request: &GenerationRequest) -> Result<ContentModel, GenerationError> {
        let api_key = resolve_api_key(request.api_key.as_deref(), self.default_api_key.as_deref())?;
        let prompt = build_generation_prompt(request);

        info!(
            "Generating {} for owner {} (language {:?})",
            request.kind.as_str(),
            request.owner_id,
            request.language
        );

        let generated: GeneratedDocument = self
            .llm
            .call_json(api_key, &prompt, &generation_system())
            .await?;
        let model = generated.into_content_model(request)?;

        info!(
            "Generated '{}': {} sections, producer estimate {} pages",
            model.title,
            model.sections.len(),
            model.estimated_pages
        );
        Ok(model)
    }
}

fn resolve_api_key<'a>(
    request_key: Option<&'a str>,
    server_key: Option<&'a str>,
) -> Result<&'a str, GenerationError> {
    request_key
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| server_key.map(str::trim).filter(|k| !k.is_empty()))
        .ok_or(GenerationError::MissingCredential)
}

// ────────────────────────────────────────────────────────────────────────────
// Generator wire format
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub(crate) struct GeneratedDocument {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<GeneratedContent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedContent {
    #[serde(default)]
    cover: Option<GeneratedCover>,
    #[serde(default)]
    introduction: Option<String>,
    #[serde(default)]
    sections: Vec<GeneratedSection>,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    bibliography: Vec<String>,
    #[serde(default)]
    qa: Vec<GeneratedQa>,
    #[serde(default)]
    speech: Option<String>,
    #[serde(default)]
    estimated_pages: Option<f64>,
    #[serde(default)]
    recommendation: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedCover {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    subtitle: Option<String>,
    #[serde(default)]
    school_name: Option<String>,
    #[serde(default)]
    school_logo: Option<String>,
    #[serde(default)]
    country_symbol: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratedSection {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    content: String,
    #[serde(default)]
    visual_suggestion: Option<String>,
    #[serde(default)]
    is_color: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct GeneratedQa {
    #[serde(default)]
    question: String,
    #[serde(default)]
    answer: String,
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl GeneratedDocument {
    pub(crate) fn into_content_model(
        self,
        request: &GenerationRequest,
    ) -> Result<ContentModel, GenerationError> {
        let content = self.content.ok_or(GenerationError::UpstreamEmpty)?;

        // Untitled sections with a body get the structural "Part N" heading.
        let labels = StructuralLabels::for_language(request.language);
        let sections: Vec<Section> = content
            .sections
            .into_iter()
            .filter(|s| !(s.heading.trim().is_empty() && s.content.trim().is_empty()))
            .enumerate()
            .map(|(i, s)| Section {
                heading: match s.heading.trim() {
                    "" => labels.part_label(i),
                    heading => heading.to_string(),
                },
                body: s.content.trim().to_string(),
                visual_hint: clean(s.visual_suggestion),
                is_color_recommended: s.is_color.unwrap_or(false),
            })
            .collect();

        let introduction = clean(content.introduction).unwrap_or_default();
        let conclusion = clean(content.conclusion).unwrap_or_default();
        if introduction.is_empty() && conclusion.is_empty() && sections.is_empty() {
            return Err(GenerationError::UpstreamEmpty);
        }

        let cover_title = content.cover.as_ref().and_then(|c| clean(c.title.clone()));
        let title = clean(self.title)
            .or_else(|| cover_title.clone())
            .unwrap_or_else(|| request.topic.trim().to_string());

        let cover = content.cover.map(|generated| {
            enrich_cover(generated, cover_title.unwrap_or_else(|| title.clone()), request)
        });

        let estimated_pages = content
            .estimated_pages
            .filter(|p| p.is_finite() && *p > 0.0)
            .map(|p| p.ceil().min(MAX_ESTIMATED_PAGES) as u32)
            .unwrap_or(0);

        Ok(ContentModel {
            title,
            kind: request.kind,
            language: request.language,
            cover,
            introduction,
            sections,
            conclusion,
            bibliography: content
                .bibliography
                .into_iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect(),
            qa: content
                .qa
                .into_iter()
                .filter(|q| !q.question.trim().is_empty())
                .map(|q| QaPair {
                    question: q.question.trim().to_string(),
                    answer: q.answer.trim().to_string(),
                })
                .collect(),
            speech: clean(content.speech),
            estimated_pages,
            recommendation: clean(content.recommendation),
        })
    }
}

/// Request data always wins over whatever the generator put on the cover,
/// except the institution name, which only falls back to the request.
fn enrich_cover(generated: GeneratedCover, title: String, request: &GenerationRequest) -> Cover {
    let institution_logo = match &request.logo {
        Some(asset) if !asset.is_empty() => Some(CoverArt::Image(asset.clone())),
        _ => clean(generated.school_logo).map(CoverArt::Text),
    };
    let jurisdiction_symbol = match &request.emblem {
        Some(asset) if !asset.is_empty() => Some(CoverArt::Image(asset.clone())),
        _ => clean(generated.country_symbol).map(CoverArt::Text),
    };

    Cover {
        title,
        subtitle: clean(generated.subtitle),
        author: request.author_name.trim().to_string(),
        supervisor: clean(request.supervisor.clone()),
        date: clean(request.date.clone()),
        institution: clean(generated.school_name).or_else(|| clean(request.institution.clone())),
        institution_logo,
        jurisdiction_symbol,
        level: clean(request.level.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{DocumentKind, ImageAsset, Language};
    use crate::generation::request::tests::make_request;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> GeneratedDocument {
        serde_json::from_value(value).unwrap()
    }

    fn make_generated() -> serde_json::Value {
        json!({
            "title": "Water in African Cities",
            "content": {
                "cover": {
                    "title": "Water in African Cities",
                    "subtitle": "Supply and demand",
                    "schoolLogo": "Logo of the university",
                    "countrySymbol": "Coat of arms",
                    "studentName": "ignored"
                },
                "toc": [{"title": "Cover", "page": 1}, {"title": "Intro", "page": 7}],
                "introduction": "Intro text",
                "sections": [
                    {"heading": "Sources", "content": "Rivers.", "visualSuggestion": "Map", "isColor": true},
                    {"heading": "Networks", "content": "Pipes.", "visualSuggestion": "  "},
                    {"heading": "", "content": ""}
                ],
                "conclusion": "Conclusion text",
                "bibliography": ["UN-Water (2021). Report.", "  "],
                "qa": [{"question": "Why?", "answer": "Because."}],
                "speech": "Good morning.",
                "estimatedPages": 8.4,
                "recommendation": "Print the map in colour only."
            }
        })
    }

    #[test]
    fn test_resolve_api_key_prefers_request() {
        assert_eq!(resolve_api_key(Some("user"), Some("server")), Ok("user"));
        assert_eq!(resolve_api_key(Some("  "), Some("server")), Ok("server"));
        assert_eq!(resolve_api_key(None, Some("server")), Ok("server"));
        assert_eq!(
            resolve_api_key(None, None),
            Err(GenerationError::MissingCredential)
        );
        assert_eq!(
            resolve_api_key(Some(""), Some("")),
            Err(GenerationError::MissingCredential)
        );
    }

    #[test]
    fn test_generated_json_maps_to_model() {
        let request = make_request(DocumentKind::Presentation);
        let model = parse(make_generated())
            .into_content_model(&request)
            .unwrap();

        assert_eq!(model.title, "Water in African Cities");
        assert_eq!(model.kind, DocumentKind::Presentation);
        assert_eq!(model.sections.len(), 2);
        assert!(model.sections[0].is_color_recommended);
        assert_eq!(model.sections[0].visual_hint.as_deref(), Some("Map"));
        assert_eq!(model.sections[1].visual_hint, None);
        assert_eq!(model.bibliography, vec!["UN-Water (2021). Report."]);
        assert_eq!(model.qa.len(), 1);
        assert_eq!(model.estimated_pages, 9);
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_cover_is_enriched_from_request() {
        let mut request = make_request(DocumentKind::Presentation);
        request.logo = Some(ImageAsset::new(vec![1, 2, 3]));
        let model = parse(make_generated())
            .into_content_model(&request)
            .unwrap();
        let cover = model.cover.unwrap();

        assert_eq!(cover.author, "Ada Mbeki");
        assert_eq!(cover.supervisor.as_deref(), Some("Dr. Ngo"));
        assert_eq!(cover.date.as_deref(), Some("2026-10-19"));
        assert_eq!(cover.level.as_deref(), Some("Licence 2"));
        // Generator gave no school name: request institution fills in.
        assert_eq!(cover.institution.as_deref(), Some("Université de Douala"));
        assert!(matches!(cover.institution_logo, Some(CoverArt::Image(_))));
        assert_eq!(
            cover.jurisdiction_symbol,
            Some(CoverArt::Text("Coat of arms".to_string()))
        );
    }

    #[test]
    fn test_generator_school_name_is_kept() {
        let mut generated = make_generated();
        generated["content"]["cover"]["schoolName"] = json!("Lycée Joss");
        let model = parse(generated)
            .into_content_model(&make_request(DocumentKind::Presentation))
            .unwrap();
        assert_eq!(
            model.cover.unwrap().institution.as_deref(),
            Some("Lycée Joss")
        );
    }

    #[test]
    fn test_missing_content_is_upstream_empty() {
        let request = make_request(DocumentKind::Essay);
        assert_eq!(
            parse(json!({"title": "x"}))
                .into_content_model(&request)
                .unwrap_err(),
            GenerationError::UpstreamEmpty
        );
        assert_eq!(
            parse(json!({"title": "x", "content": {"sections": []}}))
                .into_content_model(&request)
                .unwrap_err(),
            GenerationError::UpstreamEmpty
        );
    }

    #[test]
    fn test_untitled_section_gets_part_heading() {
        let mut request = make_request(DocumentKind::Presentation);
        request.language = Language::Fr;
        let mut generated = make_generated();
        generated["content"]["sections"][1]["heading"] = json!("  ");

        let model = parse(generated).into_content_model(&request).unwrap();
        assert_eq!(model.sections.len(), 2);
        assert_eq!(model.sections[1].heading, "Partie 2");
        assert_eq!(model.sections[1].body, "Pipes.");
        assert!(model.validate().is_ok());
    }

    #[test]
    fn test_title_falls_back_to_topic() {
        let request = make_request(DocumentKind::Essay);
        let model = parse(json!({
            "content": {"introduction": "I", "sections": [], "conclusion": "C"}
        }))
        .into_content_model(&request)
        .unwrap();
        assert_eq!(model.title, "Urban water supply");
        assert!(model.cover.is_none());
        assert_eq!(model.estimated_pages, 0);
    }
}
