// Prompt templates for document generation.
// Placeholders are `{name}` and are filled by `build_generation_prompt`.

use crate::content::{DocumentKind, Language};
use crate::generation::request::GenerationRequest;

/// Role half of the system instruction.
pub const GENERATION_ROLE: &str = "You are a professional academic writing assistant. \
    You write clear, well-structured documents for students and follow the requested \
    structure exactly.";

/// Output half of the system instruction. The client also strips code fences,
/// but the model is asked not to emit them.
pub const JSON_ONLY_SYSTEM: &str = "Reply with valid JSON only: a single object, \
    no markdown code fences and no text before or after it.";

/// System instruction for every document generation call.
pub fn generation_system() -> String {
    format!("{GENERATION_ROLE} {JSON_ONLY_SYSTEM}")
}

pub const PRESENTATION_PROMPT_TEMPLATE: &str = r#"Write a structured oral presentation ("exposé") on the topic: "{topic}".
Academic level: {level}.
Institution: {institution}. Country: {country}.
Objectives of the presentation: {objectives}
Additional instructions: {instructions}

Produce a cover, an introduction, between 3 and 6 sections, a conclusion and a bibliography.
For each section suggest one visual (chart, diagram, photo) in "visualSuggestion" and set
"isColor" to true only when the visual genuinely needs colour printing.
The student prints at {bw_price} {currency} per black-and-white page and {color_price} {currency}
per colour page, with a total budget of {budget} {currency}. Give an honest "estimatedPages"
and, when the budget is tight, a short "recommendation" on how to stay within it.
Also include 3 to 5 likely audience questions with answers in "qa" and a short spoken "speech"."#;

pub const THESIS_PROMPT_TEMPLATE: &str = r#"Write a detailed plan and a complete synthesis for an ACADEMIC THESIS on: "{topic}".
Academic level: {level}. Field / department: {department}.
Institution: {institution}. Country: {country}.
Additional instructions: {instructions}

Produce a cover, an introduction stating the research question, one section per chapter of the
plan (each with a synthesis of its content), a conclusion and a bibliography of real, verifiable
references. Suggest a visual per chapter in "visualSuggestion" where useful.
Give an honest "estimatedPages"."#;

pub const ESSAY_PROMPT_TEMPLATE: &str = r#"Write a complete essay on: "{topic}".
Subject or quotation to discuss: {citation}
Academic level: {level}.
Additional instructions: {instructions}

The essay must fill about {page_count} pages. Use an introduction with a clear problem
statement, sections that each develop one part of the argument, and a conclusion.
Do not produce a cover. Set "estimatedPages" to the number of pages you actually wrote."#;

pub const ARGUMENTATIVE_PROMPT_TEMPLATE: &str = r#"Write an argumentative text on: "{topic}".
Academic level: {level}.
Additional instructions: {instructions}

The text must fill about {page_count} pages. State a thesis in the introduction, give one
argument per section (with examples and a counter-argument where relevant), and conclude.
Do not produce a cover. Set "estimatedPages" to the number of pages you actually wrote."#;

/// Output contract shared by every kind. The `toc` field is tolerated but ignored.
pub const OUTPUT_SCHEMA: &str = r#"Return a JSON object with this EXACT shape:
{
  "title": "Document title",
  "content": {
    "cover": {
      "title": "Cover title",
      "subtitle": "Optional subtitle",
      "schoolName": "Institution name",
      "schoolLogo": "Short description of the institution logo",
      "countrySymbol": "Short description of the national emblem"
    },
    "introduction": "Introduction text",
    "sections": [
      {
        "heading": "Section heading",
        "content": "Section body. Separate paragraphs with a blank line.",
        "visualSuggestion": "Optional visual idea",
        "isColor": false
      }
    ],
    "conclusion": "Conclusion text",
    "bibliography": ["Author (Year). Title. Publisher."],
    "qa": [{"question": "...", "answer": "..."}],
    "speech": "Optional spoken version",
    "estimatedPages": 8,
    "recommendation": "Optional advice about printing or length"
  }
}
Omit "cover" when the instructions say not to produce one."#;

fn language_instruction(language: Language) -> &'static str {
    match language {
        Language::En => "Write the whole document in English.",
        Language::Fr => "Rédige tout le document en français.",
        Language::Es => "Redacta todo el documento en español.",
    }
}

fn or_unspecified(value: Option<&str>) -> &str {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("not specified")
}

/// Builds the full user prompt for a request.
pub fn build_generation_prompt(request: &GenerationRequest) -> String {
    let template = match request.kind {
        DocumentKind::Presentation => PRESENTATION_PROMPT_TEMPLATE,
        DocumentKind::ThesisOutline => THESIS_PROMPT_TEMPLATE,
        DocumentKind::Essay => ESSAY_PROMPT_TEMPLATE,
        DocumentKind::ArgumentativeEssay => ARGUMENTATIVE_PROMPT_TEMPLATE,
    };

    let body = template
        .replace("{topic}", request.topic.trim())
        .replace("{level}", or_unspecified(request.level.as_deref()))
        .replace("{institution}", or_unspecified(request.institution.as_deref()))
        .replace("{country}", or_unspecified(request.country.as_deref()))
        .replace("{department}", or_unspecified(request.department.as_deref()))
        .replace("{objectives}", or_unspecified(request.objectives.as_deref()))
        .replace("{instructions}", or_unspecified(request.instructions.as_deref()))
        .replace("{citation}", or_unspecified(request.citation.as_deref()))
        .replace(
            "{page_count}",
            &request.page_count.unwrap_or(4).to_string(),
        )
        .replace("{currency}", &request.prices.currency)
        .replace("{bw_price}", &request.prices.black_white.to_string())
        .replace("{color_price}", &request.prices.color.to_string())
        .replace("{budget}", &request.budget.to_string());

    format!(
        "{body}\n\n{}\n\n{OUTPUT_SCHEMA}",
        language_instruction(request.language)
    )
}
