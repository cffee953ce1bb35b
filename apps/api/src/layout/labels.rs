//! Structural labels per language. These are the only strings the layout
//! layer invents; everything else comes from typed model fields.

use crate::content::Language;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuralLabels {
    pub cover: &'static str,
    pub contents: &'static str,
    pub introduction: &'static str,
    pub part: &'static str,
    pub conclusion: &'static str,
    pub bibliography: &'static str,
    pub presented_by: &'static str,
    pub supervisor: &'static str,
}

impl StructuralLabels {
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::En => Self {
                cover: "Cover",
                contents: "Contents",
                introduction: "Introduction",
                part: "Part",
                conclusion: "Conclusion",
                bibliography: "Bibliography",
                presented_by: "Presented by",
                supervisor: "Supervisor",
            },
            Language::Fr => Self {
                cover: "Couverture",
                contents: "Sommaire",
                introduction: "Introduction",
                part: "Partie",
                conclusion: "Conclusion",
                bibliography: "Bibliographie",
                presented_by: "Présenté par",
                supervisor: "Encadreur",
            },
            Language::Es => Self {
                cover: "Portada",
                contents: "Índice",
                introduction: "Introducción",
                part: "Parte",
                conclusion: "Conclusión",
                bibliography: "Bibliografía",
                presented_by: "Presentado por",
                supervisor: "Director",
            },
        }
    }

    /// Human label for the section at zero-based `index` ("Part 2").
    pub fn part_label(&self, index: usize) -> String {
        format!("{} {}", self.part, index + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_label_is_one_based() {
        let labels = StructuralLabels::for_language(Language::En);
        assert_eq!(labels.part_label(0), "Part 1");
        assert_eq!(labels.part_label(1), "Part 2");
    }

    #[test]
    fn test_spanish_labels() {
        let labels = StructuralLabels::for_language(Language::Es);
        assert_eq!(labels.contents, "Índice");
        assert_eq!(labels.part_label(2), "Parte 3");
    }
}
