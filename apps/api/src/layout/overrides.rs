//! Cosmetic overrides: images uploaded after generation that replace the
//! generator's cover placeholders.

use crate::content::{Cover, CoverArt, ImageAsset};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CosmeticOverrides {
    pub logo: Option<ImageAsset>,
    pub emblem: Option<ImageAsset>,
}

impl CosmeticOverrides {
    pub fn is_empty(&self) -> bool {
        self.logo.is_none() && self.emblem.is_none()
    }

    /// Resolves the (logo, emblem) slots for a cover. An override wins
    /// unconditionally over whatever the cover already holds.
    pub fn resolve(&self, cover: &Cover) -> (Option<CoverArt>, Option<CoverArt>) {
        let logo = match &self.logo {
            Some(asset) => Some(CoverArt::Image(asset.clone())),
            None => cover.institution_logo.clone(),
        };
        let emblem = match &self.emblem {
            Some(asset) => Some(CoverArt::Image(asset.clone())),
            None => cover.jurisdiction_symbol.clone(),
        };
        (logo, emblem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_cover(logo: Option<CoverArt>, emblem: Option<CoverArt>) -> Cover {
        Cover {
            title: "T".to_string(),
            subtitle: None,
            author: "A".to_string(),
            supervisor: None,
            date: None,
            institution: None,
            institution_logo: logo,
            jurisdiction_symbol: emblem,
            level: None,
        }
    }

    #[test]
    fn test_override_replaces_text_placeholder() {
        let cover = make_cover(Some(CoverArt::Text("LOGO".to_string())), None);
        let asset = ImageAsset::new(vec![1, 2, 3]);
        let overrides = CosmeticOverrides {
            logo: Some(asset.clone()),
            emblem: None,
        };
        let (logo, emblem) = overrides.resolve(&cover);
        assert_eq!(logo, Some(CoverArt::Image(asset)));
        assert_eq!(emblem, None);
    }

    #[test]
    fn test_override_replaces_existing_image() {
        let cover = make_cover(None, Some(CoverArt::Image(ImageAsset::new(vec![9]))));
        let fresh = ImageAsset::new(vec![7, 7]);
        let overrides = CosmeticOverrides {
            logo: None,
            emblem: Some(fresh.clone()),
        };
        let (_, emblem) = overrides.resolve(&cover);
        assert_eq!(emblem, Some(CoverArt::Image(fresh)));
    }

    #[test]
    fn test_no_override_keeps_cover_values() {
        let cover = make_cover(
            Some(CoverArt::Text("UNIVERSITY".to_string())),
            Some(CoverArt::Text("REPUBLIC".to_string())),
        );
        let overrides = CosmeticOverrides::default();
        assert!(overrides.is_empty());
        let (logo, emblem) = overrides.resolve(&cover);
        assert_eq!(logo, cover.institution_logo);
        assert_eq!(emblem, cover.jurisdiction_symbol);
    }
}
