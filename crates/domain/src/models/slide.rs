//! Slide aggregate: language-invariant slide fields plus one translation per language.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use validator::{Validate, ValidationErrors};

use crate::errors::SliderError;
use crate::models::language::Language;

/// Number of sample slides seeded on install.
pub const SAMPLE_SLIDE_COUNT: i32 = 3;

/// Per-language slide content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SlideTranslation {
    #[validate(length(max = 255, message = "The title is too long."))]
    pub title: String,

    #[validate(length(max = 255, message = "The caption is too long."))]
    pub caption: String,

    #[validate(length(max = 4000, message = "The description is too long."))]
    pub description: String,

    #[validate(
        length(max = 255, message = "The URL is too long."),
        custom(function = "shared::validation::validate_target_url")
    )]
    pub target_url: String,

    /// Stored image filename; empty until an image is uploaded for this language.
    #[validate(custom(function = "shared::validation::validate_image_file_name"))]
    pub image_filename: String,
}

/// Fields checked in display order so accumulated messages are stable.
const TRANSLATION_FIELDS: [&str; 5] = [
    "title",
    "caption",
    "target_url",
    "description",
    "image_filename",
];

/// Flattens validator errors into admin-facing messages, in field order.
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let field_errors = errors.field_errors();
    let mut messages = Vec::new();
    for field in TRANSLATION_FIELDS {
        if let Some(errs) = field_errors.get(field) {
            for err in errs.iter() {
                messages.push(
                    err.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("Invalid {}.", field)),
                );
            }
        }
    }
    messages
}

impl SlideTranslation {
    pub fn has_image(&self) -> bool {
        !self.image_filename.is_empty()
    }

    /// All constraint violations of this translation.
    pub fn check(&self) -> Vec<String> {
        match self.validate() {
            Ok(()) => Vec::new(),
            Err(errors) => validation_messages(&errors),
        }
    }
}

/// One carousel entry with its translations keyed by language id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// `None` until the slide has been persisted.
    pub id: Option<i64>,
    pub position: i32,
    pub active: bool,
    pub translations: BTreeMap<i32, SlideTranslation>,
}

impl Slide {
    pub fn new(position: i32, active: bool) -> Self {
        Self {
            id: None,
            position,
            active,
            translations: BTreeMap::new(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn translation(&self, language_id: i32) -> Option<&SlideTranslation> {
        self.translations.get(&language_id)
    }

    /// A slide is displayable in a language only if that translation has an image.
    pub fn is_displayable_in(&self, language_id: i32) -> bool {
        self.translation(language_id)
            .map(SlideTranslation::has_image)
            .unwrap_or(false)
    }

    /// Distinct image filenames referenced by any translation.
    pub fn image_filenames(&self) -> BTreeSet<String> {
        self.translations
            .values()
            .filter(|t| t.has_image())
            .map(|t| t.image_filename.clone())
            .collect()
    }

    /// Checks every translation and accumulates all violations before failing.
    pub fn validate_all(&self) -> Result<(), SliderError> {
        let messages: Vec<String> = self
            .translations
            .values()
            .flat_map(SlideTranslation::check)
            .collect();
        if messages.is_empty() {
            Ok(())
        } else {
            Err(SliderError::Validation(messages))
        }
    }

    /// Sample slide `index` (1-based) with placeholder content for each language.
    pub fn sample(index: i32, languages: &[Language]) -> Self {
        let mut slide = Slide::new(index, true);
        for language in languages {
            let rtl_suffix = if language.is_rtl { "_rtl" } else { "" };
            slide.translations.insert(
                language.id,
                SlideTranslation {
                    title: format!("Sample {}", index),
                    caption: format!("sample-{}", index),
                    description: "<h3>EXCEPTEUR OCCAECAT</h3>\n<p>Lorem ipsum dolor sit amet, consectetur adipiscing elit. Proin tristique in tortor et dignissim. Quisque non tempor leo. Maecenas egestas sem elit</p>".to_string(),
                    target_url: "https://www.example.com".to_string(),
                    image_filename: format!("sample-{}{}.jpg", index, rtl_suffix),
                },
            );
        }
        slide
    }
}

/// Flattened slide row for one shop and language, ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SlideView {
    pub id: i64,
    pub position: i32,
    pub active: bool,
    pub title: String,
    pub caption: String,
    pub description: String,
    /// Normalized target link.
    pub url: String,
    pub image: String,
    pub image_url: String,
    /// Set for admin listings when the slide is associated with several shops.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_shared: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn translation() -> SlideTranslation {
        SlideTranslation {
            title: "Spring sale".into(),
            caption: "spring".into(),
            description: "<p>Everything must go</p>".into(),
            target_url: "https://shop.example/sale".into(),
            image_filename: "abc_spring.png".into(),
        }
    }

    #[test]
    fn test_valid_translation_has_no_messages() {
        assert!(translation().check().is_empty());
    }

    #[test]
    fn test_title_boundary() {
        let mut t = translation();
        t.title = "a".repeat(255);
        assert!(t.check().is_empty());
        t.title = "a".repeat(256);
        assert_eq!(t.check(), vec!["The title is too long."]);
    }

    #[test]
    fn test_description_boundary() {
        let mut t = translation();
        t.description = "d".repeat(4000);
        assert!(t.check().is_empty());
        t.description = "d".repeat(4001);
        assert_eq!(t.check(), vec!["The description is too long."]);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        let mut t = translation();
        t.caption = "é".repeat(255);
        assert!(t.check().is_empty());
    }

    #[test]
    fn test_target_url_format() {
        let mut t = translation();
        t.target_url = String::new();
        assert!(t.check().is_empty());
        t.target_url = "<script>alert(1)</script>".into();
        assert_eq!(t.check(), vec!["The URL format is not correct."]);
    }

    #[test]
    fn test_url_too_long_and_malformed_both_reported() {
        let mut t = translation();
        t.target_url = format!("<{}", "u".repeat(300));
        let messages = t.check();
        assert!(messages.contains(&"The URL is too long.".to_string()));
        assert!(messages.contains(&"The URL format is not correct.".to_string()));
    }

    #[test]
    fn test_image_filename_safety() {
        let mut t = translation();
        t.image_filename = "../../secret.png".into();
        assert_eq!(t.check(), vec!["Invalid filename."]);
    }

    #[test]
    fn test_validate_all_accumulates_across_languages() {
        let mut slide = Slide::new(1, true);
        let mut en = translation();
        en.title = "t".repeat(256);
        let mut fr = translation();
        fr.caption = "c".repeat(256);
        fr.description = "d".repeat(4001);
        slide.translations.insert(1, en);
        slide.translations.insert(2, fr);

        match slide.validate_all() {
            Err(SliderError::Validation(messages)) => {
                assert_eq!(
                    messages,
                    vec![
                        "The title is too long.",
                        "The caption is too long.",
                        "The description is too long."
                    ]
                );
            }
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_displayable_requires_image_in_language() {
        let mut slide = Slide::new(1, true);
        slide.translations.insert(1, translation());
        let mut no_image = translation();
        no_image.image_filename.clear();
        slide.translations.insert(2, no_image);

        assert!(slide.is_displayable_in(1));
        assert!(!slide.is_displayable_in(2));
        assert!(!slide.is_displayable_in(3));
    }

    #[test]
    fn test_image_filenames_are_distinct() {
        let mut slide = Slide::new(1, true);
        slide.translations.insert(1, translation());
        slide.translations.insert(2, translation());
        let mut empty = translation();
        empty.image_filename.clear();
        slide.translations.insert(3, empty);

        let names: Vec<String> = slide.image_filenames().into_iter().collect();
        assert_eq!(names, vec!["abc_spring.png".to_string()]);
    }

    #[test]
    fn test_generated_content_within_limits_is_valid() {
        use fake::faker::lorem::en::{Paragraph, Sentence};
        use fake::Fake;

        for _ in 0..20 {
            let mut t = translation();
            t.title = Sentence(2..6).fake();
            t.caption = Sentence(1..4).fake();
            t.description = Paragraph(1..4).fake();
            assert!(t.check().is_empty(), "{:?}", t);
        }
    }

    #[test]
    fn test_slide_view_hides_unshared_marker() {
        let mut view = SlideView {
            id: 1,
            position: 1,
            active: true,
            title: "t".into(),
            caption: "c".into(),
            description: String::new(),
            url: "https://shop.example/".into(),
            image: "a.png".into(),
            image_url: "/img/a.png".into(),
            is_shared: false,
        };
        let json = serde_json::to_value(&view).unwrap();
        assert!(json.get("isShared").is_none());
        assert_eq!(json["imageUrl"], "/img/a.png");

        view.is_shared = true;
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["isShared"], true);
    }

    #[test]
    fn test_sample_slide_uses_rtl_image() {
        let languages = vec![
            Language {
                id: 1,
                iso_code: "en".into(),
                is_rtl: false,
            },
            Language {
                id: 2,
                iso_code: "ar".into(),
                is_rtl: true,
            },
        ];
        let slide = Slide::sample(2, &languages);
        assert_eq!(slide.position, 2);
        assert!(slide.active);
        assert!(slide.is_new());
        assert_eq!(slide.translation(1).unwrap().image_filename, "sample-2.jpg");
        assert_eq!(
            slide.translation(2).unwrap().image_filename,
            "sample-2_rtl.jpg"
        );
        assert_eq!(slide.translation(1).unwrap().title, "Sample 2");
        assert!(slide.validate_all().is_ok());
    }
}
