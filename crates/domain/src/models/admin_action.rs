//! Admin request actions, decoded once from submitted form fields.

use std::collections::{BTreeMap, HashMap};

use crate::models::language::Language;
use crate::models::settings::{parse_flag, SettingKey, SliderSettings};
use crate::models::slide::{Slide, SlideTranslation};
use shared::validation::{is_file_name, is_integer, is_unsigned_integer};

/// Which form to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Add,
    /// Raw slide id as submitted.
    Edit(String),
}

/// What the admin asked for, in precedence order of the submitted fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminAction {
    SaveSlide(SlideForm),
    DeleteSlide { slide_id: String },
    SaveSettings(SettingsForm),
    ToggleStatus { slide_id: String },
    ShowForm(FormMode),
    ShowList,
}

fn field<'a>(fields: &'a HashMap<String, String>, name: &str) -> &'a str {
    fields.get(name).map(String::as_str).unwrap_or("")
}

impl AdminAction {
    /// Decodes the action from form/query fields and uploaded file names
    /// (upload field name to original client file name).
    pub fn decode(
        fields: &HashMap<String, String>,
        uploads: &HashMap<String, String>,
        languages: &[Language],
    ) -> Self {
        if fields.contains_key("submitSlide") {
            return AdminAction::SaveSlide(SlideForm::from_fields(fields, uploads, languages));
        }
        if let Some(id) = fields.get("delete_id_slide") {
            return AdminAction::DeleteSlide {
                slide_id: id.clone(),
            };
        }
        if fields.contains_key("deleteSlide") {
            return AdminAction::DeleteSlide {
                slide_id: field(fields, "id_slide").to_string(),
            };
        }
        if fields.contains_key("submitSettings") {
            return AdminAction::SaveSettings(SettingsForm::from_fields(fields));
        }
        if fields.contains_key("changeStatus") {
            return AdminAction::ToggleStatus {
                slide_id: field(fields, "id_slide").to_string(),
            };
        }
        if fields.contains_key("addSlide") {
            return AdminAction::ShowForm(FormMode::Add);
        }
        if fields.contains_key("editSlide") || fields.contains_key("id_slide") {
            return AdminAction::ShowForm(FormMode::Edit(field(fields, "id_slide").to_string()));
        }
        AdminAction::ShowList
    }

    /// Mutating actions run validation and invalidate the render cache.
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            AdminAction::SaveSlide(_)
                | AdminAction::DeleteSlide { .. }
                | AdminAction::SaveSettings(_)
                | AdminAction::ToggleStatus { .. }
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            AdminAction::SaveSlide(_) => "save_slide",
            AdminAction::DeleteSlide { .. } => "delete_slide",
            AdminAction::SaveSettings(_) => "save_settings",
            AdminAction::ToggleStatus { .. } => "toggle_status",
            AdminAction::ShowForm(_) => "show_form",
            AdminAction::ShowList => "show_list",
        }
    }
}

/// Submitted per-language slide fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationInput {
    pub title: String,
    pub caption: String,
    pub description: String,
    pub url: String,
    /// Original client filename when a new image was uploaded.
    pub uploaded_file: Option<String>,
    /// Previously stored filename echoed back by the form.
    pub old_image: String,
}

/// Add/edit slide form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlideForm {
    /// Raw `id_slide`; `None` or empty when adding.
    pub slide_id: Option<String>,
    pub active_slide: String,
    /// Every language already has an image, so uploads are optional.
    pub has_picture: bool,
    pub translations: BTreeMap<i32, TranslationInput>,
}

impl SlideForm {
    pub fn from_fields(
        fields: &HashMap<String, String>,
        uploads: &HashMap<String, String>,
        languages: &[Language],
    ) -> Self {
        let translations = languages
            .iter()
            .map(|language| {
                let id = language.id;
                let input = TranslationInput {
                    title: field(fields, &format!("title_{}", id)).to_string(),
                    caption: field(fields, &format!("legend_{}", id)).to_string(),
                    description: field(fields, &format!("description_{}", id)).to_string(),
                    url: field(fields, &format!("url_{}", id)).to_string(),
                    uploaded_file: uploads
                        .get(&format!("image_{}", id))
                        .filter(|name| !name.is_empty())
                        .cloned(),
                    old_image: field(fields, &format!("image_old_{}", id)).to_string(),
                };
                (id, input)
            })
            .collect();

        Self {
            slide_id: fields
                .get("id_slide")
                .filter(|id| !id.trim().is_empty())
                .cloned(),
            active_slide: field(fields, "active_slide").to_string(),
            has_picture: fields.contains_key("has_picture"),
            translations,
        }
    }

    /// Parsed slide id for edits. `None` when adding or not numeric.
    pub fn parsed_slide_id(&self) -> Option<i64> {
        self.slide_id.as_deref().and_then(|id| id.trim().parse().ok())
    }

    pub fn is_edit(&self) -> bool {
        self.slide_id.is_some()
    }

    pub fn active(&self) -> bool {
        self.active_slide.trim() == "1"
    }

    /// Field-level checks that need no storage access. Every field is checked;
    /// messages come back in check order.
    pub fn validate_fields(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let state = self.active_slide.trim();
        if !is_integer(state) || (state != "0" && state != "1") {
            errors.push("Invalid slide state.".to_string());
        }

        if let Some(id) = &self.slide_id {
            if !is_unsigned_integer(id) {
                errors.push("Invalid slide ID".to_string());
            }
        }

        for input in self.translations.values() {
            let candidate = SlideTranslation {
                title: input.title.clone(),
                caption: input.caption.clone(),
                description: input.description.clone(),
                target_url: input.url.clone(),
                image_filename: String::new(),
            };
            errors.extend(candidate.check());

            if let Some(name) = &input.uploaded_file {
                if !is_file_name(name) {
                    errors.push("Invalid filename.".to_string());
                }
            }
            if !input.old_image.is_empty() && !is_file_name(&input.old_image) {
                errors.push("Invalid filename.".to_string());
            }
            if !self.has_picture && input.uploaded_file.is_none() {
                errors.push("The image is not set.".to_string());
            }
        }

        errors
    }

    /// Copies submitted values onto `slide`. Image precedence per language:
    /// newly stored upload, then the echoed old image, then whatever the slide
    /// already had.
    pub fn apply_to(&self, slide: &mut Slide, stored_uploads: &BTreeMap<i32, String>) {
        slide.active = self.active();
        for (language_id, input) in &self.translations {
            let entry = slide.translations.entry(*language_id).or_default();
            entry.title = input.title.clone();
            entry.caption = input.caption.clone();
            entry.description = input.description.clone();
            entry.target_url = input.url.clone();
            if let Some(stored) = stored_uploads.get(language_id) {
                entry.image_filename = stored.clone();
            } else if !input.old_image.is_empty() {
                entry.image_filename = input.old_image.clone();
            }
        }
    }
}

/// Rotation settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    pub speed: String,
    pub pause_on_hover: String,
    pub wrap: String,
}

impl SettingsForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            speed: field(fields, SettingKey::Speed.form_field()).to_string(),
            pause_on_hover: field(fields, SettingKey::PauseOnHover.form_field()).to_string(),
            wrap: field(fields, SettingKey::Wrap.form_field()).to_string(),
        }
    }

    pub fn validate_fields(&self) -> Vec<String> {
        if is_unsigned_integer(&self.speed) && self.speed.trim().parse::<u32>().is_ok() {
            Vec::new()
        } else {
            vec!["Invalid values".to_string()]
        }
    }

    /// Converts validated input. Missing flags read as off.
    pub fn to_settings(&self) -> SliderSettings {
        SliderSettings {
            speed: self.speed.trim().parse().unwrap_or_default(),
            pause_on_hover: parse_flag(&self.pause_on_hover).unwrap_or(false),
            wrap: parse_flag(&self.wrap).unwrap_or(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> Vec<Language> {
        vec![
            Language {
                id: 1,
                iso_code: "en".into(),
                is_rtl: false,
            },
            Language {
                id: 2,
                iso_code: "fr".into(),
                is_rtl: false,
            },
        ]
    }

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn uploads(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        fields(pairs)
    }

    fn valid_slide_fields() -> HashMap<String, String> {
        fields(&[
            ("submitSlide", "1"),
            ("active_slide", "1"),
            ("title_1", "Hello"),
            ("legend_1", "hello"),
            ("url_1", "https://example.com"),
            ("description_1", "<p>Hi</p>"),
            ("title_2", "Bonjour"),
            ("legend_2", "bonjour"),
            ("url_2", ""),
            ("description_2", ""),
        ])
    }

    #[test]
    fn test_decode_precedence_mutations_first() {
        let f = fields(&[("submitSettings", "1"), ("addSlide", "1"), ("SPEED", "10")]);
        let action = AdminAction::decode(&f, &HashMap::new(), &languages());
        assert!(matches!(action, AdminAction::SaveSettings(_)));
        assert!(action.is_mutation());
    }

    #[test]
    fn test_decode_submit_slide_wins_over_delete() {
        let mut f = valid_slide_fields();
        f.insert("delete_id_slide".into(), "3".into());
        let action = AdminAction::decode(&f, &HashMap::new(), &languages());
        assert_eq!(action.name(), "save_slide");
    }

    #[test]
    fn test_decode_delete_variants() {
        let f = fields(&[("delete_id_slide", "4")]);
        assert_eq!(
            AdminAction::decode(&f, &HashMap::new(), &languages()),
            AdminAction::DeleteSlide {
                slide_id: "4".into()
            }
        );
        let f = fields(&[("deleteSlide", ""), ("id_slide", "5")]);
        assert_eq!(
            AdminAction::decode(&f, &HashMap::new(), &languages()),
            AdminAction::DeleteSlide {
                slide_id: "5".into()
            }
        );
    }

    #[test]
    fn test_decode_toggle_status() {
        let f = fields(&[("changeStatus", ""), ("id_slide", "9")]);
        assert_eq!(
            AdminAction::decode(&f, &HashMap::new(), &languages()),
            AdminAction::ToggleStatus {
                slide_id: "9".into()
            }
        );
    }

    #[test]
    fn test_decode_forms_and_default() {
        let langs = languages();
        assert_eq!(
            AdminAction::decode(&fields(&[("addSlide", "")]), &HashMap::new(), &langs),
            AdminAction::ShowForm(FormMode::Add)
        );
        assert_eq!(
            AdminAction::decode(&fields(&[("id_slide", "2")]), &HashMap::new(), &langs),
            AdminAction::ShowForm(FormMode::Edit("2".into()))
        );
        let list = AdminAction::decode(&fields(&[("conf", "3")]), &HashMap::new(), &langs);
        assert_eq!(list, AdminAction::ShowList);
        assert!(!list.is_mutation());
    }

    #[test]
    fn test_slide_form_reads_per_language_fields() {
        let form = SlideForm::from_fields(
            &valid_slide_fields(),
            &uploads(&[("image_1", "banner.png")]),
            &languages(),
        );
        assert_eq!(form.translations.len(), 2);
        let en = &form.translations[&1];
        assert_eq!(en.title, "Hello");
        assert_eq!(en.caption, "hello");
        assert_eq!(en.uploaded_file.as_deref(), Some("banner.png"));
        assert!(form.translations[&2].uploaded_file.is_none());
        assert!(!form.is_edit());
        assert!(form.active());
    }

    #[test]
    fn test_validate_requires_image_per_language() {
        let form = SlideForm::from_fields(
            &valid_slide_fields(),
            &uploads(&[("image_1", "banner.png")]),
            &languages(),
        );
        assert_eq!(form.validate_fields(), vec!["The image is not set."]);
    }

    #[test]
    fn test_validate_has_picture_allows_missing_uploads() {
        let mut f = valid_slide_fields();
        f.insert("has_picture".into(), "1".into());
        f.insert("id_slide".into(), "12".into());
        f.insert("image_old_1".into(), "abc_banner.png".into());
        let form = SlideForm::from_fields(&f, &HashMap::new(), &languages());
        assert!(form.validate_fields().is_empty());
        assert_eq!(form.parsed_slide_id(), Some(12));
    }

    #[test]
    fn test_validate_accumulates_everything() {
        let mut f = valid_slide_fields();
        f.insert("active_slide".into(), "2".into());
        f.insert("id_slide".into(), "abc".into());
        f.insert("title_1".into(), "x".repeat(256));
        f.insert("url_2".into(), "<nope>".into());
        f.insert("image_old_2".into(), "../x.png".into());
        let form = SlideForm::from_fields(
            &f,
            &uploads(&[("image_1", "bad name.png"), ("image_2", "ok.png")]),
            &languages(),
        );
        assert_eq!(
            form.validate_fields(),
            vec![
                "Invalid slide state.",
                "Invalid slide ID",
                "The title is too long.",
                "Invalid filename.",
                "The URL format is not correct.",
                "Invalid filename.",
            ]
        );
    }

    #[test]
    fn test_apply_to_image_precedence() {
        let mut f = valid_slide_fields();
        f.insert("image_old_2".into(), "old_fr.png".into());
        let form = SlideForm::from_fields(&f, &HashMap::new(), &languages());

        let mut slide = Slide::new(4, false);
        slide.translations.insert(
            1,
            SlideTranslation {
                image_filename: "existing_en.png".into(),
                ..Default::default()
            },
        );
        let mut stored = BTreeMap::new();
        stored.insert(1, "salt_new_en.png".to_string());

        form.apply_to(&mut slide, &stored);

        assert!(slide.active);
        assert_eq!(slide.position, 4);
        assert_eq!(slide.translations[&1].image_filename, "salt_new_en.png");
        assert_eq!(slide.translations[&1].title, "Hello");
        assert_eq!(slide.translations[&2].image_filename, "old_fr.png");
        assert_eq!(slide.translations[&2].title, "Bonjour");
    }

    #[test]
    fn test_apply_to_keeps_existing_image_without_input() {
        let form = SlideForm::from_fields(&valid_slide_fields(), &HashMap::new(), &languages());
        let mut slide = Slide::new(1, true);
        slide.translations.insert(
            2,
            SlideTranslation {
                image_filename: "kept.png".into(),
                ..Default::default()
            },
        );
        form.apply_to(&mut slide, &BTreeMap::new());
        assert_eq!(slide.translations[&2].image_filename, "kept.png");
        assert_eq!(slide.translations[&1].image_filename, "");
    }

    #[test]
    fn test_settings_form_validation() {
        let ok = SettingsForm::from_fields(&fields(&[("SPEED", "3000"), ("WRAP", "1")]));
        assert!(ok.validate_fields().is_empty());
        let settings = ok.to_settings();
        assert_eq!(settings.speed, 3000);
        assert!(!settings.pause_on_hover);
        assert!(settings.wrap);

        for bad in ["", "fast", "-1", "1.5"] {
            let form = SettingsForm::from_fields(&fields(&[("SPEED", bad)]));
            assert_eq!(form.validate_fields(), vec!["Invalid values"], "{}", bad);
        }
    }
}
