//! Admin configuration page workflow.
//!
//! A request is decoded once into an [`AdminAction`]. Mutations check every
//! field before touching storage; on failure the page is re-rendered with the
//! accumulated messages and the submitted values, on success the admin is
//! redirected to the list with a `conf` flag.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use domain::models::{
    AdminAction, FormMode, SettingsForm, ShopContext, Slide, SlideForm, TranslationInput,
};
use domain::services::{load_settings, save_settings_for_context};
use domain::SliderError;
use persistence::repositories::{SlideListQuery, SlideRepository};
use shared::crypto::module_secure_key;
use shared::validation::is_integer;
use tracing::{error, info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_admin_action;
use crate::services::image_store::UploadedImage;
use crate::views::admin::{
    alert, alert_one, confirmation_message, edit_context_error, page, scope_info,
    settings_form, slide_form, slide_list, AlertKind, SettingsFormValues, SlideFormView,
    ADD_CONTEXT_ERROR, MULTISHOP_WARNING, MULTI_LANGUAGE_INFO, SHARED_SLIDE_WARNING,
};
use crate::views::widget::ASSET_BASE;

pub const CONF_DELETED: u8 = 1;
pub const CONF_CREATED: u8 = 3;
pub const CONF_UPDATED: u8 = 4;
pub const CONF_SETTINGS: u8 = 6;

const CONFIGURATION_NOT_UPDATED: &str = "The configuration could not be updated.";

/// Terminal state of one admin request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminOutcome {
    Page(String),
    /// Location of the list page carrying a `conf` flag.
    Redirect(String),
}

impl AdminOutcome {
    fn label(&self) -> &'static str {
        match self {
            AdminOutcome::Page(_) => "page",
            AdminOutcome::Redirect(_) => "redirect",
        }
    }
}

/// Parses a submitted slide id the way the form validators accept it.
fn parse_slide_id(raw: &str) -> Result<i64, SliderError> {
    let trimmed = raw.trim();
    if !is_integer(trimmed) {
        return Err(SliderError::InvalidId(raw.to_string()));
    }
    trimmed
        .parse()
        .map_err(|_| SliderError::InvalidId(raw.to_string()))
}

fn translation_inputs(slide: &Slide) -> BTreeMap<i32, TranslationInput> {
    slide
        .translations
        .iter()
        .map(|(language_id, t)| {
            (
                *language_id,
                TranslationInput {
                    title: t.title.clone(),
                    caption: t.caption.clone(),
                    description: t.description.clone(),
                    url: t.target_url.clone(),
                    uploaded_file: None,
                    old_image: t.image_filename.clone(),
                },
            )
        })
        .collect()
}

/// Admin workflow bound to one shop context.
pub struct SliderAdmin<'a> {
    state: &'a AppState,
    context: ShopContext,
}

impl<'a> SliderAdmin<'a> {
    pub fn new(state: &'a AppState, context: ShopContext) -> Self {
        Self { state, context }
    }

    fn repo(&self) -> SlideRepository {
        SlideRepository::new(self.state.pool.clone())
    }

    /// Stored slide with all its translations.
    async fn load_slide(&self, slide_id: i64) -> Result<Slide, SliderError> {
        self.repo()
            .find_by_id(slide_id)
            .await
            .map_err(|e| SliderError::Persistence(e.to_string()))?
            .ok_or(SliderError::NotFound(slide_id))
    }

    /// Admin page URL for the current context.
    pub fn action_url(&self) -> String {
        format!(
            "{}?shop_context={}",
            self.state.config.slider.admin_path,
            self.context.as_param()
        )
    }

    fn redirect(&self, conf: u8) -> AdminOutcome {
        AdminOutcome::Redirect(format!("{}&conf={}", self.action_url(), conf))
    }

    fn reorder_url(&self) -> String {
        let key = module_secure_key(
            &self.state.config.slider.module_name,
            &self.state.config.security.secret,
        );
        format!("{}ajax?secure_key={}", ASSET_BASE, key)
    }

    /// Runs one decoded action. `uploads` maps file field names to received files.
    pub async fn handle(
        &self,
        action: AdminAction,
        uploads: HashMap<String, UploadedImage>,
        conf: Option<u8>,
    ) -> Result<AdminOutcome, ApiError> {
        let name = action.name();
        let result = match action {
            AdminAction::SaveSlide(form) => self.save_slide(form, uploads).await,
            AdminAction::DeleteSlide { slide_id } => self.delete_slide(&slide_id).await,
            AdminAction::SaveSettings(form) => self.save_settings(form).await,
            AdminAction::ToggleStatus { slide_id } => self.toggle_status(&slide_id).await,
            AdminAction::ShowForm(FormMode::Add) => self.show_add_form().await,
            AdminAction::ShowForm(FormMode::Edit(slide_id)) => self.show_edit_form(&slide_id).await,
            AdminAction::ShowList => {
                let notice = conf
                    .and_then(confirmation_message)
                    .map(|m| alert_one(AlertKind::Success, m))
                    .unwrap_or_default();
                self.list_page(&notice).await.map(AdminOutcome::Page)
            }
        };

        record_admin_action(
            name,
            match &result {
                Ok(outcome) => outcome.label(),
                Err(_) => "error",
            },
        );
        result
    }

    /// Settings form followed by the slide list (single-shop contexts only).
    async fn list_page(&self, notices: &str) -> Result<String, ApiError> {
        let config = &self.state.config;
        let directory = &self.state.directory;
        let action_url = self.action_url();

        let mut body = String::from(notices);
        if !self.context.is_single_shop() {
            body.push_str(&alert_one(AlertKind::Warning, MULTISHOP_WARNING));
        }
        if let Some(info) = scope_info(directory, self.context) {
            body.push_str(&info);
        }

        let settings = load_settings(
            self.state.config_store.as_ref(),
            directory.context_group_id(self.context),
            self.context.shop_id(),
        )
        .await?;
        body.push_str(&settings_form(
            &SettingsFormValues {
                speed: settings.speed.to_string(),
                pause_on_hover: settings.pause_on_hover,
                wrap: settings.wrap,
            },
            &action_url,
        ));

        if let Some(shop) = self.context.shop_id().and_then(|id| directory.get(id)) {
            let slides = self
                .repo()
                .list_slides(
                    SlideListQuery::admin(shop.id, config.default_language_id),
                    &shop.base_url,
                    &config.slider.media_base_url,
                )
                .await?;
            body.push_str(&slide_list(&slides, &action_url, &self.reorder_url()));
        }

        Ok(page(&body))
    }

    fn form_page(&self, notices: &str, view: SlideFormView<'_>) -> String {
        let mut body = String::from(notices);
        if self.state.config.languages.len() > 1 {
            body.push_str(&alert_one(AlertKind::Info, MULTI_LANGUAGE_INFO));
        }
        body.push_str(&slide_form(&view));
        page(&body)
    }

    fn form_view(&self, form: &SlideForm) -> SlideFormView<'_> {
        SlideFormView {
            slide_id: form.slide_id.clone(),
            active: form.active(),
            has_picture: form.has_picture,
            translations: form.translations.clone(),
            languages: &self.state.config.languages,
            image_base_url: &self.state.config.slider.media_base_url,
            action_url: self.action_url(),
        }
    }

    /// Re-renders the submitted slide form under an error alert.
    fn rejected_form(&self, form: &SlideForm, messages: &[String]) -> AdminOutcome {
        AdminOutcome::Page(self.form_page(&alert(AlertKind::Danger, messages), self.form_view(form)))
    }

    async fn show_add_form(&self) -> Result<AdminOutcome, ApiError> {
        if !self.context.is_single_shop() {
            return Ok(AdminOutcome::Page(page(&alert_one(
                AlertKind::Danger,
                ADD_CONTEXT_ERROR,
            ))));
        }
        let view = SlideFormView {
            slide_id: None,
            active: false,
            has_picture: false,
            translations: BTreeMap::new(),
            languages: &self.state.config.languages,
            image_base_url: &self.state.config.slider.media_base_url,
            action_url: self.action_url(),
        };
        Ok(AdminOutcome::Page(self.form_page("", view)))
    }

    async fn show_edit_form(&self, raw_id: &str) -> Result<AdminOutcome, ApiError> {
        let loaded = match parse_slide_id(raw_id) {
            Ok(id) => self.load_slide(id).await,
            Err(err) => Err(err),
        };
        let slide = match loaded {
            Ok(slide) => slide,
            Err(SliderError::InvalidId(_) | SliderError::NotFound(_)) => {
                return self.list_page("").await.map(AdminOutcome::Page);
            }
            Err(err) => return Err(err.into()),
        };
        let slide_id = slide.id.unwrap_or_default();

        let shop_ids = self.repo().associated_shop_ids(slide_id).await?;
        if shop_ids.is_empty() {
            let err = SliderError::ShopAssociation(slide_id);
            warn!(slide_id, "Slide has no shop association");
            return Ok(AdminOutcome::Page(page(&alert_one(
                AlertKind::Danger,
                &err.to_string(),
            ))));
        }

        match self.context.shop_id() {
            Some(shop_id) if shop_ids.contains(&shop_id) => {
                let notices = if shop_ids.len() > 1 {
                    alert_one(AlertKind::Warning, SHARED_SLIDE_WARNING)
                } else {
                    String::new()
                };
                let languages = &self.state.config.languages;
                let has_picture = languages.iter().all(|l| slide.is_displayable_in(l.id));
                let view = SlideFormView {
                    slide_id: Some(slide_id.to_string()),
                    active: slide.active,
                    has_picture,
                    translations: translation_inputs(&slide),
                    languages,
                    image_base_url: &self.state.config.slider.media_base_url,
                    action_url: self.action_url(),
                };
                Ok(AdminOutcome::Page(self.form_page(&notices, view)))
            }
            _ => {
                let names = self.state.directory.names_of(&shop_ids);
                Ok(AdminOutcome::Page(page(&edit_context_error(&names))))
            }
        }
    }

    async fn toggle_status(&self, raw_id: &str) -> Result<AdminOutcome, ApiError> {
        let slide_id = match parse_slide_id(raw_id) {
            Ok(id) => id,
            Err(err) => return self.rejected_list(&err.to_string()).await,
        };

        let result = self.repo().toggle_active(slide_id).await;
        self.state.render_cache.invalidate_all().await;
        let notice = match result {
            Ok(Some(active)) => {
                info!(slide_id, active, shop_context = %self.context, "Slide status changed");
                alert_one(AlertKind::Success, "Configuration updated")
            }
            Ok(None) => {
                return self
                    .rejected_list(&SliderError::NotFound(slide_id).to_string())
                    .await
            }
            Err(e) => {
                error!(slide_id, error = %e, "Failed to toggle slide status");
                alert_one(AlertKind::Danger, CONFIGURATION_NOT_UPDATED)
            }
        };
        self.list_page(&notice).await.map(AdminOutcome::Page)
    }

    async fn rejected_list(&self, message: &str) -> Result<AdminOutcome, ApiError> {
        self.list_page(&alert_one(AlertKind::Danger, message))
            .await
            .map(AdminOutcome::Page)
    }

    async fn delete_slide(&self, raw_id: &str) -> Result<AdminOutcome, ApiError> {
        let slide_id = match parse_slide_id(raw_id) {
            Ok(id) => id,
            Err(err) => return self.rejected_list(&err.to_string()).await,
        };

        let result = self.repo().delete(slide_id).await;
        self.state.render_cache.invalidate_all().await;
        match result {
            Ok(Some(images)) => {
                info!(slide_id, shop_context = %self.context, "Slide deleted");
                self.remove_unreferenced(images).await;
                Ok(self.redirect(CONF_DELETED))
            }
            Ok(None) => {
                self.rejected_list(&SliderError::NotFound(slide_id).to_string())
                    .await
            }
            Err(e) => {
                error!(slide_id, error = %e, "Failed to delete slide");
                self.rejected_list("Could not delete.").await
            }
        }
    }

    async fn save_settings(&self, form: SettingsForm) -> Result<AdminOutcome, ApiError> {
        let errors = form.validate_fields();
        if !errors.is_empty() {
            return self
                .list_page(&alert(AlertKind::Danger, &errors))
                .await
                .map(AdminOutcome::Page);
        }

        let settings = form.to_settings();
        let report = save_settings_for_context(
            self.state.config_store.as_ref(),
            &self.state.directory,
            self.context,
            &settings,
        )
        .await;
        self.state.render_cache.invalidate_all().await;

        if report.is_success() {
            info!(
                shop_context = %self.context,
                speed = settings.speed,
                writes = report.attempted,
                "Slider settings updated"
            );
            Ok(self.redirect(CONF_SETTINGS))
        } else {
            warn!(
                shop_context = %self.context,
                failed = report.failed.len(),
                attempted = report.attempted,
                "Slider settings partially written"
            );
            self.rejected_list(CONFIGURATION_NOT_UPDATED).await
        }
    }

    /// Shop the slide is saved from and, when editing, the stored slide,
    /// after the same context guards as the edit form.
    async fn guarded_target(
        &self,
        form: &SlideForm,
    ) -> Result<Result<(i32, Option<Slide>), Vec<String>>, ApiError> {
        let Some(shop_id) = self.context.shop_id() else {
            return Ok(Err(vec![ADD_CONTEXT_ERROR.to_string()]));
        };
        let Some(slide_id) = form.parsed_slide_id() else {
            return Ok(Ok((shop_id, None)));
        };

        let slide = match self.load_slide(slide_id).await {
            Ok(slide) => slide,
            Err(err @ SliderError::NotFound(_)) => return Ok(Err(err.messages())),
            Err(err) => return Err(err.into()),
        };
        let shop_ids = self.repo().associated_shop_ids(slide_id).await?;
        if shop_ids.is_empty() {
            warn!(slide_id, "Slide has no shop association");
            return Ok(Err(SliderError::ShopAssociation(slide_id).messages()));
        }
        if !shop_ids.contains(&shop_id) {
            let names = self.state.directory.names_of(&shop_ids);
            return Ok(Err(vec![format!(
                "You can only edit this slide from the shop(s) context: {}",
                names.join(", ")
            )]));
        }
        Ok(Ok((shop_id, Some(slide))))
    }

    async fn save_slide(
        &self,
        form: SlideForm,
        mut uploads: HashMap<String, UploadedImage>,
    ) -> Result<AdminOutcome, ApiError> {
        let errors = form.validate_fields();
        if !errors.is_empty() {
            return Ok(self.rejected_form(&form, &errors));
        }

        let (shop_id, stored_slide) = match self.guarded_target(&form).await? {
            Ok(target) => target,
            Err(messages) => return Ok(self.rejected_form(&form, &messages)),
        };

        let repo = self.repo();
        let mut slide = match stored_slide {
            Some(slide) => slide,
            None => Slide::new(repo.next_position(shop_id).await?, form.active()),
        };
        let previous_images = slide.image_filenames();

        // Store every submitted image before writing anything.
        let mut stored = BTreeMap::new();
        let mut upload_errors = Vec::new();
        for (language_id, input) in &form.translations {
            if input.uploaded_file.is_none() {
                continue;
            }
            let Some(upload) = uploads.remove(&format!("image_{}", language_id)) else {
                continue;
            };
            match self.state.images.store_upload(upload).await {
                Ok(filename) => {
                    stored.insert(*language_id, filename);
                }
                Err(SliderError::InvalidUpload(message)) => upload_errors.push(message),
                Err(other) => upload_errors.extend(other.messages()),
            }
        }
        if !upload_errors.is_empty() {
            self.discard_uploads(stored.values()).await;
            return Ok(self.rejected_form(&form, &upload_errors));
        }

        form.apply_to(&mut slide, &stored);
        if let Err(e) = slide.validate_all() {
            self.discard_uploads(stored.values()).await;
            return Ok(self.rejected_form(&form, &e.messages()));
        }

        let outcome = match slide.id {
            Some(slide_id) => match repo.update(&slide).await {
                Ok(rows) if rows > 0 => {
                    info!(slide_id, shop_id, "Slide updated");
                    Ok(CONF_UPDATED)
                }
                Ok(_) => Err("The slide could not be updated."),
                Err(e) => {
                    error!(slide_id, error = %e, "Failed to update slide");
                    Err("The slide could not be updated.")
                }
            },
            None => match repo.create(&slide, &[shop_id]).await {
                Ok(slide_id) => {
                    info!(slide_id, shop_id, position = slide.position, "Slide created");
                    Ok(CONF_CREATED)
                }
                Err(e) => {
                    error!(shop_id, error = %e, "Failed to create slide");
                    Err("The slide could not be added.")
                }
            },
        };
        self.state.render_cache.invalidate_all().await;

        match outcome {
            Ok(conf) => {
                let current = slide.image_filenames();
                let stale: BTreeSet<String> =
                    previous_images.difference(&current).cloned().collect();
                self.remove_unreferenced(stale).await;
                Ok(self.redirect(conf))
            }
            Err(message) => {
                self.discard_uploads(stored.values()).await;
                Ok(self.rejected_form(&form, &[message.to_string()]))
            }
        }
    }

    /// Deletes freshly stored files of a rejected submission.
    async fn discard_uploads<'s>(&self, filenames: impl IntoIterator<Item = &'s String>) {
        for filename in filenames {
            if let Err(e) = self.state.images.remove(filename).await {
                warn!(filename = %filename, error = %e, "Failed to discard upload");
            }
        }
    }

    /// Deletes image files no translation row refers to any more.
    async fn remove_unreferenced(&self, filenames: impl IntoIterator<Item = String>) {
        let repo = self.repo();
        for filename in filenames {
            match repo.count_image_references(&filename).await {
                Ok(0) => {
                    if let Err(e) = self.state.images.remove(&filename).await {
                        warn!(filename = %filename, error = %e, "Failed to remove image");
                    }
                }
                Ok(_) => {}
                Err(e) => warn!(filename = %filename, error = %e, "Failed to count image references"),
            }
        }
    }
}
