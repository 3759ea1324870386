//! Module install and uninstall.
//!
//! Install is idempotent: tables are created if missing, hook registration
//! ignores duplicates and sample slides are only seeded into an empty slider.

use std::collections::BTreeSet;

use domain::models::slide::SAMPLE_SLIDE_COUNT;
use domain::models::{ShopContext, Slide, SliderSettings};
use domain::services::{delete_settings, save_settings_for_context};
use domain::SliderError;
use persistence::repositories::{HookRepository, SlideRepository};
use persistence::schema;
use tracing::{info, warn};

use crate::app::AppState;
use crate::services::widget::MODULE_HOOKS;

/// Error types for install and uninstall.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Slider error: {0}")]
    Slider(#[from] SliderError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Default settings could not be written: {0}")]
    Settings(String),
}

/// What an install did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    pub hooks_registered: usize,
    pub samples_seeded: usize,
}

/// What an uninstall removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UninstallReport {
    pub slides_deleted: usize,
    pub images_removed: usize,
    pub settings_deleted: u64,
}

pub async fn is_installed(state: &AppState) -> Result<bool, sqlx::Error> {
    schema::tables_exist(&state.pool).await
}

/// Creates the module tables, registers hooks, writes default settings at
/// every scope and seeds the sample slides.
pub async fn install(state: &AppState) -> Result<InstallReport, LifecycleError> {
    let module = &state.config.slider.module_name;
    let mut report = InstallReport::default();

    state.images.ensure_dir().await?;
    schema::create_tables(&state.pool).await?;

    let hooks = HookRepository::new(state.pool.clone());
    for hook in MODULE_HOOKS {
        hooks.register(module, hook).await?;
        report.hooks_registered += 1;
    }

    let written = save_settings_for_context(
        state.config_store.as_ref(),
        &state.directory,
        ShopContext::All,
        &SliderSettings::default(),
    )
    .await;
    if !written.is_success() {
        return Err(LifecycleError::Settings(written.failed.join("; ")));
    }

    let repo = SlideRepository::new(state.pool.clone());
    if repo.all_ids().await?.is_empty() {
        let shop_ids: Vec<i32> = state.directory.shops().iter().map(|s| s.id).collect();
        for index in 1..=SAMPLE_SLIDE_COUNT {
            let slide = Slide::sample(index, &state.config.languages);
            for filename in slide.image_filenames() {
                state.images.ensure_sample_image(&filename, index).await?;
            }
            let slide_id = repo.create(&slide, &shop_ids).await?;
            info!(slide_id, position = index, "Seeded sample slide");
            report.samples_seeded += 1;
        }
    } else {
        info!("Slides already present, skipping sample slides");
    }

    state.render_cache.invalidate_all().await;
    info!(
        module = %module,
        hooks = report.hooks_registered,
        samples = report.samples_seeded,
        "Image slider installed"
    );
    Ok(report)
}

/// Deletes every slide and its images, drops the tables, unregisters hooks
/// and removes the settings at every scope.
pub async fn uninstall(state: &AppState) -> Result<UninstallReport, LifecycleError> {
    let module = &state.config.slider.module_name;
    let mut report = UninstallReport::default();

    if schema::tables_exist(&state.pool).await? {
        let repo = SlideRepository::new(state.pool.clone());
        let mut images = BTreeSet::new();
        for slide_id in repo.all_ids().await? {
            if let Some(filenames) = repo.delete(slide_id).await? {
                images.extend(filenames);
                report.slides_deleted += 1;
            }
        }
        for filename in images {
            match state.images.remove(&filename).await {
                Ok(true) => report.images_removed += 1,
                Ok(false) => {}
                Err(e) => warn!(filename = %filename, error = %e, "Failed to remove image"),
            }
        }
        schema::drop_tables(&state.pool).await?;
    }

    HookRepository::new(state.pool.clone())
        .unregister_all(module)
        .await?;
    report.settings_deleted = delete_settings(state.config_store.as_ref()).await?;
    state.render_cache.invalidate_all().await;

    info!(
        module = %module,
        slides = report.slides_deleted,
        images = report.images_removed,
        "Image slider uninstalled"
    );
    Ok(report)
}
