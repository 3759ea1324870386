//! Storefront widget: view model assembly and cached hook rendering.

use std::sync::Arc;

use domain::models::Shop;
use domain::services::load_settings;
use persistence::repositories::{SlideListQuery, SlideRepository};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::render_cache::RenderKey;
use crate::views::widget::{render_header_assets, render_slider, WidgetModel, WidgetSlide};

pub const HOOK_DISPLAY_HEADER: &str = "displayHeader";
pub const HOOK_DISPLAY_HOME: &str = "displayHome";
pub const HOOK_SHOP_DATA_DUPLICATION: &str = "actionShopDataDuplication";

/// Hooks registered on install.
pub const MODULE_HOOKS: [&str; 3] = [
    HOOK_DISPLAY_HEADER,
    HOOK_DISPLAY_HOME,
    HOOK_SHOP_DATA_DUPLICATION,
];

/// Display hooks produce markup; action hooks do not.
pub fn is_display_hook(hook_name: &str) -> bool {
    hook_name.starts_with("display")
}

/// Storefront context a fragment is rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WidgetContext {
    pub shop_id: i32,
    pub language_id: i32,
    pub currency_id: i32,
}

/// Active, displayable slides of `shop` with the settings that apply to it.
pub async fn build_model(
    state: &AppState,
    shop: &Shop,
    language_id: i32,
) -> Result<WidgetModel, ApiError> {
    let settings = load_settings(
        state.config_store.as_ref(),
        Some(shop.group_id),
        Some(shop.id),
    )
    .await?;

    let views = SlideRepository::new(state.pool.clone())
        .list_slides(
            SlideListQuery::displayable(shop.id, language_id),
            &shop.base_url,
            &state.config.slider.media_base_url,
        )
        .await?;

    let mut slides = Vec::with_capacity(views.len());
    for slide in views {
        let size = state.images.dimensions(&slide.image).await;
        slides.push(WidgetSlide {
            width: size.map(|(w, _)| w),
            height: size.map(|(_, h)| h),
            slide,
        });
    }

    Ok(WidgetModel::new(settings, slides))
}

/// Markup of a display hook. Widget renders go through the render cache.
pub async fn render_hook(
    state: &AppState,
    hook_name: &str,
    context: WidgetContext,
) -> Result<Arc<str>, ApiError> {
    if hook_name == HOOK_DISPLAY_HEADER {
        return Ok(Arc::from(render_header_assets()));
    }

    let shop = state
        .directory
        .get(context.shop_id)
        .ok_or_else(|| ApiError::NotFound(format!("Shop {} not found", context.shop_id)))?;

    let key = RenderKey::new(
        hook_name,
        context.shop_id,
        context.language_id,
        context.currency_id,
    );
    state
        .render_cache
        .get_or_try_insert_with(key, || async move {
            let model = build_model(state, shop, context.language_id).await?;
            debug!(
                hook = hook_name,
                shop_id = shop.id,
                slides = model.slides.len(),
                "Rendered slider widget"
            );
            Ok::<_, ApiError>(render_slider(&model))
        })
        .await
}
