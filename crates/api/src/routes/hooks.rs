//! Host hook endpoints: display hook rendering and shop duplication.

use axum::{
    extract::{Path, Query, State},
    response::Html,
    Json,
};
use persistence::repositories::{HookRepository, SlideRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::widget::{self, is_display_hook, WidgetContext};

/// Storefront context of a hook call.
#[derive(Debug, Default, Deserialize)]
pub struct HookQuery {
    pub id_shop: Option<i32>,
    pub id_lang: Option<i32>,
    pub id_currency: Option<i32>,
}

/// Renders a display hook the module is registered on.
pub async fn render_hook(
    State(state): State<AppState>,
    Path(hook_name): Path<String>,
    Query(query): Query<HookQuery>,
) -> Result<Html<String>, ApiError> {
    let module = &state.config.slider.module_name;
    let registered = is_display_hook(&hook_name)
        && HookRepository::new(state.pool.clone())
            .is_registered(module, &hook_name)
            .await?;
    if !registered {
        return Err(ApiError::NotFound(format!(
            "Hook {} is not registered",
            hook_name
        )));
    }

    let context = WidgetContext {
        shop_id: state.config.resolve_shop(query.id_shop),
        language_id: state.config.resolve_language(query.id_lang),
        currency_id: query.id_currency.unwrap_or(0),
    };
    let html = widget::render_hook(&state, &hook_name, context).await?;
    Ok(Html(html.to_string()))
}

/// Shop duplication payload sent by the host.
#[derive(Debug, Deserialize, Validate)]
pub struct ShopDuplicationRequest {
    #[validate(range(min = 1, message = "old_shop_id must be positive"))]
    pub old_shop_id: i32,
    #[validate(range(min = 1, message = "new_shop_id must be positive"))]
    pub new_shop_id: i32,
}

#[derive(Debug, Serialize)]
pub struct ShopDuplicationResponse {
    pub associations_copied: u64,
}

/// Makes every slide of the source shop visible in the duplicated shop.
pub async fn duplicate_shop(
    State(state): State<AppState>,
    Json(request): Json<ShopDuplicationRequest>,
) -> Result<Json<ShopDuplicationResponse>, ApiError> {
    request.validate()?;
    if request.old_shop_id == request.new_shop_id {
        return Err(ApiError::Validation(
            "old_shop_id and new_shop_id must differ".to_string(),
        ));
    }

    let copied = SlideRepository::new(state.pool.clone())
        .duplicate_shop_associations(request.old_shop_id, request.new_shop_id)
        .await?;
    state.render_cache.invalidate_all().await;

    info!(
        old_shop_id = request.old_shop_id,
        new_shop_id = request.new_shop_id,
        copied,
        "Slide associations duplicated"
    );
    Ok(Json(ShopDuplicationResponse {
        associations_copied: copied,
    }))
}
