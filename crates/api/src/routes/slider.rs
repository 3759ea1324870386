//! Widget JSON view and the admin reorder endpoint.

use axum::{
    extract::{Query, State},
    Json,
};
use persistence::repositories::SlideRepository;
use serde::{Deserialize, Serialize};
use shared::crypto::verify_secure_key;
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::routes::hooks::HookQuery;
use crate::services::widget::build_model;
use crate::views::widget::WidgetModel;

pub const REORDER_ACTION: &str = "updateSlidesPosition";

/// Widget view model for a shop and language.
pub async fn get_slider(
    State(state): State<AppState>,
    Query(query): Query<HookQuery>,
) -> Result<Json<WidgetModel>, ApiError> {
    let shop_id = state.config.resolve_shop(query.id_shop);
    let language_id = state.config.resolve_language(query.id_lang);
    let shop = state
        .directory
        .get(shop_id)
        .ok_or_else(|| ApiError::NotFound(format!("Shop {} not found", shop_id)))?;

    Ok(Json(build_model(&state, shop, language_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct SecureKeyQuery {
    #[serde(default)]
    pub secure_key: String,
}

#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub action: String,
    #[serde(default)]
    pub slides: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ReorderResponse {
    pub updated: u64,
}

/// Rewrites slide positions 1..n in the submitted order.
pub async fn reorder_slides(
    State(state): State<AppState>,
    Query(query): Query<SecureKeyQuery>,
    Json(request): Json<ReorderRequest>,
) -> Result<Json<ReorderResponse>, ApiError> {
    let config = &state.config;
    if !verify_secure_key(
        &config.slider.module_name,
        &config.security.secret,
        &query.secure_key,
    ) {
        warn!("Rejected reorder request with wrong secure key");
        return Err(ApiError::Forbidden("Invalid secure key".to_string()));
    }

    if request.action != REORDER_ACTION {
        return Err(ApiError::Validation(format!(
            "Unknown action: {}",
            request.action
        )));
    }

    let updated = SlideRepository::new(state.pool.clone())
        .update_positions(&request.slides)
        .await?;
    state.render_cache.invalidate_all().await;

    info!(slides = request.slides.len(), updated, "Slide positions updated");
    Ok(Json(ReorderResponse { updated }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reorder_request_parsing() {
        let request: ReorderRequest =
            serde_json::from_str(r#"{"action":"updateSlidesPosition","slides":[3,1,2]}"#).unwrap();
        assert_eq!(request.action, REORDER_ACTION);
        assert_eq!(request.slides, vec![3, 1, 2]);

        let empty: ReorderRequest = serde_json::from_str(r#"{"action":"x"}"#).unwrap();
        assert!(empty.slides.is_empty());
    }
}
