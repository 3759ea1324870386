//! Admin configuration page routes.
//!
//! `GET` renders the list, a form or a confirmation; `POST` carries one of the
//! mutating actions as a multipart form. Both take the `shop_context` query
//! parameter and require the admin token.

use std::collections::HashMap;

use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};
use domain::models::{AdminAction, ShopContext};
use tracing::debug;

use crate::app::AppState;
use crate::error::ApiError;
use crate::services::{AdminOutcome, SliderAdmin, UploadedImage};

/// Current admin scope. A missing parameter selects the default shop.
pub fn resolve_context(
    state: &AppState,
    params: &HashMap<String, String>,
) -> Result<ShopContext, ApiError> {
    let raw = params
        .get("shop_context")
        .map(|v| v.trim())
        .filter(|v| !v.is_empty());
    let Some(raw) = raw else {
        return Ok(ShopContext::Shop(state.config.default_shop_id));
    };

    ShopContext::parse(raw)
        .filter(|context| state.directory.is_known(*context))
        .ok_or_else(|| ApiError::Validation(format!("Unknown shop context: {}", raw)))
}

fn into_response(outcome: AdminOutcome) -> Response {
    match outcome {
        AdminOutcome::Page(html) => Html(html).into_response(),
        AdminOutcome::Redirect(location) => Redirect::to(&location).into_response(),
    }
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(e.body_text())
    } else {
        ApiError::Validation(format!("Invalid form data: {}", e.body_text()))
    }
}

/// Text fields and non-empty file parts of a submitted form.
async fn read_form(
    mut multipart: Multipart,
) -> Result<(HashMap<String, String>, HashMap<String, UploadedImage>), ApiError> {
    let mut fields = HashMap::new();
    let mut uploads = HashMap::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        match field.file_name().map(str::to_string) {
            Some(original_name) => {
                let bytes = field.bytes().await.map_err(multipart_error)?;
                // Browsers send an empty part for file inputs left blank
                if original_name.is_empty() || bytes.is_empty() {
                    continue;
                }
                uploads.insert(
                    name,
                    UploadedImage {
                        original_name,
                        bytes: bytes.to_vec(),
                    },
                );
            }
            None => {
                let value = field.text().await.map_err(multipart_error)?;
                fields.insert(name, value);
            }
        }
    }

    Ok((fields, uploads))
}

/// GET /admin/slider
pub async fn admin_page(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, ApiError> {
    let context = resolve_context(&state, &params)?;
    let action = AdminAction::decode(&params, &HashMap::new(), &state.config.languages);
    if action.is_mutation() {
        return Err(ApiError::Validation(
            "Changes must be submitted with POST".to_string(),
        ));
    }
    let conf = params.get("conf").and_then(|c| c.trim().parse().ok());

    let outcome = SliderAdmin::new(&state, context)
        .handle(action, HashMap::new(), conf)
        .await?;
    Ok(into_response(outcome))
}

/// POST /admin/slider
pub async fn admin_submit(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let context = resolve_context(&state, &params)?;
    let (form, uploads) = read_form(multipart).await?;

    // Form fields win over query parameters of the same name.
    let mut fields = params;
    fields.remove("conf");
    fields.extend(form);

    let upload_names: HashMap<String, String> = uploads
        .iter()
        .map(|(field, upload)| (field.clone(), upload.original_name.clone()))
        .collect();
    let action = AdminAction::decode(&fields, &upload_names, &state.config.languages);
    debug!(action = action.name(), shop_context = %context, uploads = uploads.len(), "Admin submission");

    let outcome = SliderAdmin::new(&state, context)
        .handle(action, uploads, None)
        .await?;
    Ok(into_response(outcome))
}
