//! Slider stylesheet/script assets and uploaded slide images.

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;
use tokio::fs;
use tracing::warn;

use crate::app::AppState;
use crate::services::image_store::is_salted_name;

/// Embedded carousel and admin assets from the assets/slider directory.
#[derive(Embed)]
#[folder = "assets/slider/"]
struct SliderAssets;

const ASSET_CACHE_CONTROL: &str = "public, max-age=3600";
const SALTED_MEDIA_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";
/// Sample banners keep fixed names and are regenerated on reinstall.
const MEDIA_CACHE_CONTROL: &str = "public, max-age=3600";

fn media_cache_control(filename: &str) -> &'static str {
    if is_salted_name(filename) {
        SALTED_MEDIA_CACHE_CONTROL
    } else {
        MEDIA_CACHE_CONTROL
    }
}

fn file_response(path: &str, content: Vec<u8>, cache_control: &'static str) -> Response {
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, mime.as_ref())
        .header(header::CACHE_CONTROL, cache_control)
        .body(Body::from(content))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// Serves an embedded asset under `/modules/image-slider/*path`.
pub async fn serve_asset(Path(path): Path<String>) -> Response {
    match SliderAssets::get(&path) {
        Some(content) => file_response(&path, content.data.into_owned(), ASSET_CACHE_CONTROL),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Serves a stored slide image from the image directory.
pub async fn serve_media(State(state): State<AppState>, Path(filename): Path<String>) -> Response {
    let Some(path) = state.images.path_of(&filename) else {
        warn!(filename = %filename, "Rejected media request with unsafe name");
        return StatusCode::NOT_FOUND.into_response();
    };

    match fs::read(&path).await {
        Ok(content) => file_response(&filename, content, media_cache_control(&filename)),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
