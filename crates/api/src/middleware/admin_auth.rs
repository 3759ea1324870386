//! Admin authentication middleware.
//!
//! Admin pages and host callbacks are protected by a shared token carried in
//! the `X-Admin-Token` header.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;

/// Header carrying the admin token.
pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Middleware for admin-only routes.
///
/// Rejects requests whose `X-Admin-Token` header is missing or does not match
/// the configured admin token.
pub async fn require_admin(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let token = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    let Some(token) = token else {
        return unauthorized_response("Invalid or missing admin token");
    };

    if !shared::crypto::tokens_match(&state.config.security.admin_token, token) {
        tracing::warn!(path = %req.uri().path(), "Rejected admin request with wrong token");
        return unauthorized_response("Invalid or missing admin token");
    }

    next.run(req).await
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
