//! Security headers middleware.
//!
//! Adds security-related HTTP headers to all responses.

use axum::{
    body::Body,
    http::{header, HeaderValue, Request},
    middleware::Next,
    response::Response,
};

/// Environment variable enabling `Strict-Transport-Security`.
pub const HSTS_ENV_VAR: &str = "SLIDER__SECURITY__HSTS_ENABLED";

const HSTS_VALUE: &str = "max-age=31536000; includeSubDomains";

fn hsts_enabled(value: Option<&str>) -> bool {
    value.map(|v| v.eq_ignore_ascii_case("true")).unwrap_or(false)
}

/// Middleware that adds security headers to all responses.
///
/// Headers added:
/// - `X-Content-Type-Options: nosniff`
/// - `X-Frame-Options: SAMEORIGIN` (the widget fragment may be embedded by the shop itself)
/// - `Referrer-Policy: strict-origin-when-cross-origin`
/// - `Strict-Transport-Security` when `SLIDER__SECURITY__HSTS_ENABLED=true`
pub async fn security_headers_middleware(req: Request<Body>, next: Next) -> Response {
    let mut response = next.run(req).await;
    let headers = response.headers_mut();

    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    // Only behind proper TLS termination
    if hsts_enabled(std::env::var(HSTS_ENV_VAR).ok().as_deref()) {
        headers.insert(
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static(HSTS_VALUE),
        );
    }

    response
}
