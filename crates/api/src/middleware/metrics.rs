//! Request and slider counters exported through Prometheus.

use axum::{
    body::Body,
    extract::{MatchedPath, State},
    http::{header, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Instant;

use crate::app::AppState;

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Area of the service a route belongs to, used as a low-cardinality label.
fn surface_of(route: &str) -> &'static str {
    if route.starts_with("/hooks/") || route.starts_with("/api/v1/slider") {
        "storefront"
    } else if route.starts_with("/modules/image-slider/ajax") {
        "reorder"
    } else if route.starts_with("/modules/") || route.starts_with("/media/") {
        "static"
    } else if route.starts_with("/api/health") || route == "/metrics" {
        "ops"
    } else if route == "unmatched" {
        "unmatched"
    } else {
        "admin"
    }
}

/// Records `slider_http_requests_total` and `slider_http_request_duration_seconds`.
///
/// The route label is the matched pattern, so slide ids and file names never
/// reach the label set.
pub async fn metrics_middleware(req: Request<Body>, next: Next) -> Response {
    let started = Instant::now();
    let method = req.method().as_str().to_owned();
    let route = req
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| "unmatched".to_string(), |m| m.as_str().to_string());
    let surface = surface_of(&route);

    let response = next.run(req).await;
    let status = response.status().as_u16().to_string();

    counter!(
        "slider_http_requests_total",
        "surface" => surface,
        "method" => method.clone(),
        "route" => route.clone(),
        "status" => status
    )
    .increment(1);
    histogram!(
        "slider_http_request_duration_seconds",
        "surface" => surface,
        "method" => method,
        "route" => route
    )
    .record(started.elapsed().as_secs_f64());

    response
}

/// Counts an admin action by name and outcome.
pub fn record_admin_action(action: &'static str, outcome: &'static str) {
    counter!(
        "slider_admin_actions_total",
        "action" => action,
        "outcome" => outcome
    )
    .increment(1);
}

/// Counts stored and rejected uploads.
pub fn record_upload(outcome: &'static str) {
    counter!("slider_uploads_total", "outcome" => outcome).increment(1);
}

/// `GET /metrics`: refreshes pool and cache gauges, then renders the exposition text.
pub async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    persistence::metrics::record_pool_metrics(&state.pool);
    state.render_cache.record_size();

    match PROMETHEUS_HANDLE.get() {
        Some(handle) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            handle.render(),
        ),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain")],
            "metrics recorder is not installed".to_string(),
        ),
    }
}

/// Installs the Prometheus recorder used by every counter in the crate.
///
/// Installs the global recorder on first call; later calls are no-ops.
pub fn init_metrics() -> Result<(), BuildError> {
    if PROMETHEUS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&[0.001, 0.005, 0.01, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0])?
        .install_recorder()?;

    // A concurrent initializer may have won; its handle is equivalent.
    let _ = PROMETHEUS_HANDLE.set(handle);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_surface_of_routes() {
        assert_eq!(surface_of("/hooks/:hook_name"), "storefront");
        assert_eq!(surface_of("/api/v1/slider"), "storefront");
        assert_eq!(surface_of("/modules/image-slider/ajax"), "reorder");
        assert_eq!(surface_of("/modules/image-slider/*path"), "static");
        assert_eq!(surface_of("/media/slider/:filename"), "static");
        assert_eq!(surface_of("/api/health/ready"), "ops");
        assert_eq!(surface_of("/metrics"), "ops");
        assert_eq!(surface_of("/admin/slider"), "admin");
        assert_eq!(surface_of("/api/v1/hooks/shop-duplication"), "admin");
        assert_eq!(surface_of("unmatched"), "unmatched");
    }

    #[test]
    fn test_record_helpers_without_recorder() {
        // No recorder installed in unit tests; recording must be a no-op.
        record_admin_action("save_slide", "success");
        record_upload("rejected");
    }
}
