//! Liveness, readiness and slider status probes.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::services::lifecycle;

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct SliderHealth {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseProbe,
    pub module: ModuleProbe,
    pub render_cache: RenderCacheProbe,
}

#[derive(Debug, Serialize)]
pub struct DatabaseProbe {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Install state of the slider and its image directory.
#[derive(Debug, Serialize)]
pub struct ModuleProbe {
    pub installed: bool,
    pub image_dir: String,
    pub image_dir_present: bool,
}

#[derive(Debug, Serialize)]
pub struct RenderCacheProbe {
    pub entries: u64,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Serialize)]
pub struct ProbeStatus {
    pub status: &'static str,
}

impl SliderHealth {
    fn is_healthy(&self) -> bool {
        self.database.connected
    }
}

/// Reports database reachability, install state and cache counters.
///
/// Answers 503 with no body when the database cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> Result<Json<SliderHealth>, StatusCode> {
    let started = std::time::Instant::now();
    let connected = persistence::db::ping(&state.pool).await.is_ok();
    let elapsed = started.elapsed().as_millis() as u64;

    let installed = if connected {
        lifecycle::is_installed(&state).await.unwrap_or(false)
    } else {
        false
    };
    let image_dir = state.images.dir();
    let stats = state.render_cache.stats();

    let health = SliderHealth {
        status: if connected { "healthy" } else { "unhealthy" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseProbe {
            connected,
            latency_ms: connected.then_some(elapsed),
        },
        module: ModuleProbe {
            installed,
            image_dir: image_dir.display().to_string(),
            image_dir_present: tokio::fs::metadata(image_dir)
                .await
                .map(|meta| meta.is_dir())
                .unwrap_or(false),
        },
        render_cache: RenderCacheProbe {
            entries: stats.entry_count,
            hits: stats.hits,
            misses: stats.misses,
        },
    };

    if health.is_healthy() {
        Ok(Json(health))
    } else {
        tracing::warn!("Health check failed: database unreachable");
        Err(StatusCode::SERVICE_UNAVAILABLE)
    }
}

/// Always 200 while the process serves requests.
pub async fn live() -> Json<ProbeStatus> {
    Json(ProbeStatus { status: "alive" })
}

/// 200 once the database answers, 503 otherwise.
pub async fn ready(State(state): State<AppState>) -> Result<Json<ProbeStatus>, StatusCode> {
    persistence::db::ping(&state.pool)
        .await
        .map(|_| Json(ProbeStatus { status: "ready" }))
        .map_err(|_| StatusCode::SERVICE_UNAVAILABLE)
}
