use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use domain::models::ShopDirectory;
use domain::services::ConfigurationStore;
use persistence::repositories::PgConfigurationStore;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_admin, security_headers_middleware, trace_id,
};
use crate::routes::{admin, assets, health, hooks, slider};
use crate::services::{ImageStore, RenderCache};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub config_store: Arc<dyn ConfigurationStore>,
    pub render_cache: Arc<RenderCache>,
    pub images: ImageStore,
    pub directory: Arc<ShopDirectory>,
}

impl AppState {
    pub fn new(config: Config, pool: PgPool) -> Self {
        let render_cache = RenderCache::new(
            config.slider.render_cache_capacity,
            Duration::from_secs(config.slider.render_cache_ttl_secs),
        );
        let images = ImageStore::new(
            config.slider.image_dir.clone(),
            config.slider.upload_max_bytes,
        );

        Self {
            config_store: Arc::new(PgConfigurationStore::new(pool.clone())),
            directory: Arc::new(config.shop_directory()),
            render_cache: Arc::new(render_cache),
            images,
            config: Arc::new(config),
            pool,
        }
    }

    /// Replaces the configuration store.
    pub fn with_config_store(mut self, store: Arc<dyn ConfigurationStore>) -> Self {
        self.config_store = store;
        self
    }
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    create_router(AppState::new(config, pool))
}

pub fn create_router(state: AppState) -> Router {
    let config = state.config.clone();

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Admin page and host callbacks (require admin token)
    let admin_routes = Router::new()
        .route(
            &config.slider.admin_path,
            get(admin::admin_page).post(admin::admin_submit),
        )
        .route(
            "/api/v1/hooks/shop-duplication",
            post(hooks::duplicate_shop),
        )
        .layer(DefaultBodyLimit::max(config.server.max_body_size))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    // Storefront routes (no authentication required)
    let storefront_routes = Router::new()
        .route("/hooks/:hook_name", get(hooks::render_hook))
        .route("/api/v1/slider", get(slider::get_slider))
        .route("/modules/image-slider/*path", get(assets::serve_asset));

    // Reorder endpoint authenticates with the module secure key
    let ajax_routes = Router::new().route(
        "/modules/image-slider/ajax",
        post(slider::reorder_slides),
    );

    let mut public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Media is only served locally when it is not on another host
    let media_base = &config.slider.media_base_url;
    if media_base.starts_with('/') && media_base.ends_with('/') {
        public_routes = public_routes.route(
            &format!("{}:filename", media_base),
            get(assets::serve_media),
        );
    }

    Router::new()
        .merge(public_routes)
        .merge(storefront_routes)
        .merge(ajax_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware)) // Security headers
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware)) // Prometheus metrics
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id)) // Request ID and logging
        .layer(cors)
        .with_state(state)
}
