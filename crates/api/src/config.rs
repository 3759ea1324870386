use domain::models::{Language, Shop, ShopDirectory};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub slider: SliderConfig,
    /// Host shop directory
    #[serde(default)]
    pub shops: Vec<Shop>,
    #[serde(default)]
    pub languages: Vec<Language>,
    #[serde(default = "default_language_id")]
    pub default_language_id: i32,
    /// Shop used when an admin request carries no shop context
    #[serde(default = "default_shop_id")]
    pub default_shop_id: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_body_size")]
    pub max_body_size: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    /// Token expected in the `X-Admin-Token` header of admin requests
    #[serde(default)]
    pub admin_token: String,

    /// Secret the module secure key is derived from
    #[serde(default)]
    pub secret: String,

    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SliderConfig {
    #[serde(default = "default_module_name")]
    pub module_name: String,

    /// Directory slide images are stored in
    #[serde(default = "default_image_dir")]
    pub image_dir: PathBuf,

    /// Public URL prefix the image directory is served under
    #[serde(default = "default_media_base_url")]
    pub media_base_url: String,

    /// Path of the admin configuration page, used for redirects
    #[serde(default = "default_admin_path")]
    pub admin_path: String,

    #[serde(default = "default_upload_max_bytes")]
    pub upload_max_bytes: usize,

    #[serde(default = "default_render_cache_capacity")]
    pub render_cache_capacity: u64,

    #[serde(default = "default_render_cache_ttl")]
    pub render_cache_ttl_secs: u64,

    /// Install the module on startup when its tables are missing
    #[serde(default)]
    pub auto_install: bool,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_body_size() -> usize {
    8_388_608
}
fn default_max_connections() -> u32 {
    10
}
fn default_min_connections() -> u32 {
    2
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_module_name() -> String {
    "image_slider".to_string()
}
fn default_image_dir() -> PathBuf {
    PathBuf::from("media/slider")
}
fn default_media_base_url() -> String {
    "/media/slider/".to_string()
}
fn default_admin_path() -> String {
    "/admin/slider".to_string()
}
fn default_upload_max_bytes() -> usize {
    4_194_304
}
fn default_render_cache_capacity() -> u64 {
    1_000
}
fn default_render_cache_ttl() -> u64 {
    3600
}
fn default_language_id() -> i32 {
    1
}
fn default_shop_id() -> i32 {
    1
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SLIDER__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SLIDER").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides.
    ///
    /// Defaults are embedded so tests do not depend on config files.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            default_language_id = 1
            default_shop_id = 1

            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30
            max_body_size = 8388608

            [database]
            url = ""
            max_connections = 10
            min_connections = 2
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            admin_token = "test-admin-token"
            secret = "test-secret"
            cors_origins = []

            [slider]
            module_name = "image_slider"
            image_dir = "media/slider"
            media_base_url = "/media/slider/"
            admin_path = "/admin/slider"

            [[shops]]
            id = 1
            group_id = 1
            name = "Default"
            base_url = "https://shop.example/"

            [[languages]]
            id = 1
            iso_code = "en"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        let cfg: Self = builder.build()?.try_deserialize()?;
        // Skip validation in tests to allow partial configs
        Ok(cfg)
    }

    /// Validate configuration values.
    fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.database.url.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SLIDER__DATABASE__URL environment variable must be set".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigValidationError::InvalidValue(
                "Server port cannot be 0".to_string(),
            ));
        }

        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigValidationError::InvalidValue(
                "min_connections cannot exceed max_connections".to_string(),
            ));
        }

        if self.security.admin_token.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "SLIDER__SECURITY__ADMIN_TOKEN environment variable must be set".to_string(),
            ));
        }

        if !self.slider.admin_path.starts_with('/') {
            return Err(ConfigValidationError::InvalidValue(
                "slider.admin_path must start with '/'".to_string(),
            ));
        }

        if self.shops.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "at least one shop must be configured".to_string(),
            ));
        }

        if self.languages.is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "at least one language must be configured".to_string(),
            ));
        }

        if !self.shops.iter().any(|s| s.id == self.default_shop_id) {
            return Err(ConfigValidationError::InvalidValue(format!(
                "default_shop_id {} is not a configured shop",
                self.default_shop_id
            )));
        }

        if !self
            .languages
            .iter()
            .any(|l| l.id == self.default_language_id)
        {
            return Err(ConfigValidationError::InvalidValue(format!(
                "default_language_id {} is not a configured language",
                self.default_language_id
            )));
        }

        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.server.host, self.server.port).parse()
    }

    /// Pool settings for [`persistence::db::connect`].
    pub fn pool_settings(&self) -> persistence::db::PoolSettings {
        persistence::db::PoolSettings {
            url: self.database.url.clone(),
            max_connections: self.database.max_connections,
            min_connections: self.database.min_connections,
            acquire_timeout: Duration::from_secs(self.database.connect_timeout_secs),
            idle_timeout: Duration::from_secs(self.database.idle_timeout_secs),
        }
    }

    pub fn shop_directory(&self) -> ShopDirectory {
        ShopDirectory::new(self.shops.clone())
    }

    /// Language used when a request does not name a known one.
    pub fn resolve_language(&self, requested: Option<i32>) -> i32 {
        requested
            .filter(|id| self.languages.iter().any(|l| l.id == *id))
            .unwrap_or(self.default_language_id)
    }

    /// Shop used when a request does not name a known one.
    pub fn resolve_shop(&self, requested: Option<i32>) -> i32 {
        requested
            .filter(|id| self.shops.iter().any(|s| s.id == *id))
            .unwrap_or(self.default_shop_id)
    }
}
