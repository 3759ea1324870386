//! Connection pool for the slider tables.

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::time::Duration;

/// Pool sizing and timeouts, resolved from the application config.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
}

impl PoolSettings {
    /// Builder with sizing applied; the URL is used by [`connect`].
    pub fn options(&self) -> PgPoolOptions {
        // A minimum above the maximum makes sqlx reject the pool at runtime.
        let min = self.min_connections.min(self.max_connections);
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(min)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// Opens the pool and waits for the first connection.
pub async fn connect(settings: &PoolSettings) -> Result<PgPool, sqlx::Error> {
    let pool = settings.options().connect(&settings.url).await?;
    tracing::info!(
        max_connections = settings.max_connections,
        "Slider database pool ready"
    );
    Ok(pool)
}

/// Round-trip used by the health and readiness probes.
pub async fn ping(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(min: u32, max: u32) -> PoolSettings {
        PoolSettings {
            url: "postgres://localhost/slider".to_string(),
            max_connections: max,
            min_connections: min,
            acquire_timeout: Duration::from_secs(3),
            idle_timeout: Duration::from_secs(60),
        }
    }

    #[test]
    fn test_options_apply_sizing() {
        let options = settings(2, 8).options();
        assert_eq!(options.get_max_connections(), 8);
        assert_eq!(options.get_min_connections(), 2);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_min_is_clamped_to_max() {
        let options = settings(10, 4).options();
        assert_eq!(options.get_min_connections(), 4);
    }
}
