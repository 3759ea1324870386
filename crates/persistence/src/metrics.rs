//! Database metrics collection.

use metrics::{gauge, histogram};
use sqlx::PgPool;
use std::time::Instant;

/// Record database query duration.
pub fn record_query_duration(query_name: &str, status: &'static str, duration_secs: f64) {
    histogram!(
        "database_query_duration_seconds",
        "query" => query_name.to_string(),
        "status" => status
    )
    .record(duration_secs);
}

/// Record connection pool gauges. Called on each metrics scrape.
pub fn record_pool_metrics(pool: &PgPool) {
    let size = pool.size() as usize;
    let idle = pool.num_idle();
    let active = size.saturating_sub(idle);

    gauge!("database_connections_active").set(active as f64);
    gauge!("database_connections_idle").set(idle as f64);
    gauge!("database_connections_total").set(size as f64);
}

/// Times one repository operation.
///
/// ```ignore
/// let timer = QueryTimer::new("find_slide_by_id");
/// let result = sqlx::query_as::<_, SlideMetaEntity>(...).fetch_optional(&pool).await;
/// timer.finish(result)
/// ```
pub struct QueryTimer {
    query_name: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn new(query_name: &'static str) -> Self {
        Self {
            query_name,
            start: Instant::now(),
        }
    }

    /// Records a successful run.
    pub fn record(self) {
        record_query_duration(self.query_name, "ok", self.start.elapsed().as_secs_f64());
    }

    /// Records the run labelled by outcome and hands the result back.
    pub fn finish<T, E>(self, result: Result<T, E>) -> Result<T, E> {
        let status = if result.is_ok() { "ok" } else { "error" };
        record_query_duration(self.query_name, status, self.start.elapsed().as_secs_f64());
        result
    }
}
