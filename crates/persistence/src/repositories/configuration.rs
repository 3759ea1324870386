//! PostgreSQL-backed configuration store.

use async_trait::async_trait;
use domain::services::{ConfigScope, ConfigurationStore, ScopedValue};
use domain::SliderError;
use sqlx::PgPool;

use crate::entities::ConfigurationEntity;
use crate::metrics::QueryTimer;

fn persistence_error(e: sqlx::Error) -> SliderError {
    SliderError::Persistence(e.to_string())
}

/// Configuration store over the host `configuration` table.
#[derive(Clone)]
pub struct PgConfigurationStore {
    pool: PgPool,
}

impl PgConfigurationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigurationStore for PgConfigurationStore {
    async fn values(&self, key: &str) -> Result<Vec<ScopedValue>, SliderError> {
        let timer = QueryTimer::new("configuration_values");
        let rows = sqlx::query_as::<_, ConfigurationEntity>(
            r#"
            SELECT name, value, shop_group_id, shop_id
            FROM configuration
            WHERE name = $1
            "#,
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await;
        let rows = timer.finish(rows).map_err(persistence_error)?;
        Ok(rows.into_iter().map(ScopedValue::from).collect())
    }

    async fn set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<(), SliderError> {
        let (shop_group_id, shop_id) = scope.columns();
        let timer = QueryTimer::new("configuration_set");
        let result = sqlx::query(
            r#"
            INSERT INTO configuration (name, value, shop_group_id, shop_id, updated_at)
            VALUES ($1, $2, $3, $4, NOW())
            ON CONFLICT (name, COALESCE(shop_group_id, 0), COALESCE(shop_id, 0))
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(shop_group_id)
        .bind(shop_id)
        .execute(&self.pool)
        .await;
        timer.finish(result).map_err(persistence_error)?;
        Ok(())
    }

    async fn delete_by_name(&self, key: &str) -> Result<u64, SliderError> {
        let timer = QueryTimer::new("configuration_delete");
        let result = sqlx::query("DELETE FROM configuration WHERE name = $1")
            .bind(key)
            .execute(&self.pool)
            .await;
        timer
            .finish(result)
            .map(|r| r.rows_affected())
            .map_err(persistence_error)
    }
}
