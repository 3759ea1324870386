//! Hook registration repository.

use sqlx::PgPool;

use crate::entities::HookRegistrationEntity;
use crate::metrics::QueryTimer;

/// Repository for the hooks a module is registered on.
#[derive(Clone)]
pub struct HookRepository {
    pool: PgPool,
}

impl HookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Registers `module` on `hook_name`. Registering twice is a no-op.
    pub async fn register(&self, module: &str, hook_name: &str) -> Result<(), sqlx::Error> {
        let timer = QueryTimer::new("register_hook");
        let result = sqlx::query(
            r#"
            INSERT INTO hook_module (module, hook_name, position)
            SELECT $1, $2, COALESCE(MAX(position), 0) + 1
            FROM hook_module WHERE hook_name = $2
            ON CONFLICT (module, hook_name) DO NOTHING
            "#,
        )
        .bind(module)
        .bind(hook_name)
        .execute(&self.pool)
        .await;
        timer.finish(result).map(|_| ())
    }

    /// Removes every hook registration of `module`.
    pub async fn unregister_all(&self, module: &str) -> Result<u64, sqlx::Error> {
        let timer = QueryTimer::new("unregister_hooks");
        let result = sqlx::query("DELETE FROM hook_module WHERE module = $1")
            .bind(module)
            .execute(&self.pool)
            .await;
        timer.finish(result).map(|r| r.rows_affected())
    }

    pub async fn is_registered(&self, module: &str, hook_name: &str) -> Result<bool, sqlx::Error> {
        let timer = QueryTimer::new("hook_is_registered");
        let result = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM hook_module WHERE module = $1 AND hook_name = $2)",
        )
        .bind(module)
        .bind(hook_name)
        .fetch_one(&self.pool)
        .await;
        timer.finish(result)
    }

    pub async fn list_for_module(
        &self,
        module: &str,
    ) -> Result<Vec<HookRegistrationEntity>, sqlx::Error> {
        let timer = QueryTimer::new("list_module_hooks");
        let result = sqlx::query_as::<_, HookRegistrationEntity>(
            r#"
            SELECT module, hook_name, position, registered_at
            FROM hook_module
            WHERE module = $1
            ORDER BY hook_name
            "#,
        )
        .bind(module)
        .fetch_all(&self.pool)
        .await;
        timer.finish(result)
    }
}
