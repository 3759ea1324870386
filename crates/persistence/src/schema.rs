//! Module-owned tables.
//!
//! Unlike the host tables created by migrations, these tables exist only
//! while the module is installed: install creates them and uninstall drops
//! them.

use sqlx::PgPool;
use tracing::info;

use crate::metrics::QueryTimer;

/// Statements creating the shop association, slide and translation tables.
pub const CREATE_STATEMENTS: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS slide_meta (
        id BIGSERIAL PRIMARY KEY,
        position INTEGER NOT NULL DEFAULT 0,
        active BOOLEAN NOT NULL DEFAULT FALSE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS slides (
        id BIGINT NOT NULL,
        shop_id INTEGER NOT NULL,
        PRIMARY KEY (id, shop_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS slide_translations (
        id BIGINT NOT NULL,
        language_id INTEGER NOT NULL,
        title VARCHAR(255) NOT NULL DEFAULT '',
        description TEXT NOT NULL DEFAULT '',
        caption VARCHAR(255) NOT NULL DEFAULT '',
        url VARCHAR(255) NOT NULL DEFAULT '',
        image VARCHAR(255) NOT NULL DEFAULT '',
        PRIMARY KEY (id, language_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_slides_shop_id ON slides (shop_id)",
];

/// Statements dropping the module tables.
pub const DROP_STATEMENTS: [&str; 3] = [
    "DROP TABLE IF EXISTS slides",
    "DROP TABLE IF EXISTS slide_translations",
    "DROP TABLE IF EXISTS slide_meta",
];

/// Creates the module tables.
pub async fn create_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    let timer = QueryTimer::new("create_module_tables");
    let mut tx = pool.begin().await?;
    for statement in CREATE_STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    timer.record();
    info!("Slider tables created");
    Ok(())
}

/// Drops the module tables and everything in them.
pub async fn drop_tables(pool: &PgPool) -> Result<(), sqlx::Error> {
    let timer = QueryTimer::new("drop_module_tables");
    let mut tx = pool.begin().await?;
    for statement in DROP_STATEMENTS {
        sqlx::query(statement).execute(&mut *tx).await?;
    }
    tx.commit().await?;
    timer.record();
    info!("Slider tables dropped");
    Ok(())
}

/// Whether the module tables exist.
pub async fn tables_exist(pool: &PgPool) -> Result<bool, sqlx::Error> {
    let timer = QueryTimer::new("module_tables_exist");
    let result = sqlx::query_scalar::<_, bool>(
        r#"
        SELECT to_regclass('slide_meta') IS NOT NULL
           AND to_regclass('slides') IS NOT NULL
           AND to_regclass('slide_translations') IS NOT NULL
        "#,
    )
    .fetch_one(pool)
    .await;
    timer.finish(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_module_table_is_created_and_dropped() {
        for table in ["slides", "slide_meta", "slide_translations"] {
            assert!(
                CREATE_STATEMENTS
                    .iter()
                    .any(|s| s.contains(&format!("CREATE TABLE IF NOT EXISTS {} (", table))),
                "{} not created",
                table
            );
            assert!(
                DROP_STATEMENTS
                    .iter()
                    .any(|s| s.ends_with(&format!("EXISTS {}", table))),
                "{} not dropped",
                table
            );
        }
    }
}
