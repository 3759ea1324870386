//! Configuration entity (database row mapping).

use domain::services::{ConfigScope, ScopedValue};
use sqlx::FromRow;

/// Row of the host `configuration` table.
#[derive(Debug, Clone, FromRow)]
pub struct ConfigurationEntity {
    pub name: String,
    pub value: String,
    pub shop_group_id: Option<i32>,
    pub shop_id: Option<i32>,
}

impl From<ConfigurationEntity> for ScopedValue {
    fn from(entity: ConfigurationEntity) -> Self {
        Self {
            scope: ConfigScope::from_columns(entity.shop_group_id, entity.shop_id),
            value: entity.value,
        }
    }
}
