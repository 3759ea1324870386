//! Hook registration entity.

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Row of the host `hook_module` table.
#[derive(Debug, Clone, FromRow)]
pub struct HookRegistrationEntity {
    pub module: String,
    pub hook_name: String,
    pub position: i32,
    pub registered_at: DateTime<Utc>,
}
