//! Scoped settings resolution.
//!
//! A setting value may be stored at three scopes. Resolution order, highest
//! priority first:
//! 1. Shop
//! 2. Shop group
//! 3. Global
//!
//! Callers fall back to compiled defaults when no scope holds a value.

use serde::{Deserialize, Serialize};

/// Scope a configuration row is written at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope")]
pub enum ConfigScope {
    Global,
    Group { group_id: i32 },
    Shop { group_id: i32, shop_id: i32 },
}

impl ConfigScope {
    /// `(shop_group_id, shop_id)` columns of a row at this scope.
    pub fn columns(&self) -> (Option<i32>, Option<i32>) {
        match self {
            ConfigScope::Global => (None, None),
            ConfigScope::Group { group_id } => (Some(*group_id), None),
            ConfigScope::Shop { group_id, shop_id } => (Some(*group_id), Some(*shop_id)),
        }
    }

    /// Inverse of [`ConfigScope::columns`]. A shop id without a group is
    /// treated as shop scope in group 0.
    pub fn from_columns(shop_group_id: Option<i32>, shop_id: Option<i32>) -> Self {
        match (shop_group_id, shop_id) {
            (group, Some(shop_id)) => ConfigScope::Shop {
                group_id: group.unwrap_or(0),
                shop_id,
            },
            (Some(group_id), None) => ConfigScope::Group { group_id },
            (None, None) => ConfigScope::Global,
        }
    }
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Shop,
    ShopGroup,
    Global,
    DefaultValue,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Shop => write!(f, "shop"),
            Self::ShopGroup => write!(f, "shop_group"),
            Self::Global => write!(f, "global"),
            Self::DefaultValue => write!(f, "default_value"),
        }
    }
}

/// One stored value for a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedValue {
    pub scope: ConfigScope,
    pub value: String,
}

/// Picks the value that applies to `(group_id, shop_id)` from all stored rows
/// of one key. `None` for either id skips that level.
pub fn resolve_scoped_value(
    rows: &[ScopedValue],
    group_id: Option<i32>,
    shop_id: Option<i32>,
) -> Option<(String, ValueSource)> {
    if let Some(shop_id) = shop_id {
        let shop_row = rows.iter().find(|row| {
            matches!(row.scope, ConfigScope::Shop { shop_id: id, .. } if id == shop_id)
        });
        if let Some(row) = shop_row {
            return Some((row.value.clone(), ValueSource::Shop));
        }
    }

    if let Some(group_id) = group_id {
        let group_row = rows.iter().find(|row| {
            matches!(row.scope, ConfigScope::Group { group_id: id } if id == group_id)
        });
        if let Some(row) = group_row {
            return Some((row.value.clone(), ValueSource::ShopGroup));
        }
    }

    rows.iter()
        .find(|row| row.scope == ConfigScope::Global)
        .map(|row| (row.value.clone(), ValueSource::Global))
}
