//! Key/value configuration store with shop, group and global scopes.

use std::sync::Mutex;

use async_trait::async_trait;
use tracing::warn;

use crate::errors::SliderError;
use crate::models::settings::{SettingKey, SliderSettings};
use crate::models::shop::{ShopContext, ShopDirectory};
use crate::services::settings_resolution::{resolve_scoped_value, ConfigScope, ScopedValue};

/// Scoped key/value storage owned by the host platform.
#[async_trait]
pub trait ConfigurationStore: Send + Sync {
    /// Every stored row of `key`, at any scope.
    async fn values(&self, key: &str) -> Result<Vec<ScopedValue>, SliderError>;

    /// Inserts or replaces the row of `key` at `scope`.
    async fn set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<(), SliderError>;

    /// Removes `key` at every scope. Returns the number of rows removed.
    async fn delete_by_name(&self, key: &str) -> Result<u64, SliderError>;

    /// Value applying to `(group_id, shop_id)`: shop, then group, then global.
    async fn get(
        &self,
        key: &str,
        group_id: Option<i32>,
        shop_id: Option<i32>,
    ) -> Result<Option<String>, SliderError> {
        let rows = self.values(key).await?;
        Ok(resolve_scoped_value(&rows, group_id, shop_id).map(|(value, _)| value))
    }
}

/// Process-local store for tests and single-node development.
#[derive(Debug, Default)]
pub struct InMemoryConfigurationStore {
    rows: Mutex<Vec<(String, ScopedValue)>>,
    failing_scope: Option<ConfigScope>,
}

impl InMemoryConfigurationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose writes at `scope` always fail.
    pub fn failing_on(scope: ConfigScope) -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            failing_scope: Some(scope),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<(String, ScopedValue)>>, SliderError> {
        self.rows
            .lock()
            .map_err(|_| SliderError::Persistence("configuration store poisoned".to_string()))
    }
}

#[async_trait]
impl ConfigurationStore for InMemoryConfigurationStore {
    async fn values(&self, key: &str) -> Result<Vec<ScopedValue>, SliderError> {
        Ok(self
            .lock()?
            .iter()
            .filter(|(name, _)| name == key)
            .map(|(_, row)| row.clone())
            .collect())
    }

    async fn set(&self, key: &str, value: &str, scope: ConfigScope) -> Result<(), SliderError> {
        if self.failing_scope == Some(scope) {
            return Err(SliderError::Persistence(format!(
                "simulated write failure for {} at {:?}",
                key, scope
            )));
        }
        let mut rows = self.lock()?;
        match rows
            .iter_mut()
            .find(|(name, row)| name == key && row.scope == scope)
        {
            Some((_, row)) => row.value = value.to_string(),
            None => rows.push((
                key.to_string(),
                ScopedValue {
                    scope,
                    value: value.to_string(),
                },
            )),
        }
        Ok(())
    }

    async fn delete_by_name(&self, key: &str) -> Result<u64, SliderError> {
        let mut rows = self.lock()?;
        let before = rows.len();
        rows.retain(|(name, _)| name != key);
        Ok((before - rows.len()) as u64)
    }
}

/// Effective slider settings for a shop, with compiled defaults as last resort.
pub async fn load_settings(
    store: &dyn ConfigurationStore,
    group_id: Option<i32>,
    shop_id: Option<i32>,
) -> Result<SliderSettings, SliderError> {
    let speed = store.get(SettingKey::Speed.as_str(), group_id, shop_id).await?;
    let pause = store
        .get(SettingKey::PauseOnHover.as_str(), group_id, shop_id)
        .await?;
    let wrap = store.get(SettingKey::Wrap.as_str(), group_id, shop_id).await?;
    Ok(SliderSettings::from_values(
        speed.as_deref(),
        pause.as_deref(),
        wrap.as_deref(),
    ))
}

/// Outcome of a bulk settings write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsWriteReport {
    pub attempted: usize,
    pub failed: Vec<String>,
}

impl SettingsWriteReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Scopes written when saving settings from `context`: each covered shop,
/// each distinct group of those shops, and the global scope for all shops.
pub fn scopes_for_context(directory: &ShopDirectory, context: ShopContext) -> Vec<ConfigScope> {
    let shop_ids = directory.context_shop_ids(context);
    let mut scopes: Vec<ConfigScope> = shop_ids
        .iter()
        .filter_map(|shop_id| {
            directory.group_of(*shop_id).map(|group_id| ConfigScope::Shop {
                group_id,
                shop_id: *shop_id,
            })
        })
        .collect();
    scopes.extend(
        directory
            .groups_of(&shop_ids)
            .into_iter()
            .map(|group_id| ConfigScope::Group { group_id }),
    );
    if context == ShopContext::All {
        scopes.push(ConfigScope::Global);
    }
    scopes
}

/// Writes every setting at every scope of `context`.
///
/// All writes are attempted even after a failure; the report succeeds only
/// if each one did. Writes are not atomic, so a partial failure leaves the
/// scopes that succeeded updated.
pub async fn save_settings_for_context(
    store: &dyn ConfigurationStore,
    directory: &ShopDirectory,
    context: ShopContext,
    settings: &SliderSettings,
) -> SettingsWriteReport {
    let mut report = SettingsWriteReport::default();
    for scope in scopes_for_context(directory, context) {
        for key in SettingKey::ALL {
            report.attempted += 1;
            if let Err(e) = store.set(key.as_str(), &settings.value_of(key), scope).await {
                warn!(key = %key, scope = ?scope, error = %e, "Failed to write setting");
                report.failed.push(e.to_string());
            }
        }
    }
    report
}

/// Removes every slider setting at every scope.
pub async fn delete_settings(store: &dyn ConfigurationStore) -> Result<u64, SliderError> {
    let mut removed = 0;
    for key in SettingKey::ALL {
        removed += store.delete_by_name(key.as_str()).await?;
    }
    Ok(removed)
}
