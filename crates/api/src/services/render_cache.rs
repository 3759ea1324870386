//! Process-wide cache of rendered widget fragments.
//!
//! Entries are keyed by hook name and the shop/language/currency context the
//! fragment was rendered for. Any mutation of slides or settings clears the
//! whole cache.
//!
//! Entries are stored under the cache generation current when their render
//! started. Invalidation bumps the generation, so a render that overlaps a
//! mutation lands under a stale generation and is never served.

use metrics::{counter, gauge};
use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Key for render cache entries
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct RenderKey {
    pub hook_name: String,
    pub shop_id: i32,
    pub language_id: i32,
    pub currency_id: i32,
}

impl RenderKey {
    pub fn new(hook_name: &str, shop_id: i32, language_id: i32, currency_id: i32) -> Self {
        Self {
            hook_name: hook_name.to_string(),
            shop_id,
            language_id,
            currency_id,
        }
    }
}

/// Thread-safe cache of rendered HTML using moka.
pub struct RenderCache {
    cache: Cache<(u64, RenderKey), Arc<str>>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl RenderCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();

        Self {
            cache,
            generation: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// Get a cached fragment if present
    pub async fn get(&self, key: &RenderKey) -> Option<Arc<str>> {
        self.lookup(self.current_generation(), key).await
    }

    async fn lookup(&self, generation: u64, key: &RenderKey) -> Option<Arc<str>> {
        let result = self.cache.get(&(generation, key.clone())).await;

        if result.is_some() {
            self.hits.fetch_add(1, Ordering::Relaxed);
            counter!("slider_render_cache_hits_total").increment(1);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            counter!("slider_render_cache_misses_total").increment(1);
        }

        result
    }

    pub async fn insert(&self, key: RenderKey, html: Arc<str>) {
        self.cache.insert((self.current_generation(), key), html).await;
    }

    /// Returns the cached fragment, rendering and caching it on a miss.
    /// Failed renders are not cached.
    pub async fn get_or_try_insert_with<F, Fut, E>(
        &self,
        key: RenderKey,
        render: F,
    ) -> Result<Arc<str>, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<String, E>>,
    {
        let generation = self.current_generation();
        if let Some(cached) = self.lookup(generation, &key).await {
            return Ok(cached);
        }

        let html: Arc<str> = Arc::from(render().await?);
        self.cache.insert((generation, key), html.clone()).await;
        Ok(html)
    }

    /// Drops every cached fragment.
    pub async fn invalidate_all(&self) {
        self.generation.fetch_add(1, Ordering::AcqRel);
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        counter!("slider_render_cache_invalidations_total").increment(1);
        tracing::debug!("Render cache cleared");
    }

    /// Publishes the current entry count as a gauge.
    pub fn record_size(&self) {
        gauge!("slider_render_cache_entries").set(self.cache.entry_count() as f64);
    }

    pub fn stats(&self) -> RenderCacheStats {
        RenderCacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.cache.entry_count(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entry_count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    fn cache() -> RenderCache {
        RenderCache::new(100, Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_get_or_try_insert_renders_once() {
        let cache = cache();
        let renders = AtomicUsize::new(0);
        let key = RenderKey::new("displayHome", 1, 1, 1);

        for _ in 0..3 {
            let html = cache
                .get_or_try_insert_with(key.clone(), || async {
                    renders.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, std::convert::Infallible>("<div>slider</div>".to_string())
                })
                .await
                .unwrap();
            assert_eq!(&*html, "<div>slider</div>");
        }

        assert_eq!(renders.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.hits, 2);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_keys_are_context_specific() {
        let cache = cache();
        cache
            .insert(RenderKey::new("displayHome", 1, 1, 1), Arc::from("en"))
            .await;

        assert!(cache.get(&RenderKey::new("displayHome", 1, 2, 1)).await.is_none());
        assert!(cache.get(&RenderKey::new("displayHome", 2, 1, 1)).await.is_none());
        assert!(cache.get(&RenderKey::new("displayHome", 1, 1, 2)).await.is_none());
        assert!(cache.get(&RenderKey::new("displayHeader", 1, 1, 1)).await.is_none());
        assert!(cache.get(&RenderKey::new("displayHome", 1, 1, 1)).await.is_some());
    }

    #[tokio::test]
    async fn test_failed_render_is_not_cached() {
        let cache = cache();
        let key = RenderKey::new("displayHome", 1, 1, 1);

        let result = cache
            .get_or_try_insert_with(key.clone(), || async { Err::<String, _>("db down") })
            .await;
        assert_eq!(result.unwrap_err(), "db down");
        assert!(cache.get(&key).await.is_none());
    }

    #[tokio::test]
    async fn test_render_overlapping_invalidation_is_not_served() {
        let cache = cache();
        let key = RenderKey::new("displayHome", 1, 1, 1);

        let html = cache
            .get_or_try_insert_with(key.clone(), || async {
                // A slide is saved while the old model is being rendered
                cache.invalidate_all().await;
                Ok::<_, std::convert::Infallible>("<old slides>".to_string())
            })
            .await
            .unwrap();
        assert_eq!(&*html, "<old slides>");
        assert!(cache.get(&key).await.is_none());

        let fresh = cache
            .get_or_try_insert_with(key.clone(), || async {
                Ok::<_, std::convert::Infallible>("<new slides>".to_string())
            })
            .await
            .unwrap();
        assert_eq!(&*fresh, "<new slides>");
        assert_eq!(cache.get(&key).await.as_deref(), Some("<new slides>"));
    }

    #[tokio::test]
    async fn test_invalidate_all() {
        let cache = cache();
        for shop_id in 1..=3 {
            cache
                .insert(RenderKey::new("displayHome", shop_id, 1, 1), Arc::from("x"))
                .await;
        }

        cache.invalidate_all().await;

        for shop_id in 1..=3 {
            assert!(cache
                .get(&RenderKey::new("displayHome", shop_id, 1, 1))
                .await
                .is_none());
        }
        assert_eq!(cache.stats().entry_count, 0);
    }
}
