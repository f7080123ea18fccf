//! Preference resolution: local cache first, then the store
//!
//! Resolution never fails. Store errors, timeouts and corrupt cache values all
//! degrade to `None`, which the overrider treats as "leave the request alone".
//!
//! Session storage can outlive an engine, so a cached entry is only binding
//! once the store has confirmed the key during this session. Until then a
//! cache hit is used only when the store cannot be reached.

use dashmap::DashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::cache::{CacheEntry, LocalCache};
use crate::config::EngineConfig;
use crate::error::{PrefError, PrefResult};
use crate::mode::{CanonicalMode, ModeNormalizer};
use crate::store::PreferenceStore;
use crate::types::{Preference, PreferenceKey};

/// Where a resolved mode came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    Cache,
    Store,
    /// Newest preference for the model under a different action
    ModelFallback,
}

/// A resolved preference with its provenance
#[derive(Debug, Clone, PartialEq)]
pub struct Resolution {
    pub mode: CanonicalMode,
    pub source: ResolutionSource,
    pub preference: Preference,
}

/// Run a store call with an upper bound on its duration
pub(crate) async fn bounded<T, F>(operation: &str, limit: Duration, call: F) -> PrefResult<T>
where
    F: Future<Output = PrefResult<T>>,
{
    match tokio::time::timeout(limit, call).await {
        Ok(result) => result,
        Err(_) => Err(PrefError::timeout(operation, limit.as_millis() as u64)),
    }
}

/// Looks up the last used mode for an entry point
pub struct Resolver {
    cache: Arc<LocalCache>,
    store: Arc<dyn PreferenceStore>,
    normalizer: ModeNormalizer,
    store_timeout: Duration,
    model_fallback: bool,
    /// Keys checked against the store in this session
    verified: DashSet<PreferenceKey>,
}

impl Resolver {
    pub fn new(
        cache: Arc<LocalCache>,
        store: Arc<dyn PreferenceStore>,
        normalizer: ModeNormalizer,
        config: &EngineConfig,
    ) -> Self {
        Self {
            cache,
            store,
            normalizer,
            store_timeout: config.store_timeout(),
            model_fallback: config.model_fallback,
            verified: DashSet::new(),
        }
    }

    /// Canonical mode last used at `key`, if any
    pub async fn resolve(&self, key: &PreferenceKey) -> Option<CanonicalMode> {
        self.lookup(key).await.map(|resolution| resolution.mode)
    }

    /// Cache-only resolution; never suspends
    pub fn resolve_cached(&self, key: &PreferenceKey) -> Option<Resolution> {
        let entry = self.cache.get(key)?;
        let preference = entry.to_preference(key.user_id.clone(), &self.normalizer);
        Some(Resolution {
            mode: preference.mode.clone(),
            source: ResolutionSource::Cache,
            preference,
        })
    }

    /// Full resolution with provenance
    pub async fn lookup(&self, key: &PreferenceKey) -> Option<Resolution> {
        let cached = self.resolve_cached(key);
        if cached.is_some() && self.verified.contains(key) {
            return cached;
        }

        match self.fetch(key).await {
            Ok(Some((mut preference, source))) => {
                preference.mode = self.normalizer.normalize(preference.mode.as_str());
                if source == ResolutionSource::ModelFallback {
                    preference.action_id = key.action_id.clone();
                }
                if cached.as_ref().is_some_and(|c| c.mode != preference.mode) {
                    info!("Replacing stale cached mode for {} with '{}'", key, preference.mode);
                }
                self.remember(key, &preference);
                debug!("Resolved {} to '{}' from {:?}", key, preference.mode, source);
                Some(Resolution {
                    mode: preference.mode.clone(),
                    source,
                    preference,
                })
            }
            Ok(None) => {
                self.verified.insert(key.clone());
                if cached.is_some() {
                    debug!("Dropping cached preference for {}: not in the store", key);
                    self.cache.remove(key);
                } else {
                    debug!("No stored preference for {}", key);
                }
                None
            }
            Err(e) if cached.is_some() => {
                warn!("Preference lookup for {} failed, using cached value: {}", key, e);
                cached
            }
            Err(e) => {
                warn!("Preference lookup for {} failed, using defaults: {}", key, e);
                None
            }
        }
    }

    /// Cache `preference` under `key` as confirmed by the store
    pub fn remember(&self, key: &PreferenceKey, preference: &Preference) {
        self.cache.put(key, &CacheEntry::from_preference(preference));
        self.verified.insert(key.clone());
    }

    pub fn normalizer(&self) -> &ModeNormalizer {
        &self.normalizer
    }

    async fn fetch(
        &self,
        key: &PreferenceKey,
    ) -> PrefResult<Option<(Preference, ResolutionSource)>> {
        let found = bounded("preference lookup", self.store_timeout, self.store.get(key)).await?;
        if let Some(preference) = found {
            return Ok(Some((preference, ResolutionSource::Store)));
        }

        if !self.model_fallback {
            return Ok(None);
        }
        let latest = bounded(
            "model preference lookup",
            self.store_timeout,
            self.store.latest_for_model(&key.user_id, &key.model),
        )
        .await?;
        Ok(latest.map(|p| (p, ResolutionSource::ModelFallback)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySessionStorage;
    use crate::mode::normalize;
    use crate::store::MockPreferenceStore;

    fn lead_key() -> PreferenceKey {
        PreferenceKey::new("7", "crm.lead", Some("42"))
    }

    fn resolver_with(store: MockPreferenceStore, config: EngineConfig) -> (Resolver, Arc<LocalCache>) {
        let cache = Arc::new(LocalCache::new(
            Arc::new(MemorySessionStorage::new()),
            "view_pref",
        ));
        let resolver = Resolver::new(
            cache.clone(),
            Arc::new(store),
            ModeNormalizer::default(),
            &config,
        );
        (resolver, cache)
    }

    #[tokio::test]
    async fn test_store_hit_is_normalized_and_cached() {
        let mut store = MockPreferenceStore::new();
        store.expect_get().times(1).returning(|key| {
            Ok(Some(Preference::new(
                key.clone(),
                CanonicalMode::from_canonical("tree"),
            )))
        });
        let (resolver, cache) = resolver_with(store, EngineConfig::default());
        let key = lead_key();

        let first = resolver.lookup(&key).await.unwrap();
        assert_eq!(first.mode, "list");
        assert_eq!(first.source, ResolutionSource::Store);
        assert_eq!(cache.get(&key).unwrap().view_type, "list");

        // Second lookup is served by the cache; the mock allows one call only
        let second = resolver.lookup(&key).await.unwrap();
        assert_eq!(second.source, ResolutionSource::Cache);
        assert_eq!(second.mode, "list");
    }

    #[tokio::test]
    async fn test_store_miss_is_none() {
        let mut store = MockPreferenceStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_latest_for_model().never();
        let (resolver, cache) = resolver_with(store, EngineConfig::default());

        assert!(resolver.resolve(&lead_key()).await.is_none());
        assert!(cache.get(&lead_key()).is_none());
    }

    #[tokio::test]
    async fn test_store_error_degrades_to_none() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_get()
            .returning(|_| Err(PrefError::store_unavailable("connection refused")));
        let (resolver, _cache) = resolver_with(store, EngineConfig::default());

        assert!(resolver.resolve(&lead_key()).await.is_none());
    }

    #[tokio::test]
    async fn test_model_fallback() {
        let mut store = MockPreferenceStore::new();
        store.expect_get().returning(|_| Ok(None));
        store.expect_latest_for_model().times(1).returning(|user, model| {
            Ok(Some(Preference::new(
                PreferenceKey::new(user.clone(), model, Some("99")),
                normalize("kanban"),
            )))
        });
        let config = EngineConfig {
            model_fallback: true,
            ..Default::default()
        };
        let (resolver, cache) = resolver_with(store, config);
        let key = lead_key();

        let resolution = resolver.lookup(&key).await.unwrap();
        assert_eq!(resolution.mode, "kanban");
        assert_eq!(resolution.source, ResolutionSource::ModelFallback);
        // Back-filled under the requested triple, not the fallback's action
        assert_eq!(cache.get(&key).unwrap().action_id.as_deref(), Some("42"));
    }

    fn seed(cache: &LocalCache, key: &PreferenceKey, mode: &str) {
        let preference = Preference::new(key.clone(), normalize(mode));
        cache.put(key, &CacheEntry::from_preference(&preference));
    }

    #[tokio::test]
    async fn test_unconfirmed_cache_entry_is_checked_once() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_get()
            .times(1)
            .returning(|key| Ok(Some(Preference::new(key.clone(), normalize("list")))));
        let (resolver, cache) = resolver_with(store, EngineConfig::default());
        let key = lead_key();
        seed(&cache, &key, "kanban");

        let first = resolver.lookup(&key).await.unwrap();
        assert_eq!(first.mode, "list");
        assert_eq!(first.source, ResolutionSource::Store);
        assert_eq!(cache.get(&key).unwrap().view_type, "list");

        let second = resolver.lookup(&key).await.unwrap();
        assert_eq!(second.mode, "list");
        assert_eq!(second.source, ResolutionSource::Cache);
    }

    #[tokio::test]
    async fn test_unconfirmed_cache_entry_serves_while_store_is_down() {
        let mut store = MockPreferenceStore::new();
        store
            .expect_get()
            .times(2)
            .returning(|_| Err(PrefError::store_unavailable("connection refused")));
        let (resolver, cache) = resolver_with(store, EngineConfig::default());
        let key = lead_key();
        seed(&cache, &key, "kanban");

        for _ in 0..2 {
            let resolution = resolver.lookup(&key).await.unwrap();
            assert_eq!(resolution.mode, "kanban");
            assert_eq!(resolution.source, ResolutionSource::Cache);
        }
    }

    #[tokio::test]
    async fn test_cache_entry_unknown_to_store_is_dropped() {
        let mut store = MockPreferenceStore::new();
        store.expect_get().times(1).returning(|_| Ok(None));
        let (resolver, cache) = resolver_with(store, EngineConfig::default());
        let key = lead_key();
        seed(&cache, &key, "kanban");

        assert!(resolver.lookup(&key).await.is_none());
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn test_remembered_preference_skips_store() {
        let mut store = MockPreferenceStore::new();
        store.expect_get().never();
        let (resolver, _cache) = resolver_with(store, EngineConfig::default());
        let key = lead_key();

        resolver.remember(&key, &Preference::new(key.clone(), normalize("graph")));
        assert_eq!(resolver.resolve(&key).await.unwrap(), "graph");
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: PrefResult<()> = bounded("slow call", Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(PrefError::Timeout { millis: 10, .. })));
    }
}
