use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::{de::DeserializeOwned, Serialize};

use crate::{CacheStore, NullCache};

/// Deterministic cache key. The same value must be used to populate and to
/// invalidate an entry.
pub trait CacheKey {
    fn cache_key(&self) -> String;
}

/// Lookup-or-populate wrapper around a [`CacheStore`].
///
/// Cache failures are logged and swallowed: a broken cache degrades to
/// calling the loader, never to a failed request.
#[derive(Clone)]
pub struct ReadThrough {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ReadThrough {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    /// A wrapper that always calls the loader
    pub fn disabled() -> Self {
        Self::new(Arc::new(NullCache), Duration::ZERO)
    }

    pub fn backend(&self) -> &'static str {
        self.store.backend()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value for `key`, or run `load`, cache its output
    /// for the configured TTL, and return it. Loader errors are returned
    /// as-is and nothing is cached.
    pub async fn get_or_load<K, T, E, F, Fut>(&self, key: &K, load: F) -> Result<T, E>
    where
        K: CacheKey + ?Sized,
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let key = key.cache_key();

        match self.store.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    tracing::debug!(target: "bookshelf-cache", key = %key, "cache hit");
                    return Ok(value);
                }
                Err(e) => {
                    tracing::warn!(target: "bookshelf-cache", key = %key, error = %e, "discarding undecodable cache entry");
                }
            },
            Ok(None) => {
                tracing::debug!(target: "bookshelf-cache", key = %key, "cache miss");
            }
            Err(e) => {
                tracing::warn!(target: "bookshelf-cache", key = %key, error = %e, "cache lookup failed");
            }
        }

        let value = load().await?;

        match serde_json::to_string(&value) {
            Ok(raw) => match self.store.set_ex(&key, raw, self.ttl).await {
                Ok(()) => {
                    tracing::debug!(target: "bookshelf-cache", key = %key, ttl_secs = self.ttl.as_secs(), "cached");
                }
                Err(e) => {
                    tracing::warn!(target: "bookshelf-cache", key = %key, error = %e, "cache store failed");
                }
            },
            Err(e) => {
                tracing::warn!(target: "bookshelf-cache", key = %key, error = %e, "cache serialization failed");
            }
        }

        Ok(value)
    }

    /// Drop the entries for `keys`.
    pub async fn invalidate<K: CacheKey>(&self, keys: &[K]) {
        let keys: Vec<String> = keys.iter().map(CacheKey::cache_key).collect();

        match self.store.delete(&keys).await {
            Ok(()) => {
                tracing::debug!(target: "bookshelf-cache", keys = ?keys, "cache invalidated");
            }
            Err(e) => {
                tracing::warn!(target: "bookshelf-cache", keys = ?keys, error = %e, "cache invalidation failed");
            }
        }
    }

    /// Drop every entry whose key starts with `prefix`, for families of keys
    /// that cannot be listed up front.
    pub async fn invalidate_prefix(&self, prefix: &str) {
        match self.store.delete_prefix(prefix).await {
            Ok(()) => {
                tracing::debug!(target: "bookshelf-cache", prefix = %prefix, "cache namespace invalidated");
            }
            Err(e) => {
                tracing::warn!(target: "bookshelf-cache", prefix = %prefix, error = %e, "cache invalidation failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Key(&'static str);

    impl CacheKey for Key {
        fn cache_key(&self) -> String {
            format!("test:{}", self.0)
        }
    }

    fn memory() -> (MemoryCache, ReadThrough) {
        let cache = MemoryCache::new();
        let wrapper = ReadThrough::new(Arc::new(cache.clone()), Duration::from_secs(60));
        (cache, wrapper)
    }

    async fn load_counted(calls: &AtomicUsize, value: Vec<u32>) -> Result<Vec<u32>, String> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok(value)
    }

    #[tokio::test]
    async fn second_read_is_served_from_cache() {
        let (_, cache) = memory();
        let calls = AtomicUsize::new(0);

        let first = cache
            .get_or_load(&Key("a"), || load_counted(&calls, vec![1, 2]))
            .await
            .unwrap();
        let second = cache
            .get_or_load(&Key("a"), || load_counted(&calls, vec![9]))
            .await
            .unwrap();

        assert_eq!(first, vec![1, 2]);
        assert_eq!(second, vec![1, 2]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn invalidation_forces_reload() {
        let (_, cache) = memory();
        let calls = AtomicUsize::new(0);

        cache
            .get_or_load(&Key("a"), || load_counted(&calls, vec![1]))
            .await
            .unwrap();
        cache.invalidate(&[Key("a")]).await;
        let reloaded = cache
            .get_or_load(&Key("a"), || load_counted(&calls, vec![2]))
            .await
            .unwrap();

        assert_eq!(reloaded, vec![2]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn prefix_invalidation_forces_reload_of_the_family() {
        let (_, cache) = memory();
        let calls = AtomicUsize::new(0);

        for name in ["q:a", "q:b", "other"] {
            cache
                .get_or_load(&Key(name), || load_counted(&calls, vec![1]))
                .await
                .unwrap();
        }
        cache.invalidate_prefix("test:q:").await;
        for name in ["q:a", "q:b", "other"] {
            cache
                .get_or_load(&Key(name), || load_counted(&calls, vec![2]))
                .await
                .unwrap();
        }

        assert_eq!(calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn loader_error_is_not_cached() {
        let (store, cache) = memory();

        let result: Result<Vec<u32>, String> = cache
            .get_or_load(&Key("a"), || async { Err("boom".to_string()) })
            .await;

        assert_eq!(result.unwrap_err(), "boom");
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn undecodable_entry_is_a_miss() {
        let (store, cache) = memory();
        store
            .set_ex("test:a", "not json".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Vec<u32> = cache
            .get_or_load(&Key("a"), || async { Ok::<_, String>(vec![7]) })
            .await
            .unwrap();

        assert_eq!(value, vec![7]);
        assert_eq!(store.get("test:a").await.unwrap().as_deref(), Some("[7]"));
    }

    #[tokio::test]
    async fn disabled_cache_always_loads() {
        let cache = ReadThrough::disabled();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            cache
                .get_or_load(&Key("a"), || load_counted(&calls, vec![1]))
                .await
                .unwrap();
        }

        assert_eq!(cache.backend(), "none");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
