//! Response caching for read handlers.
//!
//! [`CacheStore`] is the key-value seam with three implementations:
//! - [`MemoryCache`] - in-process DashMap with per-entry expiry
//! - [`RedisCache`] - shared Redis via `ConnectionManager`
//! - [`NullCache`] - always misses, used when caching is disabled
//!
//! Handlers never talk to a store directly; they go through [`ReadThrough`],
//! which takes a [`CacheKey`] for both population and invalidation. Families
//! of keys sharing a prefix (search results) are dropped with
//! [`ReadThrough::invalidate_prefix`].

mod error;
mod memory;
mod null_cache;
mod read_through;
mod redis_cache;
mod store;

use std::sync::Arc;
use std::time::Duration;

use bookshelf_kernel::settings::{CacheBackend, CacheSettings};

pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;
pub use null_cache::NullCache;
pub use read_through::{CacheKey, ReadThrough};
pub use redis_cache::RedisCache;
pub use store::CacheStore;

/// Build the configured cache. An unreachable Redis degrades to [`NullCache`]
/// so the service still starts.
pub async fn build(settings: &CacheSettings) -> ReadThrough {
    let ttl = Duration::from_secs(settings.ttl_secs);

    let store: Arc<dyn CacheStore> = match settings.backend {
        CacheBackend::None => Arc::new(NullCache),
        CacheBackend::Memory => Arc::new(MemoryCache::new()),
        CacheBackend::Redis => match RedisCache::connect(&settings.redis_url).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                tracing::warn!(
                    target: "bookshelf-cache",
                    error = %e,
                    "redis unavailable, response caching disabled"
                );
                Arc::new(NullCache)
            }
        },
    };

    tracing::info!(
        target: "bookshelf-cache",
        backend = store.backend(),
        ttl_secs = settings.ttl_secs,
        "response cache ready"
    );

    ReadThrough::new(store, ttl)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn build_selects_backend() {
        let mut settings = CacheSettings::default();
        assert_eq!(build(&settings).await.backend(), "none");

        settings.backend = CacheBackend::Memory;
        assert_eq!(build(&settings).await.backend(), "memory");
    }

    #[tokio::test]
    async fn unreachable_redis_falls_back_to_null() {
        let settings = CacheSettings {
            backend: CacheBackend::Redis,
            ttl_secs: 60,
            redis_url: "not a redis url".to_string(),
        };

        assert_eq!(build(&settings).await.backend(), "none");
    }
}
