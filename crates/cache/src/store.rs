use std::time::Duration;

use async_trait::async_trait;

use crate::CacheResult;

/// String-keyed store holding JSON text with a per-entry expiry.
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short backend name for logs
    fn backend(&self) -> &'static str;

    async fn get(&self, key: &str) -> CacheResult<Option<String>>;

    async fn set_ex(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()>;

    /// Remove every listed key; missing keys are ignored.
    async fn delete(&self, keys: &[String]) -> CacheResult<()>;

    /// Remove every key starting with `prefix`.
    async fn delete_prefix(&self, prefix: &str) -> CacheResult<()>;
}
