use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::{future::Cache, Expiry};

use super::{CacheError, CacheMirror};

#[derive(Clone)]
struct Entry {
    value: String,
    ttl: Option<Duration>,
}

struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        value.ttl
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        value.ttl
    }
}

/// In-process mirror for development and tests. Unbounded; entries only
/// leave through their own TTL.
#[derive(Clone)]
pub struct MemoryCacheMirror {
    inner: Cache<String, Entry>,
}

impl MemoryCacheMirror {
    pub fn new() -> Self {
        Self { inner: Cache::builder().expire_after(PerEntryTtl).build() }
    }
}

impl Default for MemoryCacheMirror {
    fn default() -> Self { Self::new() }
}

#[async_trait]
impl CacheMirror for MemoryCacheMirror {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), Entry { value: value.to_string(), ttl }).await;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).await.map(|e| e.value))
    }
}
