//! Cache Mirror: a best-effort key-value replica of denormalized snapshots.
//!
//! Nothing read from here is authoritative; a missing key never means the
//! entity does not exist.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;

pub use memory::MemoryCacheMirror;
pub use self::redis::RedisCacheMirror;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache pool error: {0}")]
    Pool(String),
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cache payload error: {0}")]
    Payload(String),
}

#[async_trait]
pub trait CacheMirror: Send + Sync {
    /// Upsert `value`; `ttl = None` keeps the entry until overwritten.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError>;

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
}

pub fn domain_key(id: i32) -> String {
    format!("domain:{}", id)
}

pub fn user_key(id: i32) -> String {
    format!("user:{}", id)
}

pub async fn save_json<T: Serialize + Sync>(
    cache: &dyn CacheMirror,
    key: &str,
    value: &T,
    ttl: Option<Duration>,
) -> Result<String, CacheError> {
    let body = serde_json::to_string(value).map_err(|e| CacheError::Payload(e.to_string()))?;
    cache.set(key, &body, ttl).await?;
    Ok(body)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

/// Read a key holding either a JSON array or a single object.
pub async fn load_many<T: DeserializeOwned>(cache: &dyn CacheMirror, key: &str) -> Result<Option<Vec<T>>, CacheError> {
    let Some(raw) = cache.get(key).await? else {
        return Ok(None);
    };
    let parsed: OneOrMany<T> = serde_json::from_str(&raw)
        .map_err(|e| CacheError::Payload(format!("{}: {}", key, e)))?;
    Ok(Some(match parsed {
        OneOrMany::Many(items) => items,
        OneOrMany::One(item) => vec![item],
    }))
}
