use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::{redis::AsyncCommands, Pool};
use tracing::{debug, info};

use super::{CacheError, CacheMirror};

/// Redis-backed mirror on a `deadpool-redis` pool.
#[derive(Clone)]
pub struct RedisCacheMirror {
    pool: Pool,
}

impl RedisCacheMirror {
    pub fn new(pool: Pool) -> Self { Self { pool } }

    pub fn from_config(cfg: &configs::RedisConfig) -> Result<Self, CacheError> {
        let mut redis_config = deadpool_redis::Config::from_url(&cfg.url);
        let timeout = Duration::from_millis(cfg.timeout_ms);
        let mut pool_config = deadpool_redis::PoolConfig::new(cfg.pool_size);
        pool_config.timeouts.wait = Some(timeout);
        pool_config.timeouts.create = Some(timeout);
        pool_config.timeouts.recycle = Some(timeout);
        redis_config.pool = Some(pool_config);

        let pool = redis_config
            .create_pool(Some(deadpool_redis::Runtime::Tokio1))
            .map_err(|e| CacheError::Pool(e.to_string()))?;
        Ok(Self { pool })
    }

    /// Round-trip a connection; used at startup to fail fast.
    pub async fn ping(&self) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await.map_err(|e| CacheError::Pool(e.to_string()))?;
        let _: String = deadpool_redis::redis::cmd("PING")
            .query_async(&mut *conn)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        info!("redis reachable");
        Ok(())
    }
}

#[async_trait]
impl CacheMirror for RedisCacheMirror {
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> Result<(), CacheError> {
        let mut conn = self.pool.get().await.map_err(|e| CacheError::Pool(e.to_string()))?;
        match ttl {
            Some(ttl) => conn
                .set_ex::<_, _, ()>(key, value, ttl.as_secs().max(1))
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?,
            None => conn
                .set::<_, _, ()>(key, value)
                .await
                .map_err(|e| CacheError::Backend(e.to_string()))?,
        }
        debug!(key = %key, "cache set");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.pool.get().await.map_err(|e| CacheError::Pool(e.to_string()))?;
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}
