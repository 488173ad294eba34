use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use crate::error::Result;
use crate::storage::KeyValueStore;

/// Redis-backed [`KeyValueStore`]. The `ConnectionManager` multiplexes and
/// reconnects internally, so each call clones the handle rather than holding
/// a connection across awaits.
#[derive(Clone)]
pub struct RedisKeyValueStore {
    redis: ConnectionManager,
}

impl RedisKeyValueStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl KeyValueStore for RedisKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.redis.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.redis.clone();
        let _: () = conn.set_ex(key, value, ttl_seconds).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let mut conn = self.redis.clone();
        let exists: bool = conn.exists(key).await?;
        Ok(exists)
    }

    async fn zadd(&self, key: &str, member: &str, score: i64) -> Result<()> {
        let mut conn = self.redis.clone();
        let _: i64 = conn.zadd(key, member, score).await?;
        Ok(())
    }

    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64> {
        let mut conn = self.redis.clone();
        let removed: u64 = conn.zrembyscore(key, min, max).await?;
        Ok(removed)
    }

    async fn zcard(&self, key: &str) -> Result<u64> {
        let mut conn = self.redis.clone();
        let count: u64 = conn.zcard(key).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool> {
        let mut conn = self.redis.clone();
        let set: bool = conn.expire(key, ttl_seconds).await?;
        Ok(set)
    }
}
