use async_trait::async_trait;

use crate::error::Result;

/// Key-value store operations used by the blacklist and the rate limiter:
/// plain keys with TTL plus the ordered-set primitives backing sliding
/// windows. Scores are Unix timestamps in seconds.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Set `key` to `value` with an expiration. `ttl_seconds` must be > 0.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    async fn exists(&self, key: &str) -> Result<bool>;

    /// Add `member` to the ordered set at `key` with the given score,
    /// overwriting the score if the member already exists.
    async fn zadd(&self, key: &str, member: &str, score: i64) -> Result<()>;

    /// Remove every member whose score falls within `[min, max]`. Returns the
    /// number of members removed.
    async fn zrem_range_by_score(&self, key: &str, min: i64, max: i64) -> Result<u64>;

    async fn zcard(&self, key: &str) -> Result<u64>;

    /// Refresh the TTL of an existing key. Returns false if the key does not
    /// exist.
    async fn expire(&self, key: &str, ttl_seconds: i64) -> Result<bool>;
}
