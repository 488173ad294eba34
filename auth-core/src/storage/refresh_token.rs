use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::Result;
use crate::models::RefreshToken;

/// Durable store for refresh-token rows.
///
/// Lookups are by the opaque token value; rows are only ever mutated to set
/// the revocation flag, and only a sweep deletes them.
#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    async fn create(&self, token: &RefreshToken) -> Result<()>;

    /// Returns the row regardless of revocation or expiry state; callers
    /// decide what the state means.
    async fn find_by_token(&self, token: &str) -> Result<Option<RefreshToken>>;

    async fn find_by_user(&self, user_id: Uuid) -> Result<Vec<RefreshToken>>;

    /// Mark the row revoked. A no-op when the token is unknown or already
    /// revoked; revocation is never undone.
    async fn revoke(&self, token: &str, now: DateTime<Utc>) -> Result<()>;

    /// Revoke every non-revoked token belonging to `user_id`. Returns the
    /// number of rows affected.
    async fn revoke_all_for_user(&self, user_id: Uuid, now: DateTime<Utc>) -> Result<u64>;

    /// Delete rows past their expiry. Grace cleanup for a periodic sweep, not
    /// correctness-critical. Returns the number of rows deleted.
    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}
