use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::User;

/// Subject lookup. The token core resolves token ownership through this and
/// nothing else.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;
}
