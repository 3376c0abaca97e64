/// Refresh token store.
///
/// A TTL-capable key-value map from an issued refresh token to the subject
/// it was issued for. A refresh token is live iff its key is present; entry
/// expiry is owned by the store, so a vanished key is indistinguishable from
/// one that never existed.
pub mod memory;
pub mod redis;

use async_trait::async_trait;
use chrono::Duration;

use crate::error::Result;

pub use self::memory::InMemoryRefreshTokenStore;
pub use self::redis::RedisRefreshTokenStore;

#[async_trait]
pub trait RefreshTokenStore: Send + Sync {
    /// Create or overwrite the mapping; the entry disappears after `ttl`.
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()>;

    /// `None` uniformly covers never-existed, deleted and expired.
    async fn get(&self, token: &str) -> Result<Option<String>>;

    /// Atomically read and delete in one step. Under two concurrent calls
    /// for the same token at most one observes the entry, which is what
    /// makes refresh single-use.
    async fn take(&self, token: &str) -> Result<Option<String>>;

    /// Idempotent; deleting an absent token is not an error.
    async fn delete(&self, token: &str) -> Result<()>;
}
