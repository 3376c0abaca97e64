/// Redis-backed refresh token store.
///
/// Keys carry their own TTL via SET EX, so expired entries are reclaimed by
/// Redis without any sweep task here. `take` uses GETDEL so that a
/// read-then-delete race on one key is serialized by Redis's command
/// processor.
use async_trait::async_trait;
use chrono::Duration;
use redis::aio::ConnectionManager;
use tokio::time::timeout;

use crate::error::{AuthError, Result};
use crate::store::RefreshTokenStore;

/// Per-command deadline; an unreachable Redis must fail the request, not
/// hang it.
const COMMAND_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(3);

const KEY_PREFIX: &str = "session:refresh:";

pub struct RedisRefreshTokenStore {
    redis: ConnectionManager,
}

impl RedisRefreshTokenStore {
    pub fn new(redis: ConnectionManager) -> Self {
        Self { redis }
    }

    fn key(token: &str) -> String {
        format!("{}{}", KEY_PREFIX, token)
    }

    async fn run<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> Result<T> {
        let mut redis = self.redis.clone();
        timeout(COMMAND_TIMEOUT, cmd.query_async::<_, T>(&mut redis))
            .await
            .map_err(|_| AuthError::StoreUnavailable("redis command timed out".to_string()))?
            .map_err(AuthError::from)
    }
}

#[async_trait]
impl RefreshTokenStore for RedisRefreshTokenStore {
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()> {
        let mut cmd = redis::cmd("SET");
        cmd.arg(Self::key(token))
            .arg(subject)
            .arg("EX")
            .arg(ttl.num_seconds().max(1));
        self.run::<()>(&cmd).await
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(Self::key(token));
        self.run::<Option<String>>(&cmd).await
    }

    async fn take(&self, token: &str) -> Result<Option<String>> {
        let mut cmd = redis::cmd("GETDEL");
        cmd.arg(Self::key(token));
        self.run::<Option<String>>(&cmd).await
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(Self::key(token));
        self.run::<()>(&cmd).await
    }
}
