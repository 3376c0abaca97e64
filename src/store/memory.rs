/// In-memory refresh token store.
///
/// Backs the test suite and local development without a Redis instance.
/// Entries expire lazily: a read past the deadline behaves exactly like a
/// missing key, matching the uniform not-found contract.
use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Duration;
use tokio::sync::Mutex;

use crate::error::Result;
use crate::store::RefreshTokenStore;

#[derive(Clone)]
struct Entry {
    subject: String,
    deadline: Instant,
}

#[derive(Default)]
pub struct InMemoryRefreshTokenStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryRefreshTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining lifetime of a live entry; test hook for TTL assertions.
    pub async fn remaining_ttl(&self, token: &str) -> Option<std::time::Duration> {
        let entries = self.entries.lock().await;
        let entry = entries.get(token)?;
        entry.deadline.checked_duration_since(Instant::now())
    }
}

#[async_trait]
impl RefreshTokenStore for InMemoryRefreshTokenStore {
    async fn put(&self, token: &str, subject: &str, ttl: Duration) -> Result<()> {
        let deadline = Instant::now()
            + ttl
                .to_std()
                .unwrap_or(std::time::Duration::from_secs(0));
        let mut entries = self.entries.lock().await;
        entries.insert(
            token.to_string(),
            Entry {
                subject: subject.to_string(),
                deadline,
            },
        );
        Ok(())
    }

    async fn get(&self, token: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.get(token) {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.subject.clone())),
            Some(_) => {
                entries.remove(token);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn take(&self, token: &str) -> Result<Option<String>> {
        let mut entries = self.entries.lock().await;
        match entries.remove(token) {
            Some(entry) if entry.deadline > Instant::now() => Ok(Some(entry.subject)),
            _ => Ok(None),
        }
    }

    async fn delete(&self, token: &str) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.remove(token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_get_delete_round_trip() {
        let store = InMemoryRefreshTokenStore::new();
        store.put("tok", "a@x.com", Duration::days(7)).await.unwrap();

        assert_eq!(store.get("tok").await.unwrap().as_deref(), Some("a@x.com"));

        store.delete("tok").await.unwrap();
        assert_eq!(store.get("tok").await.unwrap(), None);

        // Idempotent delete of an absent key.
        store.delete("tok").await.unwrap();
    }

    #[tokio::test]
    async fn take_is_single_use() {
        let store = InMemoryRefreshTokenStore::new();
        store.put("tok", "a@x.com", Duration::days(7)).await.unwrap();

        assert_eq!(store.take("tok").await.unwrap().as_deref(), Some("a@x.com"));
        assert_eq!(store.take("tok").await.unwrap(), None);
        assert_eq!(store.get("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn expired_entry_reads_as_missing() {
        let store = InMemoryRefreshTokenStore::new();
        store
            .put("tok", "a@x.com", Duration::milliseconds(0))
            .await
            .unwrap();

        assert_eq!(store.get("tok").await.unwrap(), None);
        assert_eq!(store.take("tok").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites_existing_entry() {
        let store = InMemoryRefreshTokenStore::new();
        store.put("tok", "a@x.com", Duration::days(7)).await.unwrap();
        store.put("tok", "b@x.com", Duration::days(7)).await.unwrap();

        assert_eq!(store.get("tok").await.unwrap().as_deref(), Some("b@x.com"));
    }
}
