use async_trait::async_trait;
use dashmap::DashMap;

use super::backend::CacheBackend;
use crate::error::FeedResult;

/// In-process [`CacheBackend`] for tests and single-node embedding.
///
/// `DashMap::remove` returns the removed value, which gives `get_and_delete`
/// the per-key atomicity the passthrough contract requires.
#[derive(Debug, Default)]
pub struct InMemoryCacheBackend {
    entries: DashMap<String, String>,
}

impl InMemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl CacheBackend for InMemoryCacheBackend {
    async fn put(&self, key: &str, value: &str) -> FeedResult<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> FeedResult<Option<String>> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, key: &str) -> FeedResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn get_and_delete(&self, key: &str) -> FeedResult<Option<String>> {
        Ok(self.entries.remove(key).map(|(_, value)| value))
    }
}
