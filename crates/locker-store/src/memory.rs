// In-memory LockStore backed by DashMap
// Set-if-absent is atomic per key through the map's entry API

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::error::StoreResult;
use crate::{LockStore, glob_match};

struct StoredValue {
    value: String,
    expires_at: Option<Instant>,
}

impl StoredValue {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// In-memory store for tests and single-node deployments
#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<DashMap<String, StoredValue>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (non-expired) keys
    pub fn len(&self) -> usize {
        self.entries.iter().filter(|e| !e.value().is_expired()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Store `value` unconditionally, replacing anything at `key`
    pub fn insert(&self, key: &str, value: &str) {
        self.entries.insert(
            key.to_string(),
            StoredValue {
                value: value.to_string(),
                expires_at: None,
            },
        );
    }
}

#[async_trait]
impl LockStore for MemoryStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        let stored = StoredValue {
            value: value.to_string(),
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        };

        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) if occupied.get().is_expired() => {
                occupied.insert(stored);
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(vacant) => {
                vacant.insert(stored);
                Ok(true)
            }
        }
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone()))
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        match self.entries.remove(key) {
            Some((_, stored)) if !stored.is_expired() => Ok(1),
            _ => Ok(0),
        }
    }

    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .entries
            .iter()
            .filter(|entry| !entry.value().is_expired() && glob_match(pattern, entry.key()))
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}
