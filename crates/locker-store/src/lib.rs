//! Locker Store - shared key-value store client
//!
//! This crate provides the storage seam for the lock service:
//! - `LockStore`: the async trait the lock engine talks to
//! - `RedisStore`: Redis backend drawing connections from a bounded pool
//! - `MemoryStore`: in-process backend for tests and single-node use
//! - `ConnectionPool`: bounded pool with idle eviction and ping-on-borrow

pub mod error;
pub mod memory;
pub mod pool;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use pool::{ConnectionPool, ManageConnection, PoolConfig, PoolStats, PooledConnection};
pub use self::redis::{RedisConnector, RedisStore};

/// Minimal key-value contract required by the lock protocol.
///
/// Every operation may fail with a [`StoreError`]. A missing key is never an
/// error: `get` returns `Ok(None)` and `delete` returns `Ok(0)`.
#[async_trait]
pub trait LockStore: Send + Sync {
    /// Atomically set `key` to `value` only if it does not exist yet.
    ///
    /// Returns `true` if the key was newly created. When `ttl` is given the
    /// key expires on its own after that duration.
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool>;

    /// Read the value stored at `key`.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Delete `key`, returning the number of keys removed (0 or 1).
    async fn delete(&self, key: &str) -> StoreResult<u64>;

    /// List keys matching a glob pattern such as `locker-*`.
    ///
    /// Ordering is whatever the backend enumerates in.
    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>>;

    /// Round-trip a no-op to verify the backend is reachable.
    async fn ping(&self) -> StoreResult<()>;
}

/// Match `key` against a glob pattern.
///
/// Supports `*` wildcards anywhere in the pattern; every other character
/// matches literally.
pub fn glob_match(pattern: &str, key: &str) -> bool {
    let mut parts = pattern.split('*');
    let Some(first) = parts.next() else {
        return key.is_empty();
    };
    let Some(mut rest) = key.strip_prefix(first) else {
        return false;
    };

    let remaining: Vec<&str> = parts.collect();
    let Some((last, middle)) = remaining.split_last() else {
        // No wildcard at all: exact match only
        return rest.is_empty();
    };

    for part in middle {
        match rest.find(part) {
            Some(idx) => rest = &rest[idx + part.len()..],
            None => return false,
        }
    }
    rest.ends_with(last)
}
