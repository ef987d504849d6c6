//! Lock protocol engine
//!
//! Implements acquire, release, inspect and enumerate on top of a shared
//! [`LockStore`]. The engine keeps no lock state of its own; mutual exclusion
//! comes entirely from the store's atomic set-if-absent and delete.

use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use locker_store::LockStore;
use metrics::counter;
use tracing::{debug, info, warn};

use crate::age::age_message;
use crate::codec::{self, decode_value, encode_value};
use crate::error::{LockError, LockResult};
use crate::model::{AcquireOutcome, EnumerateResult, InspectOutcome, LockEntry, ReleaseOutcome};

/// Marker value stored under the unlock guard key
const GUARD_MARKER: &str = "true";

/// Engine settings
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Lifetime of the unlock guard key if its explicit delete never happens
    pub unlock_guard_ttl: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            unlock_guard_ttl: Duration::from_secs(30),
        }
    }
}

/// Named-lock engine over an injected store handle.
#[derive(Clone)]
pub struct LockEngine {
    store: Arc<dyn LockStore>,
    config: EngineConfig,
}

fn record(operation: &'static str, outcome: &'static str) {
    counter!("locker_operations_total", "operation" => operation, "outcome" => outcome)
        .increment(1);
}

fn record_error(operation: &'static str, lock_name: &str, err: &LockError) {
    warn!(operation, lock_name = %lock_name, error = %err, "Lock operation failed");
    record(operation, "error");
}

impl LockEngine {
    pub fn new(store: Arc<dyn LockStore>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Try to take `lock_name` for `acting_user`.
    pub async fn acquire(&self, lock_name: &str, acting_user: &str) -> LockResult<AcquireOutcome> {
        let result = self.try_acquire(lock_name, acting_user).await;
        match &result {
            Ok(outcome) => record("acquire", outcome.label()),
            Err(e) => record_error("acquire", lock_name, e),
        }
        result
    }

    async fn try_acquire(&self, lock_name: &str, acting_user: &str) -> LockResult<AcquireOutcome> {
        let key = codec::to_key(lock_name);
        let name = codec::lock_name_from_key(&key).to_string();
        let value = encode_value(acting_user, &Local::now());

        if self.store.set_if_absent(&key, &value, None).await? {
            info!(lock_name = %name, owner = %acting_user, "Lock granted");
            return Ok(AcquireOutcome::Granted {
                lock_name: name,
                owner: acting_user.to_string(),
            });
        }

        let Some(current) = self.store.get(&key).await? else {
            return Err(LockError::Vanished(name));
        };
        let current = decode_value(&current);
        let age = age_message(&current.created_at);

        debug!(lock_name = %name, owner = %current.owner, "Lock already held");
        if current.owner == acting_user {
            Ok(AcquireOutcome::AlreadyHeldBySelf {
                lock_name: name,
                age,
            })
        } else {
            Ok(AcquireOutcome::AlreadyHeldByOther {
                lock_name: name,
                owner: current.owner,
                age,
            })
        }
    }

    /// Release `lock_name` on behalf of `acting_user`.
    ///
    /// Concurrent releases of the same name are serialized through a guard
    /// key. The guard is removed on every path once it has been taken.
    pub async fn release(&self, lock_name: &str, acting_user: &str) -> LockResult<ReleaseOutcome> {
        let result = self.try_release(lock_name, acting_user).await;
        match &result {
            Ok(outcome) => record("release", outcome.label()),
            Err(e) => record_error("release", lock_name, e),
        }
        result
    }

    async fn try_release(&self, lock_name: &str, acting_user: &str) -> LockResult<ReleaseOutcome> {
        let key = codec::to_key(lock_name);
        let name = codec::lock_name_from_key(&key).to_string();
        let guard_key = codec::guard_key(&key);

        let guarded = self
            .store
            .set_if_absent(&guard_key, GUARD_MARKER, Some(self.config.unlock_guard_ttl))
            .await?;
        if !guarded {
            debug!(lock_name = %name, "Release already in progress");
            return Ok(ReleaseOutcome::ConcurrentReleaseInProgress { lock_name: name });
        }

        let result = self.release_guarded(&key, name, acting_user).await;

        if let Err(e) = self.store.delete(&guard_key).await {
            // The guard TTL reclaims it eventually
            warn!(guard_key = %guard_key, error = %e, "Failed to delete unlock guard");
        }
        result
    }

    async fn release_guarded(
        &self,
        key: &str,
        lock_name: String,
        acting_user: &str,
    ) -> LockResult<ReleaseOutcome> {
        let Some(current) = self.store.get(key).await? else {
            return Ok(ReleaseOutcome::NotHeld { lock_name });
        };
        let current = decode_value(&current);

        if current.owner != acting_user {
            debug!(lock_name = %lock_name, owner = %current.owner, user = %acting_user, "Release refused");
            return Ok(ReleaseOutcome::Forbidden {
                lock_name,
                owner: current.owner,
            });
        }

        match self.store.delete(key).await? {
            0 => Ok(ReleaseOutcome::NotHeld { lock_name }),
            _ => {
                info!(lock_name = %lock_name, owner = %acting_user, "Lock released");
                Ok(ReleaseOutcome::Released { lock_name })
            }
        }
    }

    /// Report who holds `lock_name`, if anyone.
    pub async fn inspect(&self, lock_name: &str) -> LockResult<InspectOutcome> {
        let result = self.try_inspect(lock_name).await;
        match &result {
            Ok(outcome) => record("inspect", outcome.label()),
            Err(e) => record_error("inspect", lock_name, e),
        }
        result
    }

    async fn try_inspect(&self, lock_name: &str) -> LockResult<InspectOutcome> {
        let key = codec::to_key(lock_name);
        let name = codec::lock_name_from_key(&key).to_string();

        let Some(current) = self.store.get(&key).await? else {
            return Ok(InspectOutcome::NotHeld { lock_name: name });
        };
        let current = decode_value(&current);
        Ok(InspectOutcome::Held {
            lock_name: name,
            age: age_message(&current.created_at),
            owner: current.owner,
        })
    }

    /// List held locks, optionally only those whose owner matches
    /// `filter_user` case-insensitively. An empty filter lists everything.
    ///
    /// Any store error aborts the whole listing.
    pub async fn enumerate(&self, filter_user: &str) -> LockResult<EnumerateResult> {
        let result = self.try_enumerate(filter_user).await;
        match &result {
            Ok(_) => record("enumerate", "listed"),
            Err(e) => record_error("enumerate", "*", e),
        }
        result
    }

    async fn try_enumerate(&self, filter_user: &str) -> LockResult<EnumerateResult> {
        let filter = filter_user.to_lowercase();
        let keys = self.store.keys_matching(&codec::key_pattern()).await?;

        let mut entries = Vec::with_capacity(keys.len());
        for key in keys {
            // Released between listing and reading
            let Some(value) = self.store.get(&key).await? else {
                continue;
            };
            let current = decode_value(&value);
            if !filter.is_empty() && current.owner.to_lowercase() != filter {
                continue;
            }
            entries.push(LockEntry {
                lock_name: codec::lock_name_from_key(&key).to_string(),
                age: age_message(&current.created_at),
                owner: current.owner,
            });
        }

        debug!(count = entries.len(), filter = %filter, "Enumerated locks");
        Ok(EnumerateResult { entries })
    }
}
