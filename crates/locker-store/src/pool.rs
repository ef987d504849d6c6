//! Bounded connection pool with idle eviction and ping-on-borrow.
//!
//! `ConnectionPool<M>` asks its [`ManageConnection`] to open and check
//! connections. Every idle connection is verified before it is handed out
//! again, so callers never receive a connection that failed its liveness
//! check.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::debug;

use crate::error::{StoreError, StoreResult};

// ---------------------------------------------------------------------------
// PoolConfig
// ---------------------------------------------------------------------------

/// Configuration for connection pooling
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections, idle and checked out combined
    pub max_size: usize,
    /// Time after which an idle connection is dropped instead of reused
    pub idle_timeout: Duration,
    /// Timeout for acquiring a connection from the pool
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_size: 3,
            idle_timeout: Duration::from_secs(240),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Validate pool configuration, returning an error if invalid.
    pub fn validate(&self) -> StoreResult<()> {
        if self.max_size == 0 {
            return Err(StoreError::Configuration(
                "max_size must be greater than 0".to_string(),
            ));
        }
        if self.acquire_timeout.is_zero() {
            return Err(StoreError::Configuration(
                "acquire_timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ManageConnection
// ---------------------------------------------------------------------------

/// Opens and validates connections on behalf of a [`ConnectionPool`].
#[async_trait]
pub trait ManageConnection: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Open a fresh connection.
    async fn connect(&self) -> StoreResult<Self::Connection>;

    /// Verify an idle connection is still alive before reuse.
    async fn check(&self, conn: &mut Self::Connection) -> StoreResult<()>;
}

// ---------------------------------------------------------------------------
// Pool internals
// ---------------------------------------------------------------------------

struct IdleEntry<C> {
    conn: C,
    idle_since: Instant,
}

impl<C> IdleEntry<C> {
    fn is_expired(&self, idle_timeout: Duration) -> bool {
        self.idle_since.elapsed() > idle_timeout
    }
}

/// Pool statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Total successful checkouts.
    pub total_checkouts: u64,
    /// Connections ever opened.
    pub created: u64,
    /// Idle connections dropped after exceeding the idle timeout.
    pub evicted: u64,
    /// Idle connections dropped after failing the liveness check.
    pub broken: u64,
    /// Current number of idle connections.
    pub idle: usize,
}

struct PoolInner<M: ManageConnection> {
    manager: M,
    config: PoolConfig,
    idle: Mutex<VecDeque<IdleEntry<M::Connection>>>,
    stats: Mutex<PoolStats>,
    /// Limits total connections (idle + checked out).
    semaphore: Arc<Semaphore>,
}

// ---------------------------------------------------------------------------
// ConnectionPool<M>
// ---------------------------------------------------------------------------

/// Bounded connection pool.
pub struct ConnectionPool<M: ManageConnection> {
    inner: Arc<PoolInner<M>>,
}

impl<M: ManageConnection> Clone for ConnectionPool<M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<M: ManageConnection> std::fmt::Debug for ConnectionPool<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.inner.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<M: ManageConnection> ConnectionPool<M> {
    /// Create a new pool. No connection is opened until the first checkout.
    ///
    /// # Errors
    /// Returns error if `config` is invalid (e.g. max_size == 0).
    pub fn new(manager: M, config: PoolConfig) -> StoreResult<Self> {
        config.validate()?;
        let max = config.max_size;
        Ok(Self {
            inner: Arc::new(PoolInner {
                manager,
                config,
                idle: Mutex::new(VecDeque::with_capacity(max)),
                stats: Mutex::new(PoolStats::default()),
                semaphore: Arc::new(Semaphore::new(max)),
            }),
        })
    }

    /// Check out a live connection.
    ///
    /// Reuses the oldest idle connection that is neither idle-expired nor
    /// failing its liveness check, otherwise opens a new one. The returned
    /// guard gives the connection back when dropped.
    pub async fn get(&self) -> StoreResult<PooledConnection<M>> {
        let inner = &self.inner;
        let timeout = inner.config.acquire_timeout;

        let permit = tokio::time::timeout(timeout, inner.semaphore.clone().acquire_owned())
            .await
            .map_err(|_| StoreError::PoolTimeout(timeout.as_millis()))?
            .map_err(|_| StoreError::PoolClosed)?;

        let conn = loop {
            let entry = { inner.idle.lock().pop_front() };
            match entry {
                Some(entry) if entry.is_expired(inner.config.idle_timeout) => {
                    inner.stats.lock().evicted += 1;
                    debug!("Dropping idle-expired store connection");
                }
                Some(mut entry) => match inner.manager.check(&mut entry.conn).await {
                    Ok(()) => break entry.conn,
                    Err(e) => {
                        inner.stats.lock().broken += 1;
                        debug!(error = %e, "Dropping store connection that failed liveness check");
                    }
                },
                None => {
                    let conn = inner.manager.connect().await?;
                    inner.stats.lock().created += 1;
                    break conn;
                }
            }
        };

        inner.stats.lock().total_checkouts += 1;

        Ok(PooledConnection {
            conn: Some(conn),
            pool: Arc::clone(inner),
            _permit: permit,
        })
    }

    /// Get current pool statistics.
    #[must_use]
    pub fn stats(&self) -> PoolStats {
        let mut stats = self.inner.stats.lock().clone();
        stats.idle = self.inner.idle.lock().len();
        stats
    }

    /// Evict idle connections that exceeded the idle timeout.
    ///
    /// Returns the number of connections dropped.
    pub fn maintain(&self) -> usize {
        let inner = &self.inner;
        let idle_timeout = inner.config.idle_timeout;
        let removed = {
            let mut idle = inner.idle.lock();
            let before = idle.len();
            idle.retain(|entry| !entry.is_expired(idle_timeout));
            before - idle.len()
        };
        if removed > 0 {
            inner.stats.lock().evicted += removed as u64;
            debug!(count = removed, "Evicted idle store connections");
        }
        removed
    }

    /// Close the pool: drop idle connections and refuse further checkouts.
    pub fn close(&self) {
        self.inner.semaphore.close();
        self.inner.idle.lock().clear();
    }
}

// ---------------------------------------------------------------------------
// PooledConnection
// ---------------------------------------------------------------------------

/// RAII guard over a checked-out connection.
pub struct PooledConnection<M: ManageConnection> {
    conn: Option<M::Connection>,
    pool: Arc<PoolInner<M>>,
    _permit: OwnedSemaphorePermit,
}

impl<M: ManageConnection> PooledConnection<M> {
    /// Discard the connection instead of returning it to the pool.
    pub fn detach(mut self) -> M::Connection {
        self.conn.take().expect("pooled connection already taken")
    }
}

impl<M: ManageConnection> std::ops::Deref for PooledConnection<M> {
    type Target = M::Connection;

    fn deref(&self) -> &Self::Target {
        self.conn.as_ref().expect("pooled connection already taken")
    }
}

impl<M: ManageConnection> std::ops::DerefMut for PooledConnection<M> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.conn.as_mut().expect("pooled connection already taken")
    }
}

impl<M: ManageConnection> Drop for PooledConnection<M> {
    fn drop(&mut self) {
        // The permit is released after this body runs, so the idle queue
        // never holds more than max_size entries.
        if let Some(conn) = self.conn.take()
            && !self.pool.semaphore.is_closed()
        {
            self.pool.idle.lock().push_back(IdleEntry {
                conn,
                idle_since: Instant::now(),
            });
        }
    }
}
