//! Redis-backed LockStore implementation
//!
//! Connections come from a [`ConnectionPool`] of multiplexed Redis
//! connections. Each idle connection is pinged before reuse, and a
//! connection that hits a connectivity error mid-command is dropped
//! rather than returned to the pool.
//!
//! ## Usage
//! ```rust,no_run
//! use locker_store::{LockStore, PoolConfig, RedisStore};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let store = RedisStore::open("redis://:secret@localhost:6379", PoolConfig::default())?;
//! let created = store.set_if_absent("locker-deploy", "alice--01 Jan 25 10:00 +0000", None).await?;
//! assert!(created);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use ::redis::{Client, Cmd, FromRedisValue, aio::MultiplexedConnection};
use async_trait::async_trait;
use tracing::warn;

use crate::LockStore;
use crate::error::{StoreError, StoreResult};
use crate::pool::{ConnectionPool, ManageConnection, PoolConfig};

/// Opens multiplexed async connections from a Redis client.
///
/// Password authentication is carried by the connection URL
/// (`redis://:password@host:port`), so no separate AUTH step is needed.
pub struct RedisConnector {
    client: Client,
}

impl RedisConnector {
    pub fn new(url: &str) -> StoreResult<Self> {
        let client = Client::open(url)
            .map_err(|e| StoreError::Configuration(format!("invalid redis url: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ManageConnection for RedisConnector {
    type Connection = MultiplexedConnection;

    async fn connect(&self) -> StoreResult<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Connection(format!("failed to connect redis: {e}")))
    }

    async fn check(&self, conn: &mut MultiplexedConnection) -> StoreResult<()> {
        ::redis::cmd("PING").query_async::<String>(conn).await?;
        Ok(())
    }
}

/// Redis-based LockStore implementation
#[derive(Clone)]
pub struct RedisStore {
    pool: ConnectionPool<RedisConnector>,
}

impl RedisStore {
    /// Build a store for the given URL. Connections are opened lazily.
    pub fn open(url: &str, pool_config: PoolConfig) -> StoreResult<Self> {
        let pool = ConnectionPool::new(RedisConnector::new(url)?, pool_config)?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &ConnectionPool<RedisConnector> {
        &self.pool
    }

    /// Run `cmd` on a pooled connection.
    async fn query<T>(&self, cmd: Cmd) -> StoreResult<T>
    where
        T: FromRedisValue + Send,
    {
        let mut conn = self.pool.get().await?;
        match cmd.query_async::<T>(&mut *conn).await {
            Ok(value) => Ok(value),
            Err(e) => {
                let err = StoreError::from(e);
                if matches!(err, StoreError::Connection(_)) {
                    warn!(error = %err, "Discarding broken redis connection");
                    drop(conn.detach());
                }
                Err(err)
            }
        }
    }
}

/// `SET key value NX [PX millis]`. Redis rejects a zero expiry.
fn set_if_absent_cmd(key: &str, value: &str, ttl: Option<Duration>) -> ::redis::Cmd {
    let mut cmd = ::redis::cmd("SET");
    cmd.arg(key).arg(value).arg("NX");
    if let Some(ttl) = ttl {
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        cmd.arg("PX").arg(millis);
    }
    cmd
}

#[async_trait]
impl LockStore for RedisStore {
    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        // SET .. NX replies OK when the key was created and nil otherwise
        let reply: Option<String> = self.query(set_if_absent_cmd(key, value, ttl)).await?;
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cmd = ::redis::cmd("GET");
        cmd.arg(key);
        self.query(cmd).await
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut cmd = ::redis::cmd("DEL");
        cmd.arg(key);
        self.query(cmd).await
    }

    async fn keys_matching(&self, pattern: &str) -> StoreResult<Vec<String>> {
        let mut cmd = ::redis::cmd("KEYS");
        cmd.arg(pattern);
        self.query(cmd).await
    }

    async fn ping(&self) -> StoreResult<()> {
        let reply: String = self.query(::redis::cmd("PING")).await?;
        if reply == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Command(format!("unexpected PING reply: {reply}")))
        }
    }
}
