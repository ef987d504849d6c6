//! Store backend construction.

use std::sync::Arc;
use std::time::Duration;

use locker_store::{ConnectionPool, LockStore, ManageConnection, MemoryStore, RedisStore};
use tracing::{debug, info, warn};

use super::ShutdownSignal;
use crate::error::ServerError;
use crate::model::constants::POOL_MAINTENANCE_INTERVAL_SECS;
use crate::model::{Configuration, StoreMode};

/// Open the configured store.
///
/// An unreachable Redis is logged but not fatal; connections are retried per
/// request.
pub async fn build_store(
    configuration: &Configuration,
    shutdown: &ShutdownSignal,
) -> Result<Arc<dyn LockStore>, ServerError> {
    match configuration.store_mode()? {
        StoreMode::Memory => {
            warn!("Using the in-memory store; locks are not shared between instances");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreMode::Redis => {
            let pool_config = configuration.pool_config();
            let store = RedisStore::open(&configuration.store_url(), pool_config.clone())?;
            info!(
                max_size = pool_config.max_size,
                idle_timeout_secs = pool_config.idle_timeout.as_secs(),
                "Redis store configured"
            );

            if let Err(e) = store.ping().await {
                warn!(error = %e, "Redis is not reachable yet");
            }

            spawn_pool_maintenance(
                store.pool().clone(),
                Duration::from_secs(POOL_MAINTENANCE_INTERVAL_SECS),
                shutdown,
            );
            Ok(Arc::new(store))
        }
    }
}

/// Periodically drop expired idle connections until shutdown. The pool is
/// closed on the way out.
pub fn spawn_pool_maintenance<M: ManageConnection>(
    pool: ConnectionPool<M>,
    interval: Duration,
    shutdown: &ShutdownSignal,
) -> tokio::task::JoinHandle<()> {
    let mut shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    pool.maintain();
                }
                _ = shutdown_rx.recv() => {
                    pool.close();
                    debug!("Store pool maintenance stopped");
                    break;
                }
            }
        }
    })
}
