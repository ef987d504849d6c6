// Configuration keys and defaults

pub const SERVER_ADDRESS: &str = "server.address";
pub const SERVER_PORT: &str = "server.port";
pub const DEFAULT_SERVER_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;

pub const STORE_MODE: &str = "store.mode";
pub const STORE_URL: &str = "store.url";
pub const STORE_POOL_MAX_SIZE: &str = "store.pool.max_size";
pub const STORE_POOL_IDLE_TIMEOUT_SECS: &str = "store.pool.idle_timeout_secs";
pub const STORE_POOL_ACQUIRE_TIMEOUT_SECS: &str = "store.pool.acquire_timeout_secs";
pub const DEFAULT_STORE_URL: &str = "redis://127.0.0.1:6379";

pub const LOCK_UNLOCK_GUARD_TTL_SECS: &str = "lock.unlock_guard_ttl_secs";

pub const LOG_DIR: &str = "log.dir";
pub const LOG_CONSOLE: &str = "log.console";
pub const LOG_FILE: &str = "log.file";
pub const LOG_LEVEL: &str = "log.level";

/// Optional configuration file, relative to the working directory
pub const CONFIG_FILE: &str = "conf/application";
/// Prefix for environment overrides. Nested keys are joined with
/// [`ENV_SEPARATOR`], e.g. `LOCKER_STORE__POOL__MAX_SIZE`
pub const ENV_PREFIX: &str = "LOCKER";
pub const ENV_SEPARATOR: &str = "__";

/// Interval between idle-connection sweeps of the store pool
pub const POOL_MAINTENANCE_INTERVAL_SECS: u64 = 60;
