//! Configuration management for the lock service
//!
//! Values are layered, lowest precedence first: `conf/application.yml`
//! (optional), `LOCKER_`-prefixed environment variables with `__` between
//! nested keys, then command-line
//! flags and the environment variables they mirror.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use clap::Parser;
use config::{Config, Environment, File, Value};
use locker_core::EngineConfig;
use locker_store::PoolConfig;

use super::command::{CommandConfig, CommandKind};
use super::constants::{
    CONFIG_FILE, DEFAULT_SERVER_ADDRESS, DEFAULT_SERVER_PORT, DEFAULT_STORE_URL, ENV_PREFIX,
    ENV_SEPARATOR, LOCK_UNLOCK_GUARD_TTL_SECS, LOG_CONSOLE, LOG_DIR, LOG_FILE, LOG_LEVEL,
    SERVER_ADDRESS, SERVER_PORT, STORE_MODE, STORE_POOL_ACQUIRE_TIMEOUT_SECS,
    STORE_POOL_IDLE_TIMEOUT_SECS, STORE_POOL_MAX_SIZE, STORE_URL,
};
use crate::error::ServerError;
use crate::startup::LoggingConfig;

/// Command line arguments for the server
#[derive(Debug, Default, Parser)]
#[command(name = "locker-server", version, about = "Named-lock slash-command server")]
pub struct Cli {
    #[arg(long, env = "LOCKER_ADDRESS")]
    pub address: Option<String>,
    #[arg(short = 'p', long, env = "PORT")]
    pub port: Option<u16>,
    /// Store backend: redis or memory
    #[arg(long = "store", env = "LOCKER_STORE_MODE")]
    pub store: Option<String>,
    #[arg(long = "redis-url", env = "REDIS_URL")]
    pub redis_url: Option<String>,

    #[arg(long = "lock-command", env = "LOCK_COMMAND")]
    pub lock_command: Option<String>,
    #[arg(long = "lock-token", env = "LOCK_APP_TOKEN", hide_env_values = true)]
    pub lock_token: Option<String>,
    #[arg(long = "unlock-command", env = "UNLOCK_COMMAND")]
    pub unlock_command: Option<String>,
    #[arg(long = "unlock-token", env = "UNLOCK_APP_TOKEN", hide_env_values = true)]
    pub unlock_token: Option<String>,
    #[arg(long = "view-command", env = "VIEW_LOCK_COMMAND")]
    pub view_command: Option<String>,
    #[arg(long = "view-token", env = "VIEW_LOCK_APP_TOKEN", hide_env_values = true)]
    pub view_token: Option<String>,
    #[arg(long = "list-command", env = "LIST_LOCK_COMMAND")]
    pub list_command: Option<String>,
    #[arg(long = "list-token", env = "LIST_LOCK_APP_TOKEN", hide_env_values = true)]
    pub list_token: Option<String>,

    #[arg(long = "log-dir", env = "LOCKER_LOG_DIR")]
    pub log_dir: Option<String>,
    #[arg(long = "log-level", env = "LOCKER_LOG_LEVEL")]
    pub log_level: Option<String>,
    #[arg(long = "log-console", env = "LOCKER_LOG_CONSOLE")]
    pub log_console: Option<bool>,
    #[arg(long = "log-file", env = "LOCKER_LOG_FILE")]
    pub log_file: Option<bool>,
}

impl Cli {
    /// Flags that were given, as configuration overrides
    fn overrides(self) -> Vec<(String, Value)> {
        let mut overrides = Vec::new();
        let mut push = |key: &str, value: Option<Value>| {
            if let Some(value) = value {
                overrides.push((key.to_string(), value));
            }
        };

        push(SERVER_ADDRESS, self.address.map(Value::from));
        push(SERVER_PORT, self.port.map(|v| Value::from(i64::from(v))));
        push(STORE_MODE, self.store.map(Value::from));
        push(STORE_URL, self.redis_url.map(Value::from));

        push("commands.lock.name", self.lock_command.map(Value::from));
        push("commands.lock.token", self.lock_token.map(Value::from));
        push("commands.unlock.name", self.unlock_command.map(Value::from));
        push("commands.unlock.token", self.unlock_token.map(Value::from));
        push("commands.view.name", self.view_command.map(Value::from));
        push("commands.view.token", self.view_token.map(Value::from));
        push("commands.list.name", self.list_command.map(Value::from));
        push("commands.list.token", self.list_token.map(Value::from));

        push(LOG_DIR, self.log_dir.map(Value::from));
        push(LOG_LEVEL, self.log_level.map(Value::from));
        push(LOG_CONSOLE, self.log_console.map(Value::from));
        push(LOG_FILE, self.log_file.map(Value::from));

        overrides
    }
}

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    Redis,
    Memory,
}

impl FromStr for StoreMode {
    type Err = ServerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(StoreMode::Redis),
            "memory" => Ok(StoreMode::Memory),
            other => Err(ServerError::invalid_setting(
                STORE_MODE,
                format!("expected 'redis' or 'memory', got '{}'", other),
            )),
        }
    }
}

impl fmt::Display for StoreMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreMode::Redis => f.write_str("redis"),
            StoreMode::Memory => f.write_str("memory"),
        }
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator(ENV_SEPARATOR)
        .try_parsing(true)
}

/// Application configuration loaded from config files and environment
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    pub config: Config,
}

impl Configuration {
    /// Parse the command line and load every configuration source.
    pub fn new() -> Result<Self, ServerError> {
        Self::load(Cli::parse())
    }

    pub fn load(cli: Cli) -> Result<Self, ServerError> {
        Self::load_from(Path::new(CONFIG_FILE), cli)
    }

    /// Load with `path` as the configuration file. A missing file is fine.
    pub fn load_from(path: &Path, cli: Cli) -> Result<Self, ServerError> {
        Self::load_with_env(path, environment(), cli)
    }

    fn load_with_env(path: &Path, env: Environment, cli: Cli) -> Result<Self, ServerError> {
        let mut builder = Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env);

        for (key, value) in cli.overrides() {
            builder = builder.set_override(key, value)?;
        }

        Ok(Self::from_config(builder.build()?))
    }

    pub fn from_config(config: Config) -> Self {
        Configuration { config }
    }

    // ========================================================================
    // Server
    // ========================================================================

    pub fn server_address(&self) -> String {
        self.config
            .get_string(SERVER_ADDRESS)
            .unwrap_or(DEFAULT_SERVER_ADDRESS.to_string())
    }

    pub fn server_port(&self) -> u16 {
        self.config
            .get_int(SERVER_PORT)
            .ok()
            .and_then(|v| u16::try_from(v).ok())
            .unwrap_or(DEFAULT_SERVER_PORT)
    }

    // ========================================================================
    // Store
    // ========================================================================

    pub fn store_mode(&self) -> Result<StoreMode, ServerError> {
        match self.config.get_string(STORE_MODE) {
            Ok(mode) => mode.parse(),
            Err(_) => Ok(StoreMode::Redis),
        }
    }

    pub fn store_url(&self) -> String {
        self.config
            .get_string(STORE_URL)
            .unwrap_or(DEFAULT_STORE_URL.to_string())
    }

    pub fn pool_config(&self) -> PoolConfig {
        let defaults = PoolConfig::default();
        PoolConfig {
            max_size: self
                .positive_int(STORE_POOL_MAX_SIZE)
                .map(|v| v as usize)
                .unwrap_or(defaults.max_size),
            idle_timeout: self
                .positive_int(STORE_POOL_IDLE_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.idle_timeout),
            acquire_timeout: self
                .positive_int(STORE_POOL_ACQUIRE_TIMEOUT_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.acquire_timeout),
        }
    }

    // ========================================================================
    // Locks
    // ========================================================================

    pub fn engine_config(&self) -> EngineConfig {
        let defaults = EngineConfig::default();
        EngineConfig {
            unlock_guard_ttl: self
                .positive_int(LOCK_UNLOCK_GUARD_TTL_SECS)
                .map(Duration::from_secs)
                .unwrap_or(defaults.unlock_guard_ttl),
        }
    }

    pub fn command(&self, kind: CommandKind) -> CommandConfig {
        let prefix = format!("commands.{}", kind.key());
        CommandConfig {
            name: self
                .config
                .get_string(&format!("{}.name", prefix))
                .unwrap_or_default(),
            token: self
                .config
                .get_string(&format!("{}.token", prefix))
                .unwrap_or_default(),
        }
    }

    // ========================================================================
    // Logging
    // ========================================================================

    pub fn logging_config(&self) -> LoggingConfig {
        LoggingConfig::from_config(
            self.config.get_string(LOG_DIR).ok(),
            self.config.get_bool(LOG_CONSOLE).unwrap_or(true),
            self.config.get_bool(LOG_FILE).unwrap_or(false),
            self.config
                .get_string(LOG_LEVEL)
                .unwrap_or("info".to_string()),
        )
    }

    fn positive_int(&self, key: &str) -> Option<u64> {
        self.config
            .get_int(key)
            .ok()
            .and_then(|v| u64::try_from(v).ok())
            .filter(|v| *v > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_overrides(pairs: &[(&str, &str)]) -> Configuration {
        let mut builder = Config::builder();
        for (key, value) in pairs {
            builder = builder.set_override(*key, *value).unwrap();
        }
        Configuration::from_config(builder.build().unwrap())
    }

    #[test]
    fn test_defaults() {
        let configuration = Configuration::default();
        assert_eq!(configuration.server_address(), "0.0.0.0");
        assert_eq!(configuration.server_port(), 8080);
        assert_eq!(configuration.store_mode().unwrap(), StoreMode::Redis);
        assert_eq!(configuration.store_url(), "redis://127.0.0.1:6379");

        let pool = configuration.pool_config();
        assert_eq!(pool.max_size, 3);
        assert_eq!(pool.idle_timeout, Duration::from_secs(240));
        assert_eq!(
            configuration.engine_config().unlock_guard_ttl,
            Duration::from_secs(30)
        );
        assert_eq!(
            configuration.command(CommandKind::Lock),
            CommandConfig::default()
        );
    }

    #[test]
    fn test_overrides_are_read() {
        let configuration = with_overrides(&[
            ("server.port", "9090"),
            ("store.mode", "Memory"),
            ("store.pool.max_size", "8"),
            ("lock.unlock_guard_ttl_secs", "5"),
            ("commands.unlock.name", "/unlock"),
            ("commands.unlock.token", "s3cret"),
        ]);
        assert_eq!(configuration.server_port(), 9090);
        assert_eq!(configuration.store_mode().unwrap(), StoreMode::Memory);
        assert_eq!(configuration.pool_config().max_size, 8);
        assert_eq!(
            configuration.engine_config().unlock_guard_ttl,
            Duration::from_secs(5)
        );
        assert_eq!(
            configuration.command(CommandKind::Unlock),
            CommandConfig::new("/unlock", "s3cret")
        );
    }

    #[test]
    fn test_invalid_values_fall_back() {
        let configuration = with_overrides(&[
            ("server.port", "70000"),
            ("store.pool.max_size", "0"),
        ]);
        assert_eq!(configuration.server_port(), 8080);
        assert_eq!(configuration.pool_config().max_size, 3);
    }

    #[test]
    fn test_unknown_store_mode_is_an_error() {
        let configuration = with_overrides(&[("store.mode", "etcd")]);
        assert!(matches!(
            configuration.store_mode(),
            Err(ServerError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn test_load_from_file_with_cli_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("application.yml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "server:\n  port: 7000\ncommands:\n  lock:\n    name: /lock\n    token: from-file"
        )
        .unwrap();

        let cli = Cli {
            port: Some(7100),
            lock_token: Some("from-cli".to_string()),
            ..Default::default()
        };
        let configuration = Configuration::load_from(&path, cli).unwrap();

        assert_eq!(configuration.server_port(), 7100);
        assert_eq!(
            configuration.command(CommandKind::Lock),
            CommandConfig::new("/lock", "from-cli")
        );
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let configuration =
            Configuration::load_from(&dir.path().join("absent.yml"), Cli::default()).unwrap();
        assert_eq!(configuration.server_port(), 8080);
    }

    #[test]
    fn test_prefixed_environment_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("application.yml");
        std::fs::write(&path, "store:\n  pool:\n    max_size: 2\n").unwrap();

        let vars: config::Map<String, String> = [
            ("LOCKER_STORE__POOL__MAX_SIZE", "7"),
            ("LOCKER_SERVER__PORT", "9100"),
            ("LOCKER_STORE_MODE", "memory"),
            ("PATH", "/usr/bin"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let configuration =
            Configuration::load_with_env(&path, environment().source(Some(vars)), Cli::default())
                .unwrap();

        assert_eq!(configuration.pool_config().max_size, 7);
        assert_eq!(configuration.server_port(), 9100);
        // Flat clap variables stay out of the nested tables
        assert_eq!(configuration.store_mode().unwrap(), StoreMode::Redis);
    }
}
