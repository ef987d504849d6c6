//! Error types for store operations

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by a [`crate::LockStore`] backend.
///
/// "Key not found" is deliberately absent: absence is a normal result.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Store unreachable, connection dropped or refused
    #[error("store connection error: {0}")]
    Connection(String),

    /// Store replied with an error or an unexpected reply type
    #[error("store command error: {0}")]
    Command(String),

    /// No pooled connection became available in time
    #[error("timed out after {0}ms waiting for a pooled connection")]
    PoolTimeout(u128),

    /// Pool was shut down
    #[error("connection pool is closed")]
    PoolClosed,

    /// Invalid connection URL or pool settings
    #[error("store configuration error: {0}")]
    Configuration(String),
}

impl From<::redis::RedisError> for StoreError {
    fn from(err: ::redis::RedisError) -> Self {
        if err.is_io_error() || err.is_connection_refusal() || err.is_connection_dropped() {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            StoreError::PoolTimeout(250).to_string(),
            "timed out after 250ms waiting for a pooled connection"
        );
        assert_eq!(
            StoreError::Connection("refused".to_string()).to_string(),
            "store connection error: refused"
        );
    }
}
