//! Startup and configuration errors for the server binary.

use locker_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },

    #[error("failed to initialize logging: {0}")]
    Logging(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl ServerError {
    pub fn invalid_setting(key: &str, message: impl Into<String>) -> Self {
        ServerError::InvalidSetting {
            key: key.to_string(),
            message: message.into(),
        }
    }
}
