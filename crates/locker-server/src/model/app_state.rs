//! Shared state handed to every request handler.

use locker_core::LockEngine;

use super::command::{CommandConfig, CommandKind};
use super::config::Configuration;

/// Built once at startup and shared through `web::Data`
#[derive(Clone)]
pub struct AppState {
    pub configuration: Configuration,
    pub engine: LockEngine,
}

impl AppState {
    pub fn new(configuration: Configuration, engine: LockEngine) -> Self {
        Self {
            configuration,
            engine,
        }
    }

    pub fn command(&self, kind: CommandKind) -> CommandConfig {
        self.configuration.command(kind)
    }
}
