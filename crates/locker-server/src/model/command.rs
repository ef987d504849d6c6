//! Slash-command request model and verification.

use std::fmt;

use serde::Deserialize;

/// The four slash commands the service answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Lock,
    Unlock,
    View,
    List,
}

impl CommandKind {
    pub const ALL: [CommandKind; 4] = [
        CommandKind::Lock,
        CommandKind::Unlock,
        CommandKind::View,
        CommandKind::List,
    ];

    /// Configuration key segment, as in `commands.<key>.token`
    pub fn key(&self) -> &'static str {
        match self {
            CommandKind::Lock => "lock",
            CommandKind::Unlock => "unlock",
            CommandKind::View => "view",
            CommandKind::List => "list",
        }
    }
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Form body posted by the chat platform. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CommandForm {
    pub token: String,
    pub command: String,
    pub text: String,
    pub user_name: String,
}

/// Expected command name and shared-secret token for one command kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandConfig {
    pub name: String,
    pub token: String,
}

/// Why a request was refused before reaching the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Token missing or wrong: 401
    Token,
    /// Command name does not match: 400
    Command,
}

impl Rejection {
    pub fn reason(&self) -> &'static str {
        match self {
            Rejection::Token => "token",
            Rejection::Command => "command",
        }
    }
}

impl CommandConfig {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            token: token.into(),
        }
    }

    /// A command with no token configured accepts nothing
    pub fn is_enabled(&self) -> bool {
        !self.token.trim().is_empty()
    }

    /// Check the token first, then the command name.
    pub fn verify(&self, form: &CommandForm) -> Result<(), Rejection> {
        if !self.is_enabled() || form.token.trim() != self.token.trim() {
            return Err(Rejection::Token);
        }
        if form.command.trim() != self.name {
            return Err(Rejection::Command);
        }
        Ok(())
    }
}
