//! Slash-command response payloads.

use actix_web::{HttpResponse, HttpResponseBuilder, http::StatusCode};
use serde::{Deserialize, Serialize};

/// Who sees the reply in the chat client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Visible to the whole channel
    InChannel,
    /// Visible only to the caller
    Ephemeral,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub response_type: ResponseType,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
}

impl CommandResponse {
    pub fn in_channel(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::InChannel,
            text: text.into(),
            icon_emoji: None,
        }
    }

    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: ResponseType::Ephemeral,
            text: text.into(),
            icon_emoji: None,
        }
    }

    pub fn with_icon(mut self, icon: &str) -> Self {
        self.icon_emoji = Some(icon.to_string());
        self
    }

    pub fn http_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponseBuilder::new(status).json(self)
    }
}
