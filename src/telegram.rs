//! Telegram Bot API client for contact form delivery.
//! Posts one `sendMessage` call per submission; the API answers with
//! `{"ok": bool, "description": ...}` and only `ok == true` counts as sent.
//! No retries and no request timeout beyond the client default.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ChatId, TelegramConfig};
use crate::form::FormFields;
use crate::submit::MessageSender;

const API_BASE: &str = "https://api.telegram.org";
const PARSE_MODE: &str = "Markdown";

#[derive(Debug, Error)]
pub enum SendError {
    #[error("Failed to reach Telegram: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Failed to parse Telegram response (HTTP {status}): {source}")]
    Parse {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    #[error("Telegram API error {}: {description}", .code.map(|c| c.to_string()).unwrap_or_default())]
    Api {
        code: Option<u16>,
        description: String,
    },
}

impl SendError {
    /// Authorization and not-found failures point at a bad bot token or chat id
    /// rather than a transient problem.
    pub fn is_configuration_error(&self) -> bool {
        match self {
            SendError::Transport(_) => false,
            SendError::Parse { status, .. } => *status == 401 || *status == 404,
            SendError::Api { .. } => {
                let text = self.to_string();
                text.contains("404") || text.contains("401")
            }
        }
    }
}

// *************** Request/Response Types ***************

#[derive(Debug, Serialize, PartialEq)]
struct SendMessageRequest<'a> {
    chat_id: &'a ChatId,
    text: String,
    parse_mode: &'static str,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    description: Option<String>,
}

// *************** Public API ***************

pub struct TelegramClient {
    client: Client,
    config: TelegramConfig,
}

impl TelegramClient {
    pub fn new(config: TelegramConfig) -> Result<Self, SendError> {
        let client = Client::builder().build().map_err(SendError::Transport)?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/bot{}/sendMessage", API_BASE, self.config.bot_token)
    }

    async fn call_api(&self, text: String) -> Result<(), SendError> {
        let request = SendMessageRequest {
            chat_id: &self.config.chat_id,
            text,
            parse_mode: PARSE_MODE,
        };

        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| SendError::Transport(e.without_url()))?;

        // The status is kept for bodies that are not Telegram JSON, e.g. a proxy's HTML 404.
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SendError::Transport(e.without_url()))?;

        read_response(status, &body)
    }
}

fn read_response(status: u16, body: &str) -> Result<(), SendError> {
    let response: SendMessageResponse =
        serde_json::from_str(body).map_err(|source| SendError::Parse { status, source })?;
    into_result(response)
}

/// Only `ok == true` counts as delivered.
fn into_result(response: SendMessageResponse) -> Result<(), SendError> {
    if response.ok {
        return Ok(());
    }
    Err(SendError::Api {
        code: response.error_code,
        description: response.description.unwrap_or_default(),
    })
}

impl MessageSender for TelegramClient {
    async fn send(&self, fields: &FormFields) -> Result<(), SendError> {
        tracing::debug!(chat_id = ?self.config.chat_id, "posting contact message to Telegram");
        self.call_api(build_message(fields)).await
    }
}

/// Formats already-sanitized form fields into the Markdown message body.
pub fn build_message(fields: &FormFields) -> String {
    format!(
        "New Message from Portfolio\n\n*Name:* {}\n*Email:* {}\n\n*Message:*\n{}",
        fields.name, fields.email, fields.message
    )
}

// *************** Tests ***************
