//! Assistant chat backed by the Gemini `generateContent` REST API.
//!
//! Replies always come back as text: failures are rendered into the
//! fallback strings the chat panel shows in place of an answer.

use crate::config::ChatConfig;
use crate::event::{AppEvent, EventSender};
use chrono::{DateTime, Local};
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

pub const GREETING: &str = "Hello! I'm your AI assistant. How can I help you today?";
pub const PENDING_TEXT: &str = "Thinking...";
const NO_RESPONSE_TEXT: &str = "Sorry, I couldn't generate a response. Please try again.";

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("no API key configured (set GEMINI_API_KEY or chat.api_key)")]
    MissingApiKey,

    /// Carries no request URL; the key travels in the query string.
    #[error("{0}")]
    Network(reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response shape")]
    Decode,
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.without_url())
    }
}

impl ChatError {
    pub fn reply_text(&self) -> String {
        match self {
            Self::Decode => NO_RESPONSE_TEXT.to_string(),
            other => format!("Sorry, I encountered an error: {other}"),
        }
    }
}

pub fn request_body(message: &str) -> Value {
    json!({
        "contents": [{
            "parts": [{ "text": message }]
        }]
    })
}

/// `candidates[0].content.parts[0].text`
pub fn extract_reply(response: &Value) -> Option<String> {
    response
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub timestamp: DateTime<Local>,
    /// Set while a bot bubble is waiting for the reply to `request_id`.
    pub pending: Option<u64>,
}

impl ChatMessage {
    fn new(sender: Sender, content: impl Into<String>) -> Self {
        Self {
            sender,
            content: content.into(),
            timestamp: Local::now(),
            pending: None,
        }
    }

    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Messages shown in the chat panel, oldest first.
#[derive(Debug, Clone)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Default for Transcript {
    fn default() -> Self {
        Self {
            messages: vec![ChatMessage::new(Sender::Bot, GREETING)],
        }
    }
}

impl Transcript {
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(Sender::User, content));
    }

    pub fn push_pending(&mut self, request_id: u64) {
        let mut bubble = ChatMessage::new(Sender::Bot, PENDING_TEXT);
        bubble.pending = Some(request_id);
        self.messages.push(bubble);
    }

    /// Replaces the pending bubble for `request_id`; appends if it is gone.
    pub fn resolve(&mut self, request_id: u64, text: String) {
        match self
            .messages
            .iter_mut()
            .find(|message| message.pending == Some(request_id))
        {
            Some(bubble) => {
                bubble.content = text;
                bubble.pending = None;
                bubble.timestamp = Local::now();
            }
            None => self.messages.push(ChatMessage::new(Sender::Bot, text)),
        }
    }

    pub fn is_waiting(&self) -> bool {
        self.messages.iter().any(|message| message.pending.is_some())
    }
}

pub struct ChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    runtime: Handle,
    events: EventSender,
    next_request_id: AtomicU64,
}

impl ChatClient {
    pub fn new(config: &ChatConfig, runtime: Handle, events: EventSender) -> Self {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .unwrap_or_else(|err| {
                tracing::warn!("falling back to default HTTP client: {err}");
                Client::new()
            });

        Self {
            client,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key(),
            runtime,
            events,
            next_request_id: AtomicU64::new(1),
        }
    }

    #[cfg(test)]
    pub(crate) fn without_api_key(mut self) -> Self {
        self.api_key = None;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Posts `message` and returns the id its [`AppEvent::ChatReply`] will
    /// carry.
    pub fn send(&self, message: String) -> (u64, JoinHandle<()>) {
        let request_id = self.next_request_id.fetch_add(1, Ordering::Relaxed);
        let client = self.client.clone();
        let endpoint = self.endpoint.clone();
        let api_key = self.api_key.clone();
        let events = self.events.clone();

        let task = self.runtime.spawn(async move {
            let text = match fetch_reply(&client, &endpoint, api_key.as_deref(), &message).await {
                Ok(text) => text,
                Err(err) => {
                    tracing::warn!(request_id, "chat request failed: {err}");
                    err.reply_text()
                }
            };
            events.send(AppEvent::ChatReply { request_id, text });
        });
        (request_id, task)
    }
}

async fn fetch_reply(
    client: &Client,
    endpoint: &str,
    api_key: Option<&str>,
    message: &str,
) -> Result<String, ChatError> {
    let api_key = api_key.ok_or(ChatError::MissingApiKey)?;

    let response = client
        .post(endpoint)
        .query(&[("key", api_key)])
        .json(&request_body(message))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let value: Value = response.json().await.map_err(|err| {
        tracing::debug!("chat response was not JSON: {err}");
        ChatError::Decode
    })?;
    extract_reply(&value).ok_or(ChatError::Decode)
}
