//! Channel trait and the message type every channel produces.

use std::pin::Pin;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use uuid::Uuid;

use crate::error::ChannelError;

/// A chat message delivered by a channel.
#[derive(Debug, Clone)]
pub struct IncomingMessage {
    /// Locally generated message ID.
    pub id: Uuid,
    /// Source channel name ("telegram", "cli").
    pub channel: String,
    /// Sender identifier (chat id, channel username, "local-user").
    pub user_id: String,
    /// Display name of the sender, when known.
    pub user_name: Option<String>,
    /// Message text.
    pub content: String,
    /// Channel-specific metadata (chat id, provider message id, ...).
    pub metadata: serde_json::Value,
    /// Provider delivery time when given, otherwise local receive time.
    pub received_at: DateTime<Utc>,
}

impl IncomingMessage {
    pub fn new(channel: &str, user_id: &str, content: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            channel: channel.to_string(),
            user_id: user_id.to_string(),
            user_name: None,
            content: content.to_string(),
            metadata: serde_json::Value::Null,
            received_at: Utc::now(),
        }
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn with_user_name(mut self, name: &str) -> Self {
        self.user_name = Some(name.to_string());
        self
    }

    pub fn with_received_at(mut self, received_at: DateTime<Utc>) -> Self {
        self.received_at = received_at;
        self
    }
}

/// Stream of inbound messages from a channel.
pub type MessageStream = Pin<Box<dyn Stream<Item = IncomingMessage> + Send>>;

/// A source of chat messages.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Channel name for logs.
    fn name(&self) -> &str;

    /// Start listening. The stream ends when the source is exhausted.
    async fn start(&self) -> Result<MessageStream, ChannelError>;

    /// Check that the source is reachable.
    async fn health_check(&self) -> Result<(), ChannelError>;

    /// Release any resources held by the channel.
    async fn shutdown(&self) -> Result<(), ChannelError> {
        Ok(())
    }
}
