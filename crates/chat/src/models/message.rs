//! Message model representing a posted chat message

use super::{ChannelId, MessageId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single message within a channel
///
/// Field names match the server's JSON representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Server-assigned message ID
    pub id: MessageId,
    /// Message text
    pub content: String,
    /// Channel the message was posted to
    pub channel_id: ChannelId,
    /// When the message was first posted
    pub created_at: DateTime<Utc>,
    /// When the content last changed (equals `created_at` until edited)
    pub modified_at: DateTime<Utc>,
}

impl Message {
    /// Create a new message builder
    pub fn builder(id: impl Into<MessageId>, channel_id: impl Into<ChannelId>) -> MessageBuilder {
        MessageBuilder::new(id.into(), channel_id.into())
    }

    /// Whether the message was changed after posting
    pub fn is_edited(&self) -> bool {
        self.modified_at != self.created_at
    }
}

/// Builder for creating Message instances
pub struct MessageBuilder {
    id: MessageId,
    channel_id: ChannelId,
    content: String,
    created_at: Option<DateTime<Utc>>,
    modified_at: Option<DateTime<Utc>>,
}

impl MessageBuilder {
    fn new(id: MessageId, channel_id: ChannelId) -> Self {
        Self {
            id,
            channel_id,
            content: String::new(),
            created_at: None,
            modified_at: None,
        }
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn modified_at(mut self, modified_at: DateTime<Utc>) -> Self {
        self.modified_at = Some(modified_at);
        self
    }

    /// Missing timestamps default to now; `modified_at` defaults to `created_at`
    pub fn build(self) -> Message {
        let created_at = self.created_at.unwrap_or_else(Utc::now);
        Message {
            id: self.id,
            content: self.content,
            channel_id: self.channel_id,
            created_at,
            modified_at: self.modified_at.unwrap_or(created_at),
        }
    }
}
