//! In-memory message store
//!
//! Behaves like the HTTP server: it assigns IDs and timestamps, rejects
//! empty content with HTTP 400, and treats updates or deletes of unknown
//! IDs as successful no-ops. Tests use it to inject failures and to assert
//! on the exact sequence of requests the controller issued.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashSet;
use std::fmt;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ApiError, ChatBackend};
use crate::models::{Channel, ChannelId, Message, MessageId};

/// The five remote operations, used to target injected failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListChannels,
    ListMessages,
    CreateMessage,
    UpdateMessage,
    DeleteMessage,
}

/// A request as the server received it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedRequest {
    ListChannels,
    ListMessages { channel_id: ChannelId },
    CreateMessage { content: String, channel_id: ChannelId },
    UpdateMessage { id: MessageId, content: String },
    DeleteMessage { id: MessageId },
}

impl RecordedRequest {
    pub fn operation(&self) -> Operation {
        match self {
            RecordedRequest::ListChannels => Operation::ListChannels,
            RecordedRequest::ListMessages { .. } => Operation::ListMessages,
            RecordedRequest::CreateMessage { .. } => Operation::CreateMessage,
            RecordedRequest::UpdateMessage { .. } => Operation::UpdateMessage,
            RecordedRequest::DeleteMessage { .. } => Operation::DeleteMessage,
        }
    }
}

/// Formats the request line the HTTP client would send
impl fmt::Display for RecordedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordedRequest::ListChannels => write!(f, "GET /channel"),
            RecordedRequest::ListMessages { channel_id } => {
                write!(f, "GET /message?channel_id={}", channel_id)
            }
            RecordedRequest::CreateMessage { .. } => write!(f, "POST /message"),
            RecordedRequest::UpdateMessage { .. } => write!(f, "PUT /message"),
            RecordedRequest::DeleteMessage { id } => write!(f, "DELETE /message?id={}", id),
        }
    }
}

/// In-memory implementation of ChatBackend
///
/// Uses RwLocks for thread-safe access, so the session driver can call it
/// from the blocking pool.
pub struct InMemoryChatServer {
    channels: RwLock<Vec<Channel>>,
    /// Messages in insertion order (server order)
    messages: RwLock<Vec<Message>>,
    next_id: AtomicU64,
    /// Fixed clock; `None` means wall-clock time
    clock: RwLock<Option<DateTime<Utc>>>,
    failing: RwLock<HashSet<Operation>>,
    requests: RwLock<Vec<RecordedRequest>>,
}

impl InMemoryChatServer {
    /// Create a new empty server
    pub fn new() -> Self {
        Self {
            channels: RwLock::new(Vec::new()),
            messages: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
            clock: RwLock::new(None),
            failing: RwLock::new(HashSet::new()),
            requests: RwLock::new(Vec::new()),
        }
    }

    /// Create a server that already lists the given channels
    pub fn with_channels(channels: Vec<Channel>) -> Self {
        let server = Self::new();
        *server.channels.write().unwrap() = channels;
        server
    }

    pub fn add_channel(&self, channel: Channel) {
        self.channels.write().unwrap().push(channel);
    }

    /// Seed a message as-is, keeping its ID and timestamps
    pub fn insert_message(&self, message: Message) {
        self.messages.write().unwrap().push(message);
    }

    /// Current server-side messages of a channel
    pub fn messages_in(&self, channel_id: &ChannelId) -> Vec<Message> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .filter(|m| &m.channel_id == channel_id)
            .cloned()
            .collect()
    }

    pub fn get_message(&self, id: &MessageId) -> Option<Message> {
        self.messages
            .read()
            .unwrap()
            .iter()
            .find(|m| &m.id == id)
            .cloned()
    }

    /// Freeze the server clock at `at`
    pub fn set_clock(&self, at: DateTime<Utc>) {
        *self.clock.write().unwrap() = Some(at);
    }

    /// Move the frozen clock forward (freezing it at now first if needed)
    pub fn advance_clock(&self, by: Duration) {
        let mut clock = self.clock.write().unwrap();
        let current = clock.unwrap_or_else(Utc::now);
        *clock = Some(current + by);
    }

    /// Make every call of `operation` fail with HTTP 500 until [`recover`](Self::recover)
    pub fn fail(&self, operation: Operation) {
        self.failing.write().unwrap().insert(operation);
    }

    pub fn recover(&self, operation: Operation) {
        self.failing.write().unwrap().remove(&operation);
    }

    /// Every request received so far, oldest first
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.read().unwrap().clone()
    }

    /// Request lines of every request received so far
    pub fn request_lines(&self) -> Vec<String> {
        self.requests().iter().map(ToString::to_string).collect()
    }

    pub fn clear_requests(&self) {
        self.requests.write().unwrap().clear();
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.read().unwrap().unwrap_or_else(Utc::now)
    }

    /// Journal the request, then apply any injected failure
    fn receive(&self, request: RecordedRequest) -> Result<(), ApiError> {
        let operation = request.operation();
        self.requests.write().unwrap().push(request);
        if self.failing.read().unwrap().contains(&operation) {
            return Err(ApiError::Status { code: 500 });
        }
        Ok(())
    }

    fn allocate_id(&self) -> MessageId {
        let n = self.next_id.fetch_add(1, Ordering::SeqCst);
        MessageId::new(format!("msg-{:06}", n))
    }
}

impl Default for InMemoryChatServer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatBackend for InMemoryChatServer {
    fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        self.receive(RecordedRequest::ListChannels)?;
        Ok(self.channels.read().unwrap().clone())
    }

    fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>, ApiError> {
        self.receive(RecordedRequest::ListMessages {
            channel_id: channel_id.clone(),
        })?;
        if channel_id.as_str().is_empty() {
            return Err(ApiError::Status { code: 400 });
        }
        Ok(self.messages_in(channel_id))
    }

    fn create_message(&self, content: &str, channel_id: &ChannelId) -> Result<(), ApiError> {
        self.receive(RecordedRequest::CreateMessage {
            content: content.to_string(),
            channel_id: channel_id.clone(),
        })?;
        if content.is_empty() {
            return Err(ApiError::Status { code: 400 });
        }

        let message = Message::builder(self.allocate_id(), channel_id.clone())
            .content(content)
            .created_at(self.now())
            .build();
        self.messages.write().unwrap().push(message);
        Ok(())
    }

    fn update_message(&self, id: &MessageId, content: &str) -> Result<(), ApiError> {
        self.receive(RecordedRequest::UpdateMessage {
            id: id.clone(),
            content: content.to_string(),
        })?;
        if id.as_str().is_empty() || content.is_empty() {
            return Err(ApiError::Status { code: 400 });
        }

        let now = self.now();
        let mut messages = self.messages.write().unwrap();
        if let Some(message) = messages.iter_mut().find(|m| &m.id == id) {
            message.content = content.to_string();
            message.modified_at = now;
        }
        Ok(())
    }

    fn delete_message(&self, id: &MessageId) -> Result<(), ApiError> {
        self.receive(RecordedRequest::DeleteMessage { id: id.clone() })?;
        self.messages.write().unwrap().retain(|m| &m.id != id);
        Ok(())
    }
}
