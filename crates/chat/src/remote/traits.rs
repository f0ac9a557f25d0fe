//! Backend trait definition

use super::ApiError;
use crate::models::{Channel, ChannelId, Message, MessageId};

/// Operations offered by the remote message store
///
/// Each call is one request/response round trip with no retries. Calls
/// block; the session driver runs them on the blocking pool.
pub trait ChatBackend: Send + Sync {
    /// List every channel
    fn list_channels(&self) -> Result<Vec<Channel>, ApiError>;

    /// List the messages posted to a channel, in server order
    fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>, ApiError>;

    /// Post a new message; the server assigns its ID and timestamps
    fn create_message(&self, content: &str, channel_id: &ChannelId) -> Result<(), ApiError>;

    /// Replace a message's content
    fn update_message(&self, id: &MessageId, content: &str) -> Result<(), ApiError>;

    /// Delete a message
    fn delete_message(&self, id: &MessageId) -> Result<(), ApiError>;
}
