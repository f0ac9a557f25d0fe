//! Remote message store access
//!
//! This module provides:
//! - The `ChatBackend` trait the sync controller is driven against
//! - An HTTP client for the channel/message API
//! - An in-memory server used for tests and offline development

mod client;
mod error;
mod memory;
mod traits;

pub use client::HttpChatClient;
pub use error::ApiError;
pub use memory::{InMemoryChatServer, Operation, RecordedRequest};
pub use traits::ChatBackend;

/// Request bodies sent to the message endpoint
pub mod api {
    use crate::models::{ChannelId, MessageId};
    use serde::Serialize;

    /// Body of `POST /message`
    #[derive(Debug, Serialize)]
    pub struct NewMessage<'a> {
        pub content: &'a str,
        pub channel_id: &'a ChannelId,
    }

    /// Body of `PUT /message`
    #[derive(Debug, Serialize)]
    pub struct MessageEdit<'a> {
        pub id: &'a MessageId,
        pub content: &'a str,
    }
}
