//! Chat crate - Business logic for channel/message synchronization
//!
//! This crate provides platform-independent chat functionality including:
//! - Domain models (Channel, Message)
//! - HTTP client for the channel/message API, plus an in-memory server
//! - State containers (channel selection, message list, edit session)
//! - Sync controller with stale-response suppression
//! - Async session driver on tokio
//! - Query API for UI consumption
//!
//! This crate has zero UI dependencies.

pub mod config;
pub mod models;
pub mod query;
pub mod remote;
pub mod state;
pub mod sync;

pub use self::config::ClientConfig;
pub use models::{Channel, ChannelId, Message, MessageId};
pub use query::{ChannelRow, MessageRow, StatusLine, channel_rows, message_rows, status_line};
pub use remote::{ApiError, ChatBackend, HttpChatClient, InMemoryChatServer};
pub use state::{DraftPolicy, EditSession, Phase};
pub use sync::{
    ChatSession, ErrorLog, ErrorObserver, FetchError, MutationError, MutationKind, Outcome,
    SessionEvent, SyncController, SyncError,
};
