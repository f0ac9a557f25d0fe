//! Domain models for chat entities

mod channel;
mod ids;
mod message;

pub use channel::Channel;
pub use ids::{ChannelId, MessageId};
pub use message::{Message, MessageBuilder};
