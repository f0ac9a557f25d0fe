//! Client-side state containers
//!
//! Each container owns one piece of view state. Only the sync controller
//! writes to them.

mod edit;
mod message_list;
mod selection;

pub use edit::{ComposeDraft, DraftPolicy, EditSession};
pub use message_list::{MessageList, Phase};
pub use selection::{ChannelList, ChannelSelection};
