//! Channel model

use super::ChannelId;
use serde::{Deserialize, Serialize};

/// A named conversation scope
///
/// Channels come from the server only and are never edited client-side;
/// the whole list is replaced on each fetch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
}

impl Channel {
    pub fn new(id: impl Into<ChannelId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
