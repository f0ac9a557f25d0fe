//! Channel list cache and active channel tracking

use crate::models::{Channel, ChannelId};

/// Channels fetched at startup
///
/// Replaced wholesale on each successful fetch; a failed fetch leaves the
/// previous list untouched.
#[derive(Debug, Default, Clone)]
pub struct ChannelList {
    channels: Vec<Channel>,
    loaded: bool,
}

impl ChannelList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, channels: Vec<Channel>) {
        self.channels = channels;
        self.loaded = true;
    }

    /// Whether at least one fetch has succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn as_slice(&self) -> &[Channel] {
        &self.channels
    }

    pub fn get(&self, id: &ChannelId) -> Option<&Channel> {
        self.channels.iter().find(|c| &c.id == id)
    }

    /// Look a channel up by ID first, then by exact name
    pub fn find(&self, key: &str) -> Option<&Channel> {
        self.channels
            .iter()
            .find(|c| c.id.as_str() == key)
            .or_else(|| self.channels.iter().find(|c| c.name == key))
    }
}

/// The active channel plus a generation counter
///
/// Every call to [`select`](Self::select) bumps the generation, including
/// re-selecting the same channel or clearing the selection. Results tagged
/// with an older generation are stale.
#[derive(Debug, Default, Clone)]
pub struct ChannelSelection {
    active: Option<Channel>,
    generation: u64,
}

impl ChannelSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Change the active channel and return the new generation
    pub fn select(&mut self, channel: Option<Channel>) -> u64 {
        self.active = channel;
        self.generation += 1;
        self.generation
    }

    pub fn active(&self) -> Option<&Channel> {
        self.active.as_ref()
    }

    pub fn active_id(&self) -> Option<&ChannelId> {
        self.active.as_ref().map(|c| &c.id)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether a result issued under `generation` for `channel_id` may be applied
    pub fn is_current(&self, generation: u64, channel_id: &ChannelId) -> bool {
        generation == self.generation && self.active_id() == Some(channel_id)
    }
}
