//! Materialized message list for the active channel

use crate::models::{Message, MessageId};

/// Load phase of the message list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No channel selected; the list is empty
    NoChannel,
    /// The most recently issued fetch has not settled yet
    Loading,
    /// The most recently issued fetch settled (successfully or not)
    Ready,
}

/// Messages of the active channel, always replaced and never patched
///
/// Fetches are numbered by the controller. A result is applied only if it
/// is newer than the last one applied, so a slow fetch can never roll the
/// list back past a quicker, later one.
#[derive(Debug, Clone)]
pub struct MessageList {
    phase: Phase,
    messages: Vec<Message>,
    latest_issued: u64,
    latest_applied: u64,
}

impl MessageList {
    pub fn new() -> Self {
        Self {
            phase: Phase::NoChannel,
            messages: Vec::new(),
            latest_issued: 0,
            latest_applied: 0,
        }
    }

    /// Drop everything and return to [`Phase::NoChannel`]
    pub fn reset(&mut self) {
        self.phase = Phase::NoChannel;
        self.messages.clear();
    }

    /// Record that fetch `seq` was issued; `clear` empties the list first
    pub fn begin_fetch(&mut self, seq: u64, clear: bool) {
        if clear {
            self.messages.clear();
        }
        self.latest_issued = self.latest_issued.max(seq);
        self.phase = Phase::Loading;
    }

    /// A mutation is in flight; the list stays until the follow-up refresh lands
    pub fn mark_loading(&mut self) {
        if self.phase != Phase::NoChannel {
            self.phase = Phase::Loading;
        }
    }

    /// Replace the list with the result of fetch `seq`
    ///
    /// Returns false (and changes nothing) if a newer result was already applied.
    pub fn apply(&mut self, seq: u64, messages: Vec<Message>) -> bool {
        if seq <= self.latest_applied {
            return false;
        }
        self.messages = messages;
        self.latest_applied = seq;
        if seq >= self.latest_issued {
            self.phase = Phase::Ready;
        }
        true
    }

    /// Fetch `seq` failed; the last-known-good list stays in place
    pub fn fail(&mut self, seq: u64) {
        if seq >= self.latest_issued {
            self.phase = Phase::Ready;
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn get(&self, id: &MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| &m.id == id)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for MessageList {
    fn default() -> Self {
        Self::new()
    }
}
