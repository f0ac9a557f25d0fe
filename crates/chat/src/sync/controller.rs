//! Synchronization controller
//!
//! Decides when channels and messages are (re)fetched and how create,
//! update and delete are sequenced against the message list.
//!
//! The controller performs no I/O. Operations that need the server return
//! a ticket describing the request; the caller runs it and passes the
//! result back together with the ticket:
//! 1. `select_channel` / `refresh` return a [`FetchTicket`], settled with
//!    [`SyncController::apply_messages`]
//! 2. `submit_message` / `commit_edit` / `delete_message` return a
//!    [`MutationTicket`], settled with [`SyncController::settle_mutation`],
//!    which in turn returns the follow-up refresh ticket
//!
//! Fetch tickets carry the selection generation they were issued under, so
//! a result that arrives after the user switched channels is discarded.
//! Mutation tickets only remember their channel: the follow-up refresh is
//! issued whenever that channel is still the active one.

use log::{debug, info, warn};
use std::sync::Arc;

use super::error::{ErrorObserver, FetchError, FetchTarget, MutationError, MutationKind, SyncError};
use crate::models::{Channel, ChannelId, Message, MessageId};
use crate::remote::ApiError;
use crate::state::{ChannelList, ChannelSelection, ComposeDraft, DraftPolicy, EditSession, MessageList, Phase};

/// Tag of an in-flight message fetch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub channel_id: ChannelId,
    generation: u64,
    seq: u64,
}

/// A request that changes server state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create { content: String, channel_id: ChannelId },
    Update { id: MessageId, content: String },
    Delete { id: MessageId },
}

impl Mutation {
    pub fn kind(&self) -> MutationKind {
        match self {
            Mutation::Create { .. } => MutationKind::Create,
            Mutation::Update { .. } => MutationKind::Update,
            Mutation::Delete { .. } => MutationKind::Delete,
        }
    }
}

/// Tag of an in-flight mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    pub mutation: Mutation,
    /// Channel to refresh once the mutation settles
    pub channel_id: ChannelId,
}

/// What applying a settled fetch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// State was replaced with the result
    Applied,
    /// The request failed; previous state kept
    Failed,
    /// The result was stale and dropped
    Discarded,
}

/// Orchestrates channel selection, the message list and editing
pub struct SyncController {
    channels: ChannelList,
    selection: ChannelSelection,
    messages: MessageList,
    edit: EditSession,
    compose: ComposeDraft,
    next_seq: u64,
    mutation_pending: bool,
    observer: Option<Arc<dyn ErrorObserver>>,
}

impl SyncController {
    pub fn new(draft_policy: DraftPolicy) -> Self {
        Self {
            channels: ChannelList::new(),
            selection: ChannelSelection::new(),
            messages: MessageList::new(),
            edit: EditSession::Idle,
            compose: ComposeDraft::new(draft_policy),
            next_seq: 0,
            mutation_pending: false,
            observer: None,
        }
    }

    /// Attach an observer for swallowed errors
    pub fn with_observer(mut self, observer: Arc<dyn ErrorObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn set_observer(&mut self, observer: Option<Arc<dyn ErrorObserver>>) {
        self.observer = observer;
    }

    // === Channels ===

    /// Apply the result of the startup channel fetch
    pub fn apply_channels(&mut self, result: Result<Vec<Channel>, ApiError>) -> Outcome {
        match result {
            Ok(channels) => {
                debug!("Loaded {} channels", channels.len());
                self.channels.replace(channels);
                Outcome::Applied
            }
            Err(source) => {
                self.report(
                    FetchError {
                        target: FetchTarget::Channels,
                        channel_id: None,
                        source,
                    }
                    .into(),
                );
                Outcome::Failed
            }
        }
    }

    pub fn channels(&self) -> &ChannelList {
        &self.channels
    }

    // === Selection and message list ===

    /// Make `channel` active (or clear the selection)
    ///
    /// Returns the fetch to issue for the new channel. Clearing the
    /// selection empties the list and issues nothing. An edit in progress
    /// is dropped unless the same channel is selected again.
    pub fn select_channel(&mut self, channel: Option<Channel>) -> Option<FetchTicket> {
        let same_channel = match (&channel, self.selection.active_id()) {
            (Some(next), Some(active)) => &next.id == active,
            _ => false,
        };
        if !same_channel && self.edit.is_active() {
            debug!("Leaving channel; discarding edit in progress");
            self.edit.reset();
        }

        let Some(channel) = channel else {
            self.selection.select(None);
            self.messages.reset();
            info!("Channel selection cleared");
            return None;
        };

        info!("Switching to channel {} ({})", channel.name, channel.id);
        let channel_id = channel.id.clone();
        self.selection.select(Some(channel));
        Some(self.issue_fetch(channel_id, true))
    }

    /// Re-fetch the active channel, keeping the current list until it settles
    pub fn refresh(&mut self) -> Option<FetchTicket> {
        let channel_id = self.selection.active_id()?.clone();
        Some(self.issue_fetch(channel_id, false))
    }

    /// Apply a settled message fetch
    pub fn apply_messages(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Message>, ApiError>,
    ) -> Outcome {
        if !self.selection.is_current(ticket.generation, &ticket.channel_id) {
            debug!(
                "Discarding stale messages for channel {} (generation {}, now {})",
                ticket.channel_id,
                ticket.generation,
                self.selection.generation()
            );
            return Outcome::Discarded;
        }

        match result {
            Ok(messages) => {
                let count = messages.len();
                if self.messages.apply(ticket.seq, messages) {
                    debug!("Applied {} messages for channel {}", count, ticket.channel_id);
                    Outcome::Applied
                } else {
                    debug!(
                        "Discarding superseded fetch {} for channel {}",
                        ticket.seq, ticket.channel_id
                    );
                    Outcome::Discarded
                }
            }
            Err(source) => {
                self.messages.fail(ticket.seq);
                self.report(
                    FetchError {
                        target: FetchTarget::Messages,
                        channel_id: Some(ticket.channel_id),
                        source,
                    }
                    .into(),
                );
                Outcome::Failed
            }
        }
    }

    pub fn active_channel(&self) -> Option<&Channel> {
        self.selection.active()
    }

    pub fn phase(&self) -> Phase {
        self.messages.phase()
    }

    pub fn messages(&self) -> &[Message] {
        self.messages.messages()
    }

    pub fn message(&self, id: &MessageId) -> Option<&Message> {
        self.messages.get(id)
    }

    // === Compose ===

    pub fn set_compose_text(&mut self, text: impl Into<String>) {
        self.compose.set(text);
    }

    pub fn compose_text(&self) -> &str {
        self.compose.text()
    }

    /// Post the compose draft to the active channel
    pub fn submit_message(&mut self) -> Option<MutationTicket> {
        let channel_id = self.selection.active_id()?.clone();
        let mutation = Mutation::Create {
            content: self.compose.text().to_string(),
            channel_id: channel_id.clone(),
        };
        self.issue_mutation(mutation, channel_id)
    }

    // === Editing ===

    /// Start editing `message`, discarding any edit in progress
    pub fn begin_edit(&mut self, message: &Message) {
        debug!("Editing message {}", message.id);
        self.edit.begin(message);
    }

    /// Start editing a message from the current list; false if it is not shown
    pub fn begin_edit_by_id(&mut self, id: &MessageId) -> bool {
        match self.messages.get(id).cloned() {
            Some(message) => {
                self.begin_edit(&message);
                true
            }
            None => false,
        }
    }

    /// Replace the edit draft; false when no edit is in progress
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        self.edit.update_draft(text)
    }

    /// Leave edit mode without sending anything
    pub fn cancel_edit(&mut self) {
        if self.edit.is_active() {
            debug!("Edit cancelled");
        }
        self.edit.reset();
    }

    /// Send the edit draft for the message being edited
    pub fn commit_edit(&mut self) -> Option<MutationTicket> {
        let channel_id = self.selection.active_id()?.clone();
        let EditSession::Editing { message_id, draft } = &self.edit else {
            return None;
        };
        let mutation = Mutation::Update {
            id: message_id.clone(),
            content: draft.clone(),
        };
        self.issue_mutation(mutation, channel_id)
    }

    pub fn edit_session(&self) -> &EditSession {
        &self.edit
    }

    // === Delete ===

    /// Delete a message; there is no confirmation step
    pub fn delete_message(&mut self, id: &MessageId) -> Option<MutationTicket> {
        let channel_id = self.selection.active_id()?.clone();
        self.issue_mutation(Mutation::Delete { id: id.clone() }, channel_id)
    }

    /// Whether a mutation is waiting to settle
    pub fn mutation_pending(&self) -> bool {
        self.mutation_pending
    }

    /// Apply a settled mutation and return the refresh to issue
    ///
    /// Draft and edit state are reset whatever the outcome. The refresh is
    /// skipped only when the mutation's channel is no longer active; the
    /// newly selected channel already has its own fetch. Re-selecting the
    /// same channel meanwhile still gets the refresh.
    pub fn settle_mutation(
        &mut self,
        ticket: MutationTicket,
        result: Result<(), ApiError>,
    ) -> Option<FetchTicket> {
        self.mutation_pending = false;
        let kind = ticket.mutation.kind();

        let succeeded = match result {
            Ok(()) => {
                info!("Message {} succeeded in channel {}", kind, ticket.channel_id);
                true
            }
            Err(source) => {
                self.report(MutationError { kind, source }.into());
                false
            }
        };

        match kind {
            MutationKind::Create => self.compose.settle(succeeded),
            MutationKind::Update => self.edit.reset(),
            MutationKind::Delete => {}
        }

        if self.selection.active_id() != Some(&ticket.channel_id) {
            debug!(
                "Channel {} no longer active; skipping refresh after {}",
                ticket.channel_id, kind
            );
            return None;
        }
        Some(self.issue_fetch(ticket.channel_id, false))
    }

    // === Internals ===

    fn issue_fetch(&mut self, channel_id: ChannelId, clear: bool) -> FetchTicket {
        self.next_seq += 1;
        self.messages.begin_fetch(self.next_seq, clear);
        FetchTicket {
            channel_id,
            generation: self.selection.generation(),
            seq: self.next_seq,
        }
    }

    fn issue_mutation(&mut self, mutation: Mutation, channel_id: ChannelId) -> Option<MutationTicket> {
        if self.mutation_pending {
            debug!("Ignoring {} while another mutation is in flight", mutation.kind());
            return None;
        }
        self.mutation_pending = true;
        self.messages.mark_loading();
        info!("Issuing message {} in channel {}", mutation.kind(), channel_id);
        Some(MutationTicket { mutation, channel_id })
    }

    fn report(&self, error: SyncError) {
        warn!("{}", error);
        if let Some(observer) = &self.observer {
            observer.on_error(&error);
        }
    }
}

impl Default for SyncController {
    fn default() -> Self {
        Self::new(DraftPolicy::default())
    }
}
