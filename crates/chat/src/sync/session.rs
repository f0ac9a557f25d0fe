//! Asynchronous driver for the sync controller
//!
//! Each request becomes a tokio task whose blocking backend call runs on
//! the blocking pool. Settlements are queued on a channel and applied to
//! the controller one at a time by [`ChatSession::next_event`], so all
//! state changes happen on the caller's task.

use log::debug;
use std::sync::Arc;
use tokio::sync::mpsc;

use super::controller::{FetchTicket, Mutation, MutationTicket, Outcome, SyncController};
use super::error::MutationKind;
use crate::models::{Channel, Message, MessageId};
use crate::remote::{ApiError, ChatBackend};

/// Something that happened when a request settled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    ChannelsLoaded(Outcome),
    MessagesLoaded(Outcome),
    MutationSettled {
        kind: MutationKind,
        succeeded: bool,
        refresh_issued: bool,
    },
}

#[derive(Debug, Clone)]
enum Request {
    Channels,
    Messages(FetchTicket),
    Mutation(MutationTicket),
}

enum Settlement {
    Channels(Result<Vec<Channel>, ApiError>),
    Messages(FetchTicket, Result<Vec<Message>, ApiError>),
    Mutation(MutationTicket, Result<(), ApiError>),
}

impl Request {
    fn execute(self, backend: &dyn ChatBackend) -> Settlement {
        match self {
            Request::Channels => Settlement::Channels(backend.list_channels()),
            Request::Messages(ticket) => {
                let result = backend.list_messages(&ticket.channel_id);
                Settlement::Messages(ticket, result)
            }
            Request::Mutation(ticket) => {
                let result = match &ticket.mutation {
                    Mutation::Create { content, channel_id } => {
                        backend.create_message(content, channel_id)
                    }
                    Mutation::Update { id, content } => backend.update_message(id, content),
                    Mutation::Delete { id } => backend.delete_message(id),
                };
                Settlement::Mutation(ticket, result)
            }
        }
    }

    /// Settlement used when the task running the request died
    fn into_failure(self, error: ApiError) -> Settlement {
        match self {
            Request::Channels => Settlement::Channels(Err(error)),
            Request::Messages(ticket) => Settlement::Messages(ticket, Err(error)),
            Request::Mutation(ticket) => Settlement::Mutation(ticket, Err(error)),
        }
    }
}

/// A controller bound to a backend
///
/// Methods that issue requests must be called from within a tokio runtime.
pub struct ChatSession {
    backend: Arc<dyn ChatBackend>,
    controller: SyncController,
    tx: mpsc::UnboundedSender<Settlement>,
    rx: mpsc::UnboundedReceiver<Settlement>,
    in_flight: usize,
}

impl ChatSession {
    pub fn new(backend: Arc<dyn ChatBackend>, controller: SyncController) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            backend,
            controller,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Issue the one-time channel list fetch
    pub fn start(&mut self) {
        self.dispatch(Request::Channels);
    }

    pub fn controller(&self) -> &SyncController {
        &self.controller
    }

    /// Number of requests that have not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn select_channel(&mut self, channel: Option<Channel>) {
        if let Some(ticket) = self.controller.select_channel(channel) {
            self.dispatch(Request::Messages(ticket));
        }
    }

    pub fn refresh(&mut self) {
        if let Some(ticket) = self.controller.refresh() {
            self.dispatch(Request::Messages(ticket));
        }
    }

    pub fn set_compose_text(&mut self, text: impl Into<String>) {
        self.controller.set_compose_text(text);
    }

    /// Post the compose draft; returns false if nothing was sent
    pub fn submit_message(&mut self) -> bool {
        self.issue(|c| c.submit_message())
    }

    pub fn begin_edit(&mut self, id: &MessageId) -> bool {
        self.controller.begin_edit_by_id(id)
    }

    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        self.controller.update_draft(text)
    }

    pub fn cancel_edit(&mut self) {
        self.controller.cancel_edit();
    }

    /// Send the edit draft; returns false if nothing was sent
    pub fn commit_edit(&mut self) -> bool {
        self.issue(|c| c.commit_edit())
    }

    /// Delete a message; returns false if nothing was sent
    pub fn delete_message(&mut self, id: &MessageId) -> bool {
        self.issue(|c| c.delete_message(id))
    }

    /// Wait for the next request to settle and apply it
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        if self.in_flight == 0 {
            return None;
        }
        let settlement = self.rx.recv().await?;
        self.in_flight -= 1;
        Some(self.apply(settlement))
    }

    /// Apply settlements until nothing is in flight, including follow-up refreshes
    pub async fn settle(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn issue(&mut self, f: impl FnOnce(&mut SyncController) -> Option<MutationTicket>) -> bool {
        match f(&mut self.controller) {
            Some(ticket) => {
                self.dispatch(Request::Mutation(ticket));
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, settlement: Settlement) -> SessionEvent {
        match settlement {
            Settlement::Channels(result) => {
                SessionEvent::ChannelsLoaded(self.controller.apply_channels(result))
            }
            Settlement::Messages(ticket, result) => {
                SessionEvent::MessagesLoaded(self.controller.apply_messages(ticket, result))
            }
            Settlement::Mutation(ticket, result) => {
                let kind = ticket.mutation.kind();
                let succeeded = result.is_ok();
                let refresh = self.controller.settle_mutation(ticket, result);
                let refresh_issued = refresh.is_some();
                if let Some(ticket) = refresh {
                    self.dispatch(Request::Messages(ticket));
                }
                SessionEvent::MutationSettled {
                    kind,
                    succeeded,
                    refresh_issued,
                }
            }
        }
    }

    fn dispatch(&mut self, request: Request) {
        debug!("Dispatching {:?}", request);
        let backend = Arc::clone(&self.backend);
        let tx = self.tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let fallback = request.clone();
            let settlement =
                match tokio::task::spawn_blocking(move || request.execute(backend.as_ref())).await {
                    Ok(settlement) => settlement,
                    Err(err) => fallback.into_failure(ApiError::Transport {
                        message: format!("request task failed: {}", err),
                    }),
                };
            // A closed channel means the session was dropped
            let _ = tx.send(settlement);
        });
    }
}
