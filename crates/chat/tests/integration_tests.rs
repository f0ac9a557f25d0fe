//! Integration tests for the chat crate
//!
//! These tests drive the controller and the async session against the
//! in-memory server, from channel selection through edits and deletes.

use chat::models::{Channel, ChannelId, Message, MessageId};
use chat::remote::{ApiError, ChatBackend, InMemoryChatServer, Operation, RecordedRequest};
use chat::state::{DraftPolicy, EditSession, Phase};
use chat::sync::{
    ChatSession, ErrorLog, FetchTarget, MutationKind, Outcome, SessionEvent, SyncController,
    SyncError,
};
use chat::{message_rows, status_line};
use chrono::{Duration, TimeZone, Utc};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};

/// Helper to build a server with the given channels and messages
fn make_server(channels: &[(&str, &str)], messages: Vec<Message>) -> Arc<InMemoryChatServer> {
    let server = InMemoryChatServer::with_channels(
        channels
            .iter()
            .map(|(id, name)| Channel::new(*id, *name))
            .collect(),
    );
    for message in messages {
        server.insert_message(message);
    }
    Arc::new(server)
}

/// Helper to create an unedited message posted at a fixed time
fn make_message(id: &str, channel_id: &str, content: &str) -> Message {
    let posted = Utc.with_ymd_and_hms(2024, 6, 20, 10, 0, 0).unwrap();
    Message::builder(id, channel_id)
        .content(content)
        .created_at(posted)
        .build()
}

/// Backend whose message fetches for one channel wait for a signal
struct GatedBackend {
    inner: Arc<InMemoryChatServer>,
    gated: ChannelId,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedBackend {
    fn new(inner: Arc<InMemoryChatServer>, gated: &str) -> (Self, mpsc::Sender<()>) {
        let (tx, rx) = mpsc::channel();
        let backend = Self {
            inner,
            gated: ChannelId::new(gated),
            gate: Mutex::new(rx),
        };
        (backend, tx)
    }
}

impl ChatBackend for GatedBackend {
    fn list_channels(&self) -> Result<Vec<Channel>, ApiError> {
        self.inner.list_channels()
    }

    fn list_messages(&self, channel_id: &ChannelId) -> Result<Vec<Message>, ApiError> {
        if channel_id == &self.gated {
            let _ = self.gate.lock().unwrap().recv();
        }
        self.inner.list_messages(channel_id)
    }

    fn create_message(&self, content: &str, channel_id: &ChannelId) -> Result<(), ApiError> {
        self.inner.create_message(content, channel_id)
    }

    fn update_message(&self, id: &MessageId, content: &str) -> Result<(), ApiError> {
        self.inner.update_message(id, content)
    }

    fn delete_message(&self, id: &MessageId) -> Result<(), ApiError> {
        self.inner.delete_message(id)
    }
}

#[tokio::test]
async fn test_select_channel_issues_fetch_and_shows_empty_list() {
    let server = make_server(&[("1", "general")], vec![]);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.start();
    session.settle().await;
    let general = session.controller().channels().find("general").cloned().unwrap();

    session.select_channel(Some(general));
    assert_eq!(session.controller().phase(), Phase::Loading);
    let events = session.settle().await;

    assert_eq!(events, vec![SessionEvent::MessagesLoaded(Outcome::Applied)]);
    assert_eq!(
        server.request_lines(),
        vec!["GET /channel", "GET /message?channel_id=1"]
    );
    assert!(session.controller().messages().is_empty());
    assert_eq!(session.controller().phase(), Phase::Ready);
    assert_eq!(
        status_line(session.controller()).to_string(),
        "Current channel: general"
    );
}

#[tokio::test]
async fn test_edit_flow_marks_message_edited() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    server.set_clock(Utc.with_ymd_and_hms(2024, 6, 20, 11, 0, 0).unwrap());
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    assert!(!message_rows(session.controller())[0].edited);

    assert!(session.begin_edit(&MessageId::new("5")));
    assert_eq!(session.controller().edit_session().draft(), Some("hi"));
    assert!(session.update_draft("hi!"));
    server.clear_requests();
    assert!(session.commit_edit());
    let events = session.settle().await;

    assert_eq!(
        events,
        vec![
            SessionEvent::MutationSettled {
                kind: MutationKind::Update,
                succeeded: true,
                refresh_issued: true,
            },
            SessionEvent::MessagesLoaded(Outcome::Applied),
        ]
    );
    assert_eq!(
        server.requests(),
        vec![
            RecordedRequest::UpdateMessage {
                id: MessageId::new("5"),
                content: "hi!".to_string(),
            },
            RecordedRequest::ListMessages {
                channel_id: ChannelId::new("1"),
            },
        ]
    );
    assert_eq!(session.controller().edit_session(), &EditSession::Idle);

    let rows = message_rows(session.controller());
    assert_eq!(rows[0].content, "hi!");
    assert!(rows[0].edited);
}

#[tokio::test]
async fn test_delete_refreshes_even_on_failure() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    let log = Arc::new(ErrorLog::new());
    let controller = SyncController::default().with_observer(log.clone());
    let mut session = ChatSession::new(server.clone(), controller);

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;

    server.fail(Operation::DeleteMessage);
    server.clear_requests();
    assert!(session.delete_message(&MessageId::new("5")));
    session.settle().await;

    assert_eq!(
        server.request_lines(),
        vec!["DELETE /message?id=5", "GET /message?channel_id=1"]
    );
    assert_eq!(session.controller().messages().len(), 1);
    assert!(matches!(
        log.errors().as_slice(),
        [SyncError::Mutation(e)] if e.kind == MutationKind::Delete
            && e.source == (ApiError::Status { code: 500 })
    ));

    server.recover(Operation::DeleteMessage);
    assert!(session.delete_message(&MessageId::new("5")));
    session.settle().await;
    assert!(session.controller().messages().is_empty());
    assert_eq!(log.len(), 1);
}

#[tokio::test]
async fn test_clearing_selection_skips_fetch() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    assert_eq!(session.controller().messages().len(), 1);

    server.clear_requests();
    session.select_channel(None);

    assert_eq!(session.in_flight(), 0);
    assert!(session.controller().messages().is_empty());
    assert_eq!(session.controller().phase(), Phase::NoChannel);
    assert!(server.requests().is_empty());
    assert_eq!(
        status_line(session.controller()).to_string(),
        "Select a channel."
    );
}

#[tokio::test]
async fn test_reselecting_same_channel_is_idempotent() {
    let server = make_server(
        &[("1", "general")],
        vec![make_message("a", "1", "one"), make_message("b", "1", "two")],
    );
    let mut session = ChatSession::new(server.clone(), SyncController::default());
    let general = Channel::new("1", "general");

    session.select_channel(Some(general.clone()));
    session.settle().await;
    let first = session.controller().messages().to_vec();

    session.select_channel(Some(general.clone()));
    session.select_channel(Some(general));
    session.settle().await;

    assert_eq!(session.controller().messages(), first.as_slice());
    assert_eq!(server.messages_in(&ChannelId::new("1")), first);
}

#[tokio::test]
async fn test_late_result_for_previous_channel_is_discarded() {
    let server = make_server(
        &[("a", "alpha"), ("b", "beta")],
        vec![make_message("1", "a", "from alpha"), make_message("2", "b", "from beta")],
    );
    let (backend, release) = GatedBackend::new(server.clone(), "a");
    let mut session = ChatSession::new(Arc::new(backend), SyncController::default());

    session.select_channel(Some(Channel::new("a", "alpha")));
    session.select_channel(Some(Channel::new("b", "beta")));

    // Alpha's fetch is held back, so beta's settles first
    assert_eq!(
        session.next_event().await,
        Some(SessionEvent::MessagesLoaded(Outcome::Applied))
    );
    release.send(()).unwrap();
    assert_eq!(
        session.next_event().await,
        Some(SessionEvent::MessagesLoaded(Outcome::Discarded))
    );

    let messages = session.controller().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "from beta");
    assert_eq!(session.controller().active_channel().unwrap().name, "beta");
}

#[tokio::test]
async fn test_mutation_refresh_skipped_after_channel_switch() {
    let server = make_server(
        &[("a", "alpha"), ("b", "beta")],
        vec![make_message("2", "b", "from beta")],
    );
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("a", "alpha")));
    session.settle().await;
    session.set_compose_text("posted to alpha");
    assert!(session.submit_message());
    session.select_channel(Some(Channel::new("b", "beta")));

    let events = session.settle().await;
    assert!(events.contains(&SessionEvent::MutationSettled {
        kind: MutationKind::Create,
        succeeded: true,
        refresh_issued: false,
    }));

    let messages = session.controller().messages();
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].content, "from beta");
    assert_eq!(server.messages_in(&ChannelId::new("a")).len(), 1);
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_known_good_list() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    let log = Arc::new(ErrorLog::new());
    let controller = SyncController::default().with_observer(log.clone());
    let mut session = ChatSession::new(server.clone(), controller);

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;

    server.fail(Operation::ListMessages);
    session.refresh();
    let events = session.settle().await;

    assert_eq!(events, vec![SessionEvent::MessagesLoaded(Outcome::Failed)]);
    assert_eq!(session.controller().messages().len(), 1);
    assert_eq!(session.controller().phase(), Phase::Ready);
    match log.errors().as_slice() {
        [SyncError::Fetch(e)] => {
            assert_eq!(e.target, FetchTarget::Messages);
            assert_eq!(e.channel_id, Some(ChannelId::new("1")));
        }
        other => panic!("unexpected errors: {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_channel_fetch_keeps_previous_channels() {
    let server = make_server(&[("1", "general")], vec![]);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.start();
    session.settle().await;

    server.fail(Operation::ListChannels);
    server.add_channel(Channel::new("2", "random"));
    session.start();
    let events = session.settle().await;

    assert_eq!(events, vec![SessionEvent::ChannelsLoaded(Outcome::Failed)]);
    assert_eq!(session.controller().channels().as_slice().len(), 1);
}

#[tokio::test]
async fn test_compose_draft_cleared_after_failed_post() {
    let server = make_server(&[("1", "general")], vec![]);
    server.fail(Operation::CreateMessage);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    session.set_compose_text("lost on failure");
    assert!(session.submit_message());
    session.settle().await;

    assert_eq!(session.controller().compose_text(), "");
    assert!(session.controller().messages().is_empty());
}

#[tokio::test]
async fn test_keep_on_failure_policy_retains_draft() {
    let server = make_server(&[("1", "general")], vec![]);
    server.fail(Operation::CreateMessage);
    let controller = SyncController::new(DraftPolicy::KeepOnFailure);
    let mut session = ChatSession::new(server.clone(), controller);

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    session.set_compose_text("try again");
    assert!(session.submit_message());
    session.settle().await;
    assert_eq!(session.controller().compose_text(), "try again");

    server.recover(Operation::CreateMessage);
    assert!(session.submit_message());
    session.settle().await;
    assert_eq!(session.controller().compose_text(), "");
    assert_eq!(session.controller().messages()[0].content, "try again");
}

#[tokio::test]
async fn test_cancel_edit_sends_nothing() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    server.clear_requests();

    assert!(session.begin_edit(&MessageId::new("5")));
    session.update_draft("never sent");
    session.cancel_edit();

    assert_eq!(session.controller().edit_session(), &EditSession::Idle);
    assert!(!session.commit_edit());
    assert_eq!(session.in_flight(), 0);
    assert!(server.requests().is_empty());
    assert_eq!(server.get_message(&MessageId::new("5")).unwrap().content, "hi");
}

#[tokio::test]
async fn test_failed_update_still_resets_edit_session() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    server.fail(Operation::UpdateMessage);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    session.begin_edit(&MessageId::new("5"));
    session.update_draft("hi?");
    assert!(session.commit_edit());
    session.settle().await;

    assert_eq!(session.controller().edit_session(), &EditSession::Idle);
    assert_eq!(session.controller().messages()[0].content, "hi");
}

#[tokio::test]
async fn test_edit_timestamps_follow_server_clock() {
    let server = make_server(&[("1", "general")], vec![]);
    let start = Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap();
    server.set_clock(start);
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    session.set_compose_text("draft");
    session.submit_message();
    session.settle().await;

    let posted = session.controller().messages()[0].clone();
    assert_eq!(posted.created_at, start);
    assert!(!posted.is_edited());

    server.advance_clock(Duration::minutes(5));
    session.begin_edit(&posted.id);
    session.update_draft("final");
    session.commit_edit();
    session.settle().await;

    let edited = &session.controller().messages()[0];
    assert_eq!(edited.created_at, start);
    assert_eq!(edited.modified_at, start + Duration::minutes(5));
    assert!(edited.is_edited());
}

#[tokio::test]
async fn test_mutation_refresh_survives_reselecting_same_channel() {
    let server = make_server(&[("1", "general")], vec![make_message("5", "1", "hi")]);
    let mut session = ChatSession::new(server.clone(), SyncController::default());
    let general = Channel::new("1", "general");

    session.select_channel(Some(general.clone()));
    session.settle().await;
    assert!(session.delete_message(&MessageId::new("5")));
    session.select_channel(Some(general));

    let events = session.settle().await;
    assert!(events.contains(&SessionEvent::MutationSettled {
        kind: MutationKind::Delete,
        succeeded: true,
        refresh_issued: true,
    }));
    assert!(session.controller().messages().is_empty());
    assert_eq!(session.controller().phase(), Phase::Ready);
}

#[tokio::test]
async fn test_switching_channel_abandons_edit() {
    let server = make_server(
        &[("1", "general"), ("2", "random")],
        vec![make_message("5", "1", "hi")],
    );
    let mut session = ChatSession::new(server.clone(), SyncController::default());

    session.select_channel(Some(Channel::new("1", "general")));
    session.settle().await;
    assert!(session.begin_edit(&MessageId::new("5")));
    session.update_draft("hi from elsewhere");

    session.select_channel(Some(Channel::new("2", "random")));
    assert_eq!(session.controller().edit_session(), &EditSession::Idle);
    assert!(!session.commit_edit());
    session.settle().await;

    assert!(
        !server
            .requests()
            .iter()
            .any(|r| r.operation() == Operation::UpdateMessage)
    );
    assert_eq!(server.get_message(&MessageId::new("5")).unwrap().content, "hi");
}
