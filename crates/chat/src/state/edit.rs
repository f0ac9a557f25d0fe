//! Edit session and compose draft

use crate::models::{Message, MessageId};
use serde::{Deserialize, Serialize};

/// The message being edited, if any
///
/// Being a single variant, at most one message can be in edit mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing { message_id: MessageId, draft: String },
}

impl EditSession {
    /// Start editing `message`, seeding the draft with its current content
    ///
    /// Any edit already in progress is discarded.
    pub fn begin(&mut self, message: &Message) {
        *self = EditSession::Editing {
            message_id: message.id.clone(),
            draft: message.content.clone(),
        };
    }

    /// Replace the draft text; returns false when idle
    pub fn update_draft(&mut self, text: impl Into<String>) -> bool {
        match self {
            EditSession::Editing { draft, .. } => {
                *draft = text.into();
                true
            }
            EditSession::Idle => false,
        }
    }

    pub fn reset(&mut self) {
        *self = EditSession::Idle;
    }

    pub fn is_active(&self) -> bool {
        matches!(self, EditSession::Editing { .. })
    }

    pub fn target(&self) -> Option<&MessageId> {
        match self {
            EditSession::Editing { message_id, .. } => Some(message_id),
            EditSession::Idle => None,
        }
    }

    pub fn draft(&self) -> Option<&str> {
        match self {
            EditSession::Editing { draft, .. } => Some(draft.as_str()),
            EditSession::Idle => None,
        }
    }
}

/// What happens to the compose draft when a post settles
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPolicy {
    /// Clear on success and on failure
    #[default]
    ClearAlways,
    /// Clear on success only, so a failed post can be retried
    KeepOnFailure,
}

/// Text buffer for a new message in the active channel
#[derive(Debug, Clone, Default)]
pub struct ComposeDraft {
    text: String,
    policy: DraftPolicy,
}

impl ComposeDraft {
    pub fn new(policy: DraftPolicy) -> Self {
        Self {
            text: String::new(),
            policy,
        }
    }

    pub fn set(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn policy(&self) -> DraftPolicy {
        self.policy
    }

    /// Apply the draft policy after a post attempt
    pub fn settle(&mut self, succeeded: bool) {
        if succeeded || self.policy == DraftPolicy::ClearAlways {
            self.text.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(id: &str, content: &str) -> Message {
        Message::builder(id, "1").content(content).build()
    }

    #[test]
    fn test_begin_seeds_draft() {
        let mut session = EditSession::default();
        session.begin(&msg("5", "hi"));

        assert!(session.is_active());
        assert_eq!(session.target(), Some(&MessageId::new("5")));
        assert_eq!(session.draft(), Some("hi"));
    }

    #[test]
    fn test_begin_discards_previous_draft() {
        let mut session = EditSession::default();
        session.begin(&msg("a", "first"));
        session.update_draft("first, changed");
        session.begin(&msg("b", "second"));

        assert_eq!(
            session,
            EditSession::Editing {
                message_id: MessageId::new("b"),
                draft: "second".to_string(),
            }
        );
    }

    #[test]
    fn test_update_draft_when_idle() {
        let mut session = EditSession::Idle;
        assert!(!session.update_draft("ignored"));
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn test_empty_draft_is_allowed() {
        let mut session = EditSession::default();
        session.begin(&msg("5", "hi"));
        assert!(session.update_draft(""));
        assert_eq!(session.draft(), Some(""));
    }

    #[test]
    fn test_clear_always_policy() {
        let mut draft = ComposeDraft::new(DraftPolicy::ClearAlways);
        draft.set("hello");
        draft.settle(false);
        assert_eq!(draft.text(), "");
    }

    #[test]
    fn test_keep_on_failure_policy() {
        let mut draft = ComposeDraft::new(DraftPolicy::KeepOnFailure);
        draft.set("hello");
        draft.settle(false);
        assert_eq!(draft.text(), "hello");
        draft.settle(true);
        assert_eq!(draft.text(), "");
    }

    #[test]
    fn test_policy_serialization() {
        let json = serde_json::to_string(&DraftPolicy::KeepOnFailure).unwrap();
        assert_eq!(json, r#""keep_on_failure""#);
    }
}
