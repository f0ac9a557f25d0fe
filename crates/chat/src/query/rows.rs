//! Row projections of channels and messages

use chrono::{DateTime, Utc};
use std::fmt;

use crate::models::{ChannelId, MessageId};
use crate::state::Phase;
use crate::sync::SyncController;

/// One message as a UI row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRow {
    pub id: MessageId,
    pub content: String,
    pub posted_at: DateTime<Utc>,
    /// Content changed after posting
    pub edited: bool,
    /// This message is the target of the edit session
    pub editing: bool,
}

/// One channel as a UI row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRow {
    pub id: ChannelId,
    pub name: String,
    pub active: bool,
}

/// Header line describing the current selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    SelectChannel,
    Loading { name: String },
    Current { name: String },
}

impl fmt::Display for StatusLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusLine::SelectChannel => write!(f, "Select a channel."),
            StatusLine::Loading { name } => write!(f, "Current channel: {} (loading)", name),
            StatusLine::Current { name } => write!(f, "Current channel: {}", name),
        }
    }
}

/// Messages of the active channel in server order
pub fn message_rows(controller: &SyncController) -> Vec<MessageRow> {
    let editing = controller.edit_session().target();
    controller
        .messages()
        .iter()
        .map(|m| MessageRow {
            id: m.id.clone(),
            content: m.content.clone(),
            posted_at: m.created_at,
            edited: m.is_edited(),
            editing: editing == Some(&m.id),
        })
        .collect()
}

/// Fetched channels with the active one flagged
pub fn channel_rows(controller: &SyncController) -> Vec<ChannelRow> {
    let active = controller.active_channel().map(|c| &c.id);
    controller
        .channels()
        .as_slice()
        .iter()
        .map(|c| ChannelRow {
            id: c.id.clone(),
            name: c.name.clone(),
            active: active == Some(&c.id),
        })
        .collect()
}

pub fn status_line(controller: &SyncController) -> StatusLine {
    match (controller.active_channel(), controller.phase()) {
        (None, _) => StatusLine::SelectChannel,
        (Some(channel), Phase::Loading) => StatusLine::Loading {
            name: channel.name.clone(),
        },
        (Some(channel), _) => StatusLine::Current {
            name: channel.name.clone(),
        },
    }
}
