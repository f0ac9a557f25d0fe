//! Plain-text rendering of the session state

use chat::{
    ChannelRow, EditSession, MessageRow, MutationKind, Outcome, Phase, SessionEvent,
    SyncController, channel_rows, message_rows, status_line,
};
use chrono::{Local, TimeZone};
use std::fmt::{self, Write};

/// Header, messages and edit state of the current channel
pub fn render_view(controller: &SyncController) -> String {
    render_view_in(controller, &Local)
}

fn render_view_in<Tz>(controller: &SyncController, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(controller));

    if controller.active_channel().is_some() {
        let rows = message_rows(controller);
        if rows.is_empty() && controller.phase() == Phase::Ready {
            out.push_str("  (no messages)\n");
        }
        for (index, row) in rows.iter().enumerate() {
            let _ = writeln!(out, "{}", format_message(index + 1, row, tz));
        }
    }

    if let EditSession::Editing { draft, .. } = controller.edit_session() {
        let _ = writeln!(out, "  editing: {}  (/draft <text>, /save, /cancel)", draft);
    }
    out
}

fn format_message<Tz>(number: usize, row: &MessageRow, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let marker = if row.editing { '*' } else { ' ' };
    let posted = row.posted_at.with_timezone(tz).format("%Y-%m-%d %H:%M");
    let mut line = format!("{}{:>3}. [{}] {}", marker, number, posted, row.content);
    if row.edited {
        line.push_str(" (edited)");
    }
    line
}

pub fn render_channels(controller: &SyncController) -> String {
    let rows = channel_rows(controller);
    if rows.is_empty() {
        return "No channels loaded.\n".to_string();
    }
    rows.iter()
        .enumerate()
        .map(|(index, row)| format_channel(index + 1, row))
        .collect()
}

fn format_channel(number: usize, row: &ChannelRow) -> String {
    let marker = if row.active { '>' } else { ' ' };
    format!("{}{:>3}. {}\n", marker, number, row.name)
}

/// One feedback line for a settled request, if it deserves one
pub fn describe_event(event: &SessionEvent) -> Option<String> {
    match event {
        SessionEvent::ChannelsLoaded(Outcome::Failed) => {
            Some("Could not load channels.".to_string())
        }
        SessionEvent::MessagesLoaded(Outcome::Failed) => {
            Some("Could not load messages.".to_string())
        }
        SessionEvent::MutationSettled {
            kind,
            succeeded: false,
            ..
        } => {
            let action = match kind {
                MutationKind::Create => "post",
                MutationKind::Update => "update",
                MutationKind::Delete => "delete",
            };
            Some(format!("Failed to {} message.", action))
        }
        _ => None,
    }
}
