//! Line commands typed at the prompt
//!
//! Lines starting with `/` are commands; anything else is posted to the
//! active channel.

use chat::{ChatSession, message_rows};

/// A parsed input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Blank line
    Nothing,
    Help,
    Channels,
    /// Select by 1-based index, ID or name
    Join(String),
    Leave,
    /// Start editing the n-th message (1-based)
    Edit(usize),
    Draft(String),
    Save,
    Cancel,
    /// Delete the n-th message (1-based)
    Delete(usize),
    Refresh,
    Quit,
    Post(String),
}

/// What the input loop should do after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShowChannels,
    ShowHelp,
    Quit,
}

pub const HELP: &str = "\
Commands:
  /channels            list channels
  /join <n|id|name>    select a channel
  /leave               clear the selection
  /edit <n>            edit message n
  /draft <text>        replace the edit draft
  /save                send the edit
  /cancel              stop editing
  /delete <n>          delete message n
  /refresh             reload messages
  /help                show this help
  /quit                exit
Any other line is posted to the current channel.";

pub fn parse(line: &str) -> Result<Command, String> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return Ok(Command::Nothing);
    }
    let Some(rest) = line.strip_prefix('/') else {
        return Ok(Command::Post(line.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    match name {
        "help" | "h" => Ok(Command::Help),
        "channels" => Ok(Command::Channels),
        "join" => {
            if arg.is_empty() {
                Err("Usage: /join <n|id|name>".to_string())
            } else {
                Ok(Command::Join(arg.to_string()))
            }
        }
        "leave" => Ok(Command::Leave),
        "edit" => parse_index(arg, "/edit <n>").map(Command::Edit),
        "draft" => Ok(Command::Draft(arg.to_string())),
        "save" => Ok(Command::Save),
        "cancel" => Ok(Command::Cancel),
        "delete" => parse_index(arg, "/delete <n>").map(Command::Delete),
        "refresh" => Ok(Command::Refresh),
        "quit" | "q" => Ok(Command::Quit),
        other => Err(format!("Unknown command: /{} (try /help)", other)),
    }
}

fn parse_index(arg: &str, usage: &str) -> Result<usize, String> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("Usage: {}", usage)),
    }
}

/// Run a command against the session
///
/// Must be called inside a tokio runtime since commands may issue requests.
pub fn execute(command: Command, session: &mut ChatSession) -> Result<Flow, String> {
    match command {
        Command::Nothing => {}
        Command::Help => return Ok(Flow::ShowHelp),
        Command::Channels => return Ok(Flow::ShowChannels),
        Command::Join(key) => {
            let channels = session.controller().channels();
            let channel = match key.parse::<usize>() {
                Ok(n) if n > 0 && n <= channels.as_slice().len() => {
                    Some(&channels.as_slice()[n - 1])
                }
                _ => channels.find(&key),
            }
            .cloned()
            .ok_or_else(|| format!("No such channel: {}", key))?;
            session.select_channel(Some(channel));
        }
        Command::Leave => session.select_channel(None),
        Command::Edit(n) => {
            let id = message_id_at(session, n)?;
            session.begin_edit(&id);
        }
        Command::Draft(text) => {
            if !session.update_draft(text) {
                return Err("Not editing a message (use /edit <n>)".to_string());
            }
        }
        Command::Save => {
            if !session.controller().edit_session().is_active() {
                return Err("Not editing a message".to_string());
            }
            if !session.commit_edit() {
                return Err("Another change is still being sent".to_string());
            }
        }
        Command::Cancel => session.cancel_edit(),
        Command::Delete(n) => {
            let id = message_id_at(session, n)?;
            if !session.delete_message(&id) {
                return Err("Another change is still being sent".to_string());
            }
        }
        Command::Refresh => session.refresh(),
        Command::Quit => return Ok(Flow::Quit),
        Command::Post(text) => {
            if session.controller().active_channel().is_none() {
                return Err("Select a channel first (/channels, /join <n>)".to_string());
            }
            session.set_compose_text(text);
            if !session.submit_message() {
                return Err("Another change is still being sent".to_string());
            }
        }
    }
    Ok(Flow::Continue)
}

fn message_id_at(session: &ChatSession, n: usize) -> Result<chat::MessageId, String> {
    message_rows(session.controller())
        .into_iter()
        .nth(n - 1)
        .map(|row| row.id)
        .ok_or_else(|| format!("No message #{}", n))
}
