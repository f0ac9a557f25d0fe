//! Query API for UI consumption
//!
//! Read-only projections of controller state, shaped for rendering.

mod rows;

pub use rows::{ChannelRow, MessageRow, StatusLine, channel_rows, message_rows, status_line};
