//! Errors reported by the sync controller
//!
//! These never propagate out of the controller. They are logged and handed
//! to an optional [`ErrorObserver`].

use std::fmt;
use std::sync::Mutex;

use crate::models::ChannelId;
use crate::remote::ApiError;

/// Which list a failed read was for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTarget {
    Channels,
    Messages,
}

impl fmt::Display for FetchTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchTarget::Channels => "channels",
            FetchTarget::Messages => "messages",
        })
    }
}

/// A read (channel list or message list) failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to fetch {target}: {source}")]
pub struct FetchError {
    pub target: FetchTarget,
    /// Channel the message fetch was issued for
    pub channel_id: Option<ChannelId>,
    pub source: ApiError,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        })
    }
}

/// A create, update or delete failed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("failed to {kind} message: {source}")]
pub struct MutationError {
    pub kind: MutationKind,
    pub source: ApiError,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Receives every error the controller swallows
pub trait ErrorObserver: Send + Sync {
    fn on_error(&self, error: &SyncError);
}

/// Observer that keeps every reported error
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Mutex<Vec<SyncError>>,
}

impl ErrorLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Errors reported so far, oldest first
    pub fn errors(&self) -> Vec<SyncError> {
        self.errors.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.errors.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ErrorObserver for ErrorLog {
    fn on_error(&self, error: &SyncError) {
        if let Ok(mut errors) = self.errors.lock() {
            errors.push(error.clone());
        }
    }
}
