//! Synchronization of view state with the remote message store
//!
//! `SyncController` is a pure state machine: it hands out request tickets
//! and applies their settlements. `ChatSession` runs those requests as
//! asynchronous tasks and feeds the results back one at a time.

mod controller;
mod error;
mod session;

pub use controller::{FetchTicket, Mutation, MutationTicket, Outcome, SyncController};
pub use error::{ErrorLog, ErrorObserver, FetchError, FetchTarget, MutationError, MutationKind, SyncError};
pub use session::{ChatSession, SessionEvent};
