//! Undo/redo over the data store.
//!
//! Changes are recorded as key-level patches after the reducer commits.
//! A global stack holds every change; in event mode each open event gets its
//! own stack instead.

pub mod recorder;
pub mod stack;
pub mod state;

pub use recorder::capture;
pub use stack::{ConflictStatus, HistoryItem, HistoryStack, HistoryStatus};
pub use state::{HistoryMode, HistoryState};

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HistoryError {
    #[error("no history entry with id {0}")]
    EntryNotFound(Uuid),
    #[error("no history recorded for event {0}")]
    UnknownEvent(String),
}
