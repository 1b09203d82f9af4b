//! Ledger entry reasons
//!
//! The ledger stores the reason as a single human-readable string
//! (`"Completed: Dishes"`). That string doubles as the semantic tag the
//! reducer and aggregator classify on, so it is parsed into a [`Reason`]
//! exactly once when entries are read, and formatted through [`Reason`]
//! on every write. No other code touches the prefixes.

use std::fmt;

const COMPLETED_PREFIX: &str = "Completed: ";
const SKIPPED_PREFIX: &str = "Skipped: ";
const UNDO_PREFIX: &str = "Undo: ";

/// Semantic classification of a ledger entry, with the chore title it
/// was recorded against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    Completed(String),
    Skipped(String),
    Undo(String),
}

impl Reason {
    pub fn completed(title: &str) -> Self {
        Reason::Completed(title.to_string())
    }

    pub fn skipped(title: &str) -> Self {
        Reason::Skipped(title.to_string())
    }

    pub fn undo(title: &str) -> Self {
        Reason::Undo(title.to_string())
    }

    /// Parse a stored reason string. Returns `None` for anything that is
    /// not one of the three canonical shapes; such entries are invisible
    /// to the status reducer and the aggregator.
    pub fn parse(raw: &str) -> Option<Reason> {
        if let Some(title) = raw.strip_prefix(COMPLETED_PREFIX) {
            Some(Reason::Completed(title.to_string()))
        } else if let Some(title) = raw.strip_prefix(SKIPPED_PREFIX) {
            Some(Reason::Skipped(title.to_string()))
        } else if let Some(title) = raw.strip_prefix(UNDO_PREFIX) {
            Some(Reason::Undo(title.to_string()))
        } else {
            None
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Reason::Completed(t) | Reason::Skipped(t) | Reason::Undo(t) => t,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reason::Completed(t) => write!(f, "{}{}", COMPLETED_PREFIX, t),
            Reason::Skipped(t) => write!(f, "{}{}", SKIPPED_PREFIX, t),
            Reason::Undo(t) => write!(f, "{}{}", UNDO_PREFIX, t),
        }
    }
}
