use std::time::Instant;

use crate::keyboard::key::KeyCode;
use crate::keyboard::layout::ModifierState;
use crate::session::result::SessionSummary;

/// One accepted keystroke. Append-only per session.
#[derive(Clone, Debug)]
pub struct KeystrokeRecord {
    pub key: KeyCode,
    pub state: ModifierState,
    /// Raw layout output, before normalization.
    pub resolved: String,
    pub target_position: usize,
    pub correct: bool,
    pub timestamp: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Modifier, control, or a key the layout does not map.
    NotTypeable,
    /// The session already finished.
    Completed,
    /// The key exists but produces nothing under this modifier state.
    EmptyOutput,
    /// No practice text has been assigned.
    NoSession,
}

#[derive(Clone, Debug)]
pub enum KeystrokeOutcome {
    Ignored(IgnoreReason),
    Accepted {
        record: KeystrokeRecord,
        /// Cursor after the keystroke.
        position: usize,
        /// Set on the keystroke that finished the target, and only then.
        completed: Option<SessionSummary>,
    },
}

impl KeystrokeOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, KeystrokeOutcome::Accepted { .. })
    }

    pub fn summary(&self) -> Option<&SessionSummary> {
        match self {
            KeystrokeOutcome::Accepted { completed, .. } => completed.as_ref(),
            KeystrokeOutcome::Ignored(_) => None,
        }
    }
}
