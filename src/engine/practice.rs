use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::engine::stats::TypingStats;
use crate::keyboard::finger::FingerAssignment;
use crate::keyboard::index::Candidate;
use crate::keyboard::key::KeyCode;
use crate::keyboard::layout::ModifierState;
use crate::keyboard::registry::LayoutRegistry;
use crate::keyboard::resolver::{first_keystroke, modifier_state_for};
use crate::session::input::{IgnoreReason, KeystrokeOutcome};
use crate::session::result::SessionSummary;
use crate::session::typing::{SessionState, TypingSession};
use crate::text::normalize;

/// What the host renders after each event.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSnapshot {
    pub position: usize,
    pub total: usize,
    pub error_positions: Vec<usize>,
    pub modifier_state: ModifierState,
    pub state: SessionState,
    pub completed: bool,
    pub stats: TypingStats,
    pub remaining: Option<Duration>,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            position: 0,
            total: 0,
            error_positions: Vec::new(),
            modifier_state: ModifierState::Normal,
            state: SessionState::Idle,
            completed: false,
            stats: TypingStats::default(),
            remaining: None,
        }
    }
}

/// The key to press next, for on-screen guidance. `keystroke` is what
/// that key emits, which is only part of `character` when the unit takes
/// several keystrokes.
#[derive(Clone, Debug, PartialEq)]
pub struct Guidance {
    pub character: String,
    pub keystroke: String,
    pub candidate: Candidate,
    pub label: String,
    pub finger: FingerAssignment,
}

/// Registry plus the current session, behind the host's input boundary:
/// raw key identifiers and pressed-key snapshots in, snapshots out.
pub struct PracticeEngine {
    registry: LayoutRegistry,
    session: Option<TypingSession>,
    time_limit: Option<Duration>,
    modifier_state: ModifierState,
}

impl PracticeEngine {
    pub fn new(registry: LayoutRegistry, time_limit: Option<Duration>) -> Self {
        Self {
            registry,
            session: None,
            time_limit: time_limit.filter(|d| !d.is_zero()),
            modifier_state: ModifierState::Normal,
        }
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn session(&self) -> Option<&TypingSession> {
        self.session.as_ref()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Switch layouts. The running session keeps its recorded results and
    /// resolves later keystrokes with the new layout.
    pub fn select_layout(&mut self, id: &str) -> bool {
        self.registry.select_layout(id)
    }

    pub fn select_next_layout(&mut self) -> String {
        self.registry.select_next().to_string()
    }

    /// Assign a new practice text. Text that normalizes to nothing is
    /// refused and the current session is kept.
    pub fn start_text(&mut self, text: &str) -> bool {
        let normalized = normalize(text.trim());
        if normalized.is_empty() {
            debug!("refusing empty practice text");
            return false;
        }
        let session = TypingSession::new(&normalized, &self.registry.active(), self.time_limit);
        info!(
            "assigned practice text of {} units on '{}'",
            session.len(),
            self.registry.current_layout().id()
        );
        self.session = Some(session);
        true
    }

    pub fn modifier_state_for_pressed(&self, pressed: &HashSet<String>) -> ModifierState {
        modifier_state_for(
            &self.registry.active(),
            pressed.iter().filter_map(|id| KeyCode::parse(id)),
        )
    }

    /// One key-press event from the host.
    pub fn handle_key(
        &mut self,
        key_id: &str,
        pressed: &HashSet<String>,
        now: Instant,
    ) -> KeystrokeOutcome {
        self.modifier_state = self.modifier_state_for_pressed(pressed);
        let Some(key) = KeyCode::parse(key_id) else {
            debug!("unmapped key identifier '{key_id}'");
            return KeystrokeOutcome::Ignored(IgnoreReason::NotTypeable);
        };
        let Some(session) = self.session.as_mut() else {
            return KeystrokeOutcome::Ignored(IgnoreReason::NoSession);
        };
        session.accept_keystroke(&self.registry.active(), key, self.modifier_state, now)
    }

    pub fn tick(&mut self, now: Instant) -> Option<SessionSummary> {
        self.session.as_mut().and_then(|s| s.tick(now))
    }

    pub fn pause(&mut self, now: Instant) {
        if let Some(session) = self.session.as_mut() {
            session.pause(now);
        }
    }

    pub fn reset(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.reset();
        }
    }

    pub fn snapshot(&self, now: Instant) -> SessionSnapshot {
        let Some(session) = self.session.as_ref() else {
            return SessionSnapshot {
                modifier_state: self.modifier_state,
                ..SessionSnapshot::default()
            };
        };
        SessionSnapshot {
            position: session.position(),
            total: session.len(),
            error_positions: session.error_positions().iter().copied().collect(),
            modifier_state: self.modifier_state,
            state: session.state(),
            completed: session.state() == SessionState::Completed,
            stats: session.stats(now),
            remaining: session.timer().remaining(now),
        }
    }

    /// Preferred first key for the next expected unit under the active
    /// layout.
    pub fn guidance(&self) -> Option<Guidance> {
        let session = self.session.as_ref()?;
        if session.is_complete() {
            return None;
        }
        let expected = session.expected()?;
        let active = self.registry.active();
        let (candidate, keystroke) = first_keystroke(&active, expected)?;
        let mapping = active.mapping(candidate.key)?;
        Some(Guidance {
            character: expected.to_string(),
            keystroke,
            candidate,
            label: mapping.label.clone(),
            finger: mapping.assignment(),
        })
    }
}
