use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::engine::stats::TypingStats;
use crate::keyboard::index::ActiveLayout;
use crate::keyboard::key::KeyCode;
use crate::keyboard::layout::ModifierState;
use crate::keyboard::resolver::{character_for, is_typeable};
use crate::session::input::{IgnoreReason, KeystrokeOutcome, KeystrokeRecord};
use crate::session::result::SessionSummary;
use crate::session::timer::SessionTimer;
use crate::text::normalize::{expand, is_nasal_mark, normalize};
use crate::text::segment::segment;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Active,
    Completed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionReason {
    TargetConsumed,
    TimeLimit,
}

/// Character-by-character validation of one practice text.
///
/// The target is normalized and split into units, one per expected
/// keystroke. Every accepted non-empty keystroke consumes exactly one
/// unit; a mismatch is recorded in `error_positions` and typing moves on.
#[derive(Clone, Debug)]
pub struct TypingSession {
    target_text: String,
    initial_units: Vec<String>,
    units: Vec<String>,
    typed: Vec<String>,
    error_positions: BTreeSet<usize>,
    records: Vec<KeystrokeRecord>,
    state: SessionState,
    started_at: Option<Instant>,
    completed_at: Option<Instant>,
    completion: Option<CompletionReason>,
    timer: SessionTimer,
    layout_id: String,
}

impl TypingSession {
    pub fn new(text: &str, layout: &ActiveLayout<'_>, time_limit: Option<Duration>) -> Self {
        let target_text = normalize(text);
        let index = layout.index;
        let units = segment(&target_text, index.max_output_chars(), |s| index.is_producible(s));
        debug!(
            "new session: {} units from {} chars on '{}'",
            units.len(),
            target_text.chars().count(),
            layout.id()
        );
        Self {
            target_text,
            initial_units: units.clone(),
            units,
            typed: Vec::new(),
            error_positions: BTreeSet::new(),
            records: Vec::new(),
            state: SessionState::Idle,
            started_at: None,
            completed_at: None,
            completion: None,
            timer: SessionTimer::new(time_limit),
            layout_id: layout.id().to_string(),
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target_text(&self) -> &str {
        &self.target_text
    }

    pub fn units(&self) -> &[String] {
        &self.units
    }

    pub fn typed(&self) -> &[String] {
        &self.typed
    }

    pub fn position(&self) -> usize {
        self.typed.len()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn error_positions(&self) -> &BTreeSet<usize> {
        &self.error_positions
    }

    pub fn records(&self) -> &[KeystrokeRecord] {
        &self.records
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn completed_at(&self) -> Option<Instant> {
        self.completed_at
    }

    pub fn completion(&self) -> Option<CompletionReason> {
        self.completion
    }

    pub fn timer(&self) -> &SessionTimer {
        &self.timer
    }

    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Completed || self.position() >= self.units.len()
    }

    /// The unit the next keystroke is compared against.
    pub fn expected(&self) -> Option<&str> {
        self.units.get(self.position()).map(String::as_str)
    }

    pub fn is_error(&self, position: usize) -> bool {
        self.error_positions.contains(&position)
    }

    pub fn accept_keystroke(
        &mut self,
        layout: &ActiveLayout<'_>,
        key: KeyCode,
        state: ModifierState,
        now: Instant,
    ) -> KeystrokeOutcome {
        if self.is_complete() {
            return KeystrokeOutcome::Ignored(IgnoreReason::Completed);
        }
        if !is_typeable(layout, key) {
            return KeystrokeOutcome::Ignored(IgnoreReason::NotTypeable);
        }

        if self.state == SessionState::Idle {
            self.state = SessionState::Active;
            self.started_at = Some(now);
            info!("session started on '{}'", layout.id());
        }
        self.timer.start(now);

        let raw = character_for(layout, key, state);
        if raw.is_empty() {
            return KeystrokeOutcome::Ignored(IgnoreReason::EmptyOutput);
        }

        let typed = normalize(raw);
        let position = self.position();
        self.realign(position, &typed);
        let correct = self.units[position] == typed;

        self.typed.push(raw.to_string());
        if !correct {
            self.error_positions.insert(position);
        }
        self.layout_id = layout.id().to_string();

        let record = KeystrokeRecord {
            key,
            state,
            resolved: raw.to_string(),
            target_position: position,
            correct,
            timestamp: now,
        };
        self.records.push(record.clone());

        let completed = if self.position() == self.units.len() {
            Some(self.complete(now, CompletionReason::TargetConsumed))
        } else {
            None
        };

        KeystrokeOutcome::Accepted {
            record,
            position: self.position(),
            completed,
        }
    }

    /// Reconcile key granularity with the expected unit before comparing.
    ///
    /// A keystroke that spells the start of the unit splits it (अ then ा
    /// for आ). A keystroke that spells several upcoming units merges them
    /// (one conjunct key for द + ् + य). A nasal mark typed ahead of its
    /// matra reorders the units instead (ं then ा for ां). Units before
    /// `position` are never touched.
    fn realign(&mut self, position: usize, typed: &str) {
        if self.units[position] == typed {
            return;
        }
        if is_nasal_mark(typed) && self.realign_nasal(position, typed) {
            return;
        }
        let expected = &self.units[position];
        let typed_exp = expand(typed);
        let expected_exp = expand(expected);

        if expected_exp.len() > typed_exp.len() && expected_exp.starts_with(&typed_exp) {
            let rest = normalize(&expected_exp[typed_exp.len()..]);
            if !rest.is_empty() && normalize(&format!("{typed}{rest}")) == *expected {
                self.units[position] = typed.to_string();
                self.units.insert(position + 1, rest);
            }
            return;
        }

        if typed_exp.len() > expected_exp.len() && typed_exp.starts_with(&expected_exp) {
            let mut spelled = expected_exp;
            let mut end = position + 1;
            while spelled.len() < typed_exp.len() && end < self.units.len() {
                spelled.push_str(&expand(&self.units[end]));
                end += 1;
                if !typed_exp.starts_with(&spelled) {
                    return;
                }
            }
            if spelled == typed_exp && normalize(&self.units[position..end].concat()) == typed {
                self.units
                    .splice(position..end, std::iter::once(typed.to_string()));
            }
        }
    }

    fn realign_nasal(&mut self, position: usize, mark: &str) -> bool {
        let expected = self.units[position].clone();
        if let Some(matra) = expected.strip_suffix(mark)
            && !matra.is_empty()
            && normalize(&format!("{mark}{matra}")) == expected
        {
            let matra = matra.to_string();
            self.units[position] = mark.to_string();
            self.units.insert(position + 1, matra);
            return true;
        }
        if self.units.get(position + 1).map(String::as_str) == Some(mark)
            && normalize(&format!("{mark}{expected}")) == normalize(&format!("{expected}{mark}"))
        {
            self.units.swap(position, position + 1);
            return true;
        }
        false
    }

    fn complete(&mut self, now: Instant, reason: CompletionReason) -> SessionSummary {
        self.timer.stop(now);
        self.state = SessionState::Completed;
        self.completion = Some(reason);
        if self.completed_at.is_none() {
            self.completed_at = Some(now);
        }
        let summary = SessionSummary::from_session(self, now);
        info!(
            "session completed ({reason:?}): {:.1} wpm, {:.1}% accuracy",
            summary.wpm, summary.accuracy
        );
        summary
    }

    /// Drive the time budget. Returns the summary on the tick that ends the
    /// session, `None` otherwise.
    pub fn tick(&mut self, now: Instant) -> Option<SessionSummary> {
        if self.state != SessionState::Active {
            return None;
        }
        if self.timer.poll(now) {
            return Some(self.complete(now, CompletionReason::TimeLimit));
        }
        None
    }

    /// Suspend the clock. The next accepted keystroke resumes it.
    pub fn pause(&mut self, now: Instant) {
        if self.state == SessionState::Active {
            self.timer.pause(now);
        }
    }

    /// Back to the freshly created state, from any state.
    pub fn reset(&mut self) {
        self.units = self.initial_units.clone();
        self.typed.clear();
        self.error_positions.clear();
        self.records.clear();
        self.state = SessionState::Idle;
        self.started_at = None;
        self.completed_at = None;
        self.completion = None;
        self.timer.reset();
        info!("session reset");
    }

    pub fn elapsed_secs(&self, now: Instant) -> f64 {
        self.timer.elapsed(now).as_secs_f64()
    }

    pub fn correct_count(&self) -> usize {
        self.position() - self.error_positions.len()
    }

    pub fn stats(&self, now: Instant) -> TypingStats {
        TypingStats::compute(
            self.position(),
            self.correct_count(),
            self.error_positions.len(),
            self.elapsed_secs(now),
        )
    }

    pub fn progress(&self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        self.position() as f64 / self.units.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyboard::catalog::bundled_layout;
    use crate::keyboard::index::LayoutIndex;
    use crate::keyboard::layout::KeyboardLayout;

    use KeyCode::*;
    use ModifierState::*;

    struct Fixture {
        layout: KeyboardLayout,
        index: LayoutIndex,
    }

    impl Fixture {
        fn new(id: &str) -> Self {
            let layout = bundled_layout(id).unwrap();
            let index = LayoutIndex::build(&layout);
            Self { layout, index }
        }

        fn active(&self) -> ActiveLayout<'_> {
            ActiveLayout::new(&self.layout, &self.index)
        }
    }

    fn press(
        session: &mut TypingSession,
        fx: &Fixture,
        keys: &[(KeyCode, ModifierState)],
        t0: Instant,
    ) -> Vec<KeystrokeOutcome> {
        keys.iter()
            .enumerate()
            .map(|(i, &(k, s))| {
                session.accept_keystroke(&fx.active(), k, s, t0 + Duration::from_millis(200 * i as u64))
            })
            .collect()
    }

    #[test]
    fn test_new_session_is_idle() {
        let fx = Fixture::new("remington-gail");
        let session = TypingSession::new("कमल", &fx.active(), None);
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.len(), 3);
        assert_eq!(session.position(), 0);
        assert!(session.started_at().is_none());
        assert_eq!(session.stats(Instant::now()), TypingStats::default());
    }

    #[test]
    fn test_single_vowel_completes() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("अ", &fx.active(), None);
        let out = session.accept_keystroke(&fx.active(), KeyV, Normal, Instant::now());
        assert!(out.summary().is_some());
        assert_eq!(session.position(), 1);
        assert!(session.error_positions().is_empty());
        assert_eq!(session.state(), SessionState::Completed);
    }

    #[test]
    fn test_direct_long_vowel_key() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("आ", &fx.active(), None);
        assert_eq!(session.units(), &["आ".to_string()]);
        session.accept_keystroke(&fx.active(), KeyE, Shift, Instant::now());
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
    }

    #[test]
    fn test_composed_vowel_from_two_keystrokes() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("आम", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyV, Normal), (KeyK, Normal), (KeyE, Normal)], t0);
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
        assert_eq!(session.units(), &["अ", "ा", "म"]);
    }

    #[test]
    fn test_o_matra_typed_as_aa_plus_e() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("को", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyD, Normal), (KeyK, Normal), (KeyS, Normal)], t0);
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
    }

    #[test]
    fn test_nasalised_matra_key_or_two_strokes() {
        let fx = Fixture::new("remington-gail");
        let t0 = Instant::now();

        let mut one = TypingSession::new("में", &fx.active(), None);
        press(&mut one, &fx, &[(KeyE, Normal), (KeyS, AltGr)], t0);
        assert_eq!(one.state(), SessionState::Completed);
        assert!(one.error_positions().is_empty());

        let mut two = TypingSession::new("में", &fx.active(), None);
        press(&mut two, &fx, &[(KeyE, Normal), (KeyS, Normal), (KeyA, Normal)], t0);
        assert_eq!(two.state(), SessionState::Completed);
        assert!(two.error_positions().is_empty());
    }

    #[test]
    fn test_nasal_mark_before_matra_on_combined_key_layout() {
        let fx = Fixture::new("remington-gail");
        let t0 = Instant::now();

        let mut kaan = TypingSession::new("कां", &fx.active(), None);
        assert_eq!(kaan.units(), &["क", "ां"]);
        let outcomes = press(&mut kaan, &fx, &[(KeyD, Normal), (KeyA, Normal), (KeyK, Normal)], t0);
        assert!(outcomes[1].summary().is_none());
        assert!(outcomes[2].summary().is_some());
        assert!(kaan.error_positions().is_empty());
        assert_eq!(kaan.units(), &["क", "ं", "ा"]);
        assert_eq!(normalize(&kaan.typed().concat()), kaan.target_text());

        let mut men = TypingSession::new("में", &fx.active(), None);
        press(&mut men, &fx, &[(KeyE, Normal), (KeyA, Normal), (KeyS, Normal)], t0);
        assert_eq!(men.state(), SessionState::Completed);
        assert!(men.error_positions().is_empty());
        assert_eq!(men.position(), 3);
    }

    #[test]
    fn test_nasal_mark_before_matra_on_split_key_layout() {
        let fx = Fixture::new("inscript");
        let mut session = TypingSession::new("कां", &fx.active(), None);
        assert_eq!(session.units(), &["क", "ा", "ं"]);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyK, Normal), (KeyX, Normal), (KeyE, Normal)], t0);
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
        assert_eq!(session.units(), &["क", "ं", "ा"]);
    }

    #[test]
    fn test_stray_nasal_mark_is_still_an_error() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("कम", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyD, Normal), (KeyA, Normal)], t0);
        assert_eq!(session.error_positions().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(session.units(), &["क", "म"]);
    }

    #[test]
    fn test_conjunct_key_merges_codepoint_units() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("द्य", &fx.active(), None);
        assert_eq!(session.len(), 1);
        // Re-split the target the long way round, as if segmented elsewhere.
        session.units = vec!["द".to_string(), "्".to_string(), "य".to_string()];
        session.initial_units = session.units.clone();
        session.accept_keystroke(&fx.active(), Backquote, Shift, Instant::now());
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
    }

    #[test]
    fn test_mismatch_is_recorded_and_advances() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("कमल", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyD, Normal), (KeyY, Normal)], t0);
        assert_eq!(session.position(), 2);
        assert_eq!(session.error_positions().iter().copied().collect::<Vec<_>>(), vec![1]);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_space_matches_literal_space() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("अ अ", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyV, Normal), (Space, Shift), (KeyV, Normal)], t0);
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.error_positions().is_empty());
    }

    #[test]
    fn test_non_typeable_keys_are_ignored_and_do_not_start() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("अ", &fx.active(), None);
        let now = Instant::now();
        for key in [ShiftLeft, AltRight, Backspace, Enter, Tab, Escape, IntlBackslash] {
            let out = session.accept_keystroke(&fx.active(), key, Normal, now);
            assert!(matches!(out, KeystrokeOutcome::Ignored(IgnoreReason::NotTypeable)));
        }
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_empty_slot_is_ignored_but_starts_session() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("अ", &fx.active(), None);
        let out = session.accept_keystroke(&fx.active(), KeyJ, AltGrShift, Instant::now());
        assert!(matches!(out, KeystrokeOutcome::Ignored(IgnoreReason::EmptyOutput)));
        assert_eq!(session.position(), 0);
        assert_eq!(session.state(), SessionState::Active);
    }

    #[test]
    fn test_completed_session_ignores_keystrokes_and_summarises_once() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("अ", &fx.active(), None);
        let t0 = Instant::now();
        let first = session.accept_keystroke(&fx.active(), KeyV, Normal, t0);
        assert!(first.summary().is_some());
        let completed_at = session.completed_at();
        let again = session.accept_keystroke(&fx.active(), KeyV, Normal, t0 + Duration::from_secs(1));
        assert!(matches!(again, KeystrokeOutcome::Ignored(IgnoreReason::Completed)));
        assert!(session.tick(t0 + Duration::from_secs(100)).is_none());
        assert_eq!(session.completed_at(), completed_at);
    }

    #[test]
    fn test_time_limit_completes_once() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("कमल", &fx.active(), Some(Duration::from_secs(10)));
        let t0 = Instant::now();
        assert!(session.tick(t0 + Duration::from_secs(20)).is_none());
        session.accept_keystroke(&fx.active(), KeyD, Normal, t0);
        assert!(session.tick(t0 + Duration::from_secs(5)).is_none());
        let summary = session.tick(t0 + Duration::from_secs(11)).unwrap();
        assert_eq!(summary.reason, CompletionReason::TimeLimit);
        assert!((summary.elapsed_secs - 10.0).abs() < 1e-9);
        assert_eq!(session.state(), SessionState::Completed);
        assert!(session.tick(t0 + Duration::from_secs(12)).is_none());
    }

    #[test]
    fn test_pause_stops_clock_until_next_keystroke() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("कमल", &fx.active(), None);
        let t0 = Instant::now();
        session.accept_keystroke(&fx.active(), KeyD, Normal, t0);
        session.pause(t0 + Duration::from_secs(2));
        assert!((session.elapsed_secs(t0 + Duration::from_secs(50)) - 2.0).abs() < 1e-9);
        session.accept_keystroke(&fx.active(), KeyE, Normal, t0 + Duration::from_secs(50));
        assert!((session.elapsed_secs(t0 + Duration::from_secs(51)) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("आम", &fx.active(), None);
        let t0 = Instant::now();
        press(&mut session, &fx, &[(KeyV, Normal), (KeyQ, Normal)], t0);
        assert_eq!(session.len(), 3);
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert_eq!(session.position(), 0);
        assert_eq!(session.len(), 2);
        assert!(session.error_positions().is_empty());
        assert!(session.records().is_empty());
        assert!(session.started_at().is_none());
    }

    #[test]
    fn test_position_is_monotonic_and_errors_stay_behind_cursor() {
        let fx = Fixture::new("inscript");
        let mut session = TypingSession::new("नमस्ते दुनिया", &fx.active(), None);
        let t0 = Instant::now();
        let keys = [KeyV, KeyC, KeyM, KeyD, KeyL, KeyS, Space, KeyO, KeyG, KeyV, KeyF, KeyY, KeyE, KeyQ];
        let mut last = 0;
        for (i, key) in keys.iter().enumerate() {
            session.accept_keystroke(&fx.active(), *key, Normal, t0 + Duration::from_millis(i as u64 * 150));
            assert!(session.position() >= last);
            last = session.position();
            assert!(session.error_positions().iter().all(|&p| p < session.position()));
            assert_eq!(session.typed().len(), session.position());
        }
    }

    #[test]
    fn test_layout_switch_keeps_recorded_errors() {
        let remington = Fixture::new("remington-gail");
        let inscript = Fixture::new("inscript");
        let mut session = TypingSession::new("अआ", &remington.active(), None);
        let t0 = Instant::now();
        // Wrong key on Remington, then the right key on INSCRIPT.
        session.accept_keystroke(&remington.active(), KeyC, Normal, t0);
        let before: Vec<usize> = session.error_positions().iter().copied().collect();
        session.accept_keystroke(&inscript.active(), KeyE, Shift, t0 + Duration::from_millis(300));
        assert_eq!(session.error_positions().iter().copied().collect::<Vec<_>>(), before);
        assert_eq!(session.state(), SessionState::Completed);
        assert_eq!(session.layout_id(), "inscript");
    }

    #[test]
    fn test_empty_target_is_complete_and_ignores_input() {
        let fx = Fixture::new("remington-gail");
        let mut session = TypingSession::new("", &fx.active(), None);
        assert!(session.is_complete());
        let out = session.accept_keystroke(&fx.active(), KeyV, Normal, Instant::now());
        assert!(matches!(out, KeystrokeOutcome::Ignored(IgnoreReason::Completed)));
        assert_eq!(session.progress(), 0.0);
    }
}
