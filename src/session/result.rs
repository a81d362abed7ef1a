use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::keyboard::key::KeyCode;
use crate::session::input::KeystrokeRecord;
use crate::session::typing::{CompletionReason, TypingSession};

/// Final figures for a finished session, as stored in history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionSummary {
    pub wpm: f64,
    pub cpm: f64,
    pub accuracy: f64,
    pub correct: usize,
    pub incorrect: usize,
    /// Keystrokes accepted.
    pub typed: usize,
    /// Units in the target at completion.
    pub total_units: usize,
    pub elapsed_secs: f64,
    pub timestamp: DateTime<Utc>,
    pub layout_id: String,
    pub reason: CompletionReason,
    #[serde(default)]
    pub per_key_times: Vec<KeyTime>,
}

/// Time from the previous accepted keystroke to this one.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct KeyTime {
    pub key: KeyCode,
    pub time_ms: f64,
    pub correct: bool,
}

pub fn key_times(records: &[KeystrokeRecord]) -> Vec<KeyTime> {
    records
        .windows(2)
        .map(|pair| KeyTime {
            key: pair[1].key,
            time_ms: pair[1]
                .timestamp
                .duration_since(pair[0].timestamp)
                .as_secs_f64()
                * 1000.0,
            correct: pair[1].correct,
        })
        .collect()
}

impl SessionSummary {
    pub fn from_session(session: &TypingSession, now: Instant) -> Self {
        let stats = session.stats(now);
        Self {
            wpm: stats.wpm,
            cpm: stats.cpm,
            accuracy: stats.accuracy,
            correct: session.correct_count(),
            incorrect: stats.errors,
            typed: session.position(),
            total_units: session.len(),
            elapsed_secs: session.elapsed_secs(now),
            timestamp: Utc::now(),
            layout_id: session.layout_id().to_string(),
            reason: session
                .completion()
                .unwrap_or(CompletionReason::TargetConsumed),
            per_key_times: key_times(session.records()),
        }
    }

    /// Share of the target reached, 0–100.
    pub fn completion_percent(&self) -> f64 {
        if self.total_units == 0 {
            return 100.0;
        }
        (self.typed as f64 / self.total_units as f64 * 100.0).clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::keyboard::layout::ModifierState;

    fn rec(key: KeyCode, ms: u64, correct: bool, start: Instant) -> KeystrokeRecord {
        KeystrokeRecord {
            key,
            state: ModifierState::Normal,
            resolved: String::new(),
            target_position: 0,
            correct,
            timestamp: start + Duration::from_millis(ms),
        }
    }

    #[test]
    fn test_key_times_measure_gaps() {
        let t0 = Instant::now();
        let records = vec![
            rec(KeyCode::KeyV, 0, true, t0),
            rec(KeyCode::KeyK, 180, true, t0),
            rec(KeyCode::KeyE, 500, false, t0),
        ];
        let times = key_times(&records);
        assert_eq!(times.len(), 2);
        assert_eq!(times[0].key, KeyCode::KeyK);
        assert!((times[0].time_ms - 180.0).abs() < 0.1);
        assert_eq!(times[1].key, KeyCode::KeyE);
        assert!(!times[1].correct);
        assert!((times[1].time_ms - 320.0).abs() < 0.1);
    }

    #[test]
    fn test_key_times_empty_for_single_keystroke() {
        let t0 = Instant::now();
        assert!(key_times(&[rec(KeyCode::KeyV, 0, true, t0)]).is_empty());
    }

    #[test]
    fn test_summary_serde_roundtrip() {
        let summary = SessionSummary {
            wpm: 12.5,
            cpm: 62.5,
            accuracy: 90.0,
            correct: 9,
            incorrect: 1,
            typed: 10,
            total_units: 20,
            elapsed_secs: 9.6,
            timestamp: Utc::now(),
            layout_id: "inscript".to_string(),
            reason: CompletionReason::TimeLimit,
            per_key_times: vec![KeyTime {
                key: KeyCode::Space,
                time_ms: 120.0,
                correct: true,
            }],
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"time_limit\""));
        assert!(json.contains("\"Space\""));
        let back: SessionSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back.layout_id, "inscript");
        assert_eq!(back.reason, CompletionReason::TimeLimit);
        assert_eq!(back.completion_percent(), 50.0);
    }
}
