use serde::{Deserialize, Serialize};

use crate::session::result::SessionSummary;

pub const SCHEMA_VERSION: u32 = 1;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HistoryData {
    pub schema_version: u32,
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

impl Default for HistoryData {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            sessions: Vec::new(),
        }
    }
}

impl HistoryData {
    /// Check if loaded data has a stale schema version and needs reset.
    pub fn needs_reset(&self) -> bool {
        self.schema_version != SCHEMA_VERSION
    }

    pub fn best_wpm(&self, layout_id: &str) -> Option<f64> {
        self.sessions
            .iter()
            .filter(|s| s.layout_id == layout_id)
            .map(|s| s.wpm)
            .reduce(f64::max)
    }

    /// The last `n` sessions on one layout, most recent first.
    pub fn recent<'a>(&'a self, layout_id: &'a str, n: usize) -> impl Iterator<Item = &'a SessionSummary> {
        self.sessions
            .iter()
            .rev()
            .filter(move |s| s.layout_id == layout_id)
            .take(n)
    }

    /// Mean WPM over [`recent`](Self::recent).
    pub fn recent_wpm(&self, layout_id: &str, n: usize) -> Option<f64> {
        let (count, total) = self
            .recent(layout_id, n)
            .fold((0usize, 0.0), |(c, t), s| (c + 1, t + s.wpm));
        (count > 0).then(|| total / count as f64)
    }
}
