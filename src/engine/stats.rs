use serde::{Deserialize, Serialize};

/// Characters per word for WPM.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Elapsed time is floored to this so a snapshot taken on the first
/// keystroke stays finite.
pub const MIN_ELAPSED_SECS: f64 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypingStats {
    pub wpm: f64,
    pub cpm: f64,
    /// 0–100.
    pub accuracy: f64,
    pub errors: usize,
}

impl TypingStats {
    /// O(1) in the counters the session already keeps.
    pub fn compute(total: usize, correct: usize, errors: usize, elapsed_secs: f64) -> Self {
        let minutes = elapsed_secs.max(MIN_ELAPSED_SECS) / 60.0;
        let correct_f = correct as f64;
        let accuracy = if total == 0 {
            100.0
        } else {
            (correct_f / total as f64 * 100.0).clamp(0.0, 100.0)
        };
        Self {
            wpm: (correct_f / CHARS_PER_WORD) / minutes,
            cpm: correct_f / minutes,
            accuracy,
            errors,
        }
    }
}

impl Default for TypingStats {
    fn default() -> Self {
        Self::compute(0, 0, 0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_zero_speed_full_accuracy() {
        let stats = TypingStats::default();
        assert_eq!(stats.wpm, 0.0);
        assert_eq!(stats.cpm, 0.0);
        assert_eq!(stats.accuracy, 100.0);
        assert_eq!(stats.errors, 0);
    }

    #[test]
    fn test_wpm_uses_five_chars_per_word() {
        // 50 correct chars in one minute = 10 wpm
        let stats = TypingStats::compute(50, 50, 0, 60.0);
        assert!((stats.wpm - 10.0).abs() < 1e-9);
        assert!((stats.cpm - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_accuracy_counts_errors() {
        let stats = TypingStats::compute(10, 8, 2, 30.0);
        assert!((stats.accuracy - 80.0).abs() < 1e-9);
        assert_eq!(stats.errors, 2);
    }

    #[test]
    fn test_accuracy_is_100_without_errors() {
        for total in [1, 7, 250] {
            assert_eq!(TypingStats::compute(total, total, 0, 12.0).accuracy, 100.0);
        }
    }

    #[test]
    fn test_zero_elapsed_is_finite() {
        let stats = TypingStats::compute(1, 1, 0, 0.0);
        assert!(stats.wpm.is_finite());
        assert!((stats.wpm - (0.2 / (MIN_ELAPSED_SECS / 60.0))).abs() < 1e-6);
    }
}
