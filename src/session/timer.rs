use std::time::{Duration, Instant};

/// Practice clock with an optional time budget.
///
/// Time is supplied by the caller. The budget fires at most once through
/// [`SessionTimer::poll`]; once the timer has fired or been stopped it
/// ignores further starts until [`SessionTimer::reset`].
#[derive(Clone, Debug)]
pub struct SessionTimer {
    accumulated: Duration,
    running_since: Option<Instant>,
    time_limit: Option<Duration>,
    done: bool,
}

impl SessionTimer {
    pub fn new(time_limit: Option<Duration>) -> Self {
        Self {
            accumulated: Duration::ZERO,
            running_since: None,
            time_limit: time_limit.filter(|d| !d.is_zero()),
            done: false,
        }
    }

    /// Idempotent while running.
    pub fn start(&mut self, now: Instant) {
        if !self.done && self.running_since.is_none() {
            self.running_since = Some(now);
        }
    }

    /// Suspends the clock; the budget cannot fire while paused.
    pub fn pause(&mut self, now: Instant) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += now.saturating_duration_since(since);
        }
    }

    /// Stops for good without firing.
    pub fn stop(&mut self, now: Instant) {
        self.pause(now);
        self.done = true;
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
        self.running_since = None;
        self.done = false;
    }

    pub fn is_running(&self) -> bool {
        self.running_since.is_some()
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    pub fn elapsed(&self, now: Instant) -> Duration {
        let running = self
            .running_since
            .map(|since| now.saturating_duration_since(since))
            .unwrap_or(Duration::ZERO);
        self.accumulated + running
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.time_limit
            .map(|limit| limit.saturating_sub(self.elapsed(now)))
    }

    /// Returns `true` exactly once: the first poll at or after the budget
    /// runs out. Elapsed time is clamped to the budget when it fires.
    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(limit) = self.time_limit else {
            return false;
        };
        if self.done || !self.is_running() || self.elapsed(now) < limit {
            return false;
        }
        self.running_since = None;
        self.accumulated = limit;
        self.done = true;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_elapsed_accumulates_across_pause() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(None);
        timer.start(t0);
        timer.pause(t0 + secs(3));
        assert_eq!(timer.elapsed(t0 + secs(10)), secs(3));
        timer.start(t0 + secs(10));
        assert_eq!(timer.elapsed(t0 + secs(12)), secs(5));
    }

    #[test]
    fn test_start_is_idempotent() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(None);
        timer.start(t0);
        timer.start(t0 + secs(5));
        assert_eq!(timer.elapsed(t0 + secs(6)), secs(6));
    }

    #[test]
    fn test_fires_once() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(Some(secs(30)));
        timer.start(t0);
        assert!(!timer.poll(t0 + secs(29)));
        assert!(timer.poll(t0 + secs(31)));
        assert!(!timer.poll(t0 + secs(32)));
        assert_eq!(timer.elapsed(t0 + secs(40)), secs(30));
        assert!(!timer.is_running());
    }

    #[test]
    fn test_pause_before_expiry_prevents_firing() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(Some(secs(10)));
        timer.start(t0);
        timer.pause(t0 + secs(5));
        assert!(!timer.poll(t0 + secs(60)));
        assert_eq!(timer.remaining(t0 + secs(60)), Some(secs(5)));
    }

    #[test]
    fn test_reset_cancels_and_rearms() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(Some(secs(10)));
        timer.start(t0);
        timer.reset();
        assert!(!timer.poll(t0 + secs(20)));
        assert_eq!(timer.elapsed(t0 + secs(20)), Duration::ZERO);
        timer.start(t0 + secs(20));
        assert!(timer.poll(t0 + secs(30)));
    }

    #[test]
    fn test_stop_disarms() {
        let t0 = Instant::now();
        let mut timer = SessionTimer::new(Some(secs(10)));
        timer.start(t0);
        timer.stop(t0 + secs(4));
        timer.start(t0 + secs(5));
        assert!(!timer.is_running());
        assert!(!timer.poll(t0 + secs(60)));
        assert_eq!(timer.elapsed(t0 + secs(60)), secs(4));
    }

    #[test]
    fn test_zero_limit_means_untimed() {
        let timer = SessionTimer::new(Some(Duration::ZERO));
        assert_eq!(timer.time_limit(), None);
    }
}
