//! # Settle Timer
//!
//! Debounce as a state machine. Every edit re-arms the deadline; the timer
//! fires once the deadline passes with no further edits.
//!
//! ```text
//!   touch(t0)      touch(t1)                          fire_if_settled
//!      │              │                                     │
//!  ────●──────────────●───────────── window ───────────────►●── true (once)
//!      └─ deadline    └─ deadline moved to t1 + window
//! ```
//!
//! Time is always passed in, so the timer holds no clock of its own.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct SettleTimer {
    window: Duration,
    deadline: Option<Instant>,
}

impl SettleTimer {
    pub fn new(window: Duration) -> Self {
        SettleTimer {
            window,
            deadline: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// The pending deadline, if an edit is waiting to settle.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Records an edit at `now`, pushing the deadline out.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    /// Returns true exactly once per settled burst of edits.
    pub fn fire_if_settled(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending deadline without firing.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(300);

    #[test]
    fn test_idle_timer_never_fires() {
        let mut timer = SettleTimer::new(WINDOW);
        assert!(!timer.fire_if_settled(Instant::now() + Duration::from_secs(10)));
    }

    #[test]
    fn test_fires_once_after_window() {
        let t0 = Instant::now();
        let mut timer = SettleTimer::new(WINDOW);
        timer.touch(t0);

        assert!(!timer.fire_if_settled(t0 + Duration::from_millis(299)));
        assert!(timer.fire_if_settled(t0 + WINDOW));
        assert!(!timer.fire_if_settled(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_touch_restarts_window() {
        let t0 = Instant::now();
        let mut timer = SettleTimer::new(WINDOW);

        timer.touch(t0);
        timer.touch(t0 + Duration::from_millis(200));

        assert!(!timer.fire_if_settled(t0 + Duration::from_millis(400)));
        assert!(timer.fire_if_settled(t0 + Duration::from_millis(500)));
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut timer = SettleTimer::new(WINDOW);
        timer.touch(t0);
        timer.cancel();
        assert!(!timer.is_pending());
        assert!(!timer.fire_if_settled(t0 + WINDOW));
    }
}
