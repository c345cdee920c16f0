// SPDX-License-Identifier: MIT OR Apache-2.0
//! Live-sync timer.
//!
//! There is no background thread: the UI loop calls [`SyncScheduler::poll`]
//! every frame with the current time. The timer is armed for one binding
//! generation; a poll carrying any other generation never fires, which is
//! how a torn-down binding set cancels the timer.

use std::time::{Duration, Instant};

/// Default polling interval
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_millis(100);

/// Recurring sync timer tied to one binding generation
#[derive(Debug, Clone)]
pub struct SyncScheduler {
    interval: Duration,
    armed: Option<Armed>,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    generation: u64,
    next_due: Instant,
}

impl SyncScheduler {
    /// Create a stopped scheduler
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            armed: None,
        }
    }

    /// Polling interval
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Arm the timer for `generation`, first due one interval from `now`
    pub fn start(&mut self, generation: u64, now: Instant) {
        self.armed = Some(Armed {
            generation,
            next_due: now + self.interval,
        });
    }

    /// Disarm the timer
    pub fn stop(&mut self) {
        self.armed = None;
    }

    /// Whether the timer is armed
    pub fn is_running(&self) -> bool {
        self.armed.is_some()
    }

    /// Whether a sync is due for `generation`. Advances the deadline when it
    /// is; missed ticks are not replayed.
    pub fn poll(&mut self, generation: u64, now: Instant) -> bool {
        let Some(armed) = self.armed.as_mut() else {
            return false;
        };
        if armed.generation != generation || now < armed.next_due {
            return false;
        }
        armed.next_due = now + self.interval;
        true
    }

    /// Time until the next tick, for repaint scheduling
    pub fn time_until_due(&self, now: Instant) -> Option<Duration> {
        self.armed
            .map(|armed| armed.next_due.saturating_duration_since(now))
    }
}

impl Default for SyncScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_per_interval() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::default();
        scheduler.start(1, start);

        assert!(!scheduler.poll(1, start + Duration::from_millis(50)));
        assert!(scheduler.poll(1, start + Duration::from_millis(100)));
        assert!(!scheduler.poll(1, start + Duration::from_millis(150)));
        assert!(scheduler.poll(1, start + Duration::from_millis(450)));
        assert!(!scheduler.poll(1, start + Duration::from_millis(500)));
    }

    #[test]
    fn test_stale_generation_never_fires() {
        let start = Instant::now();
        let mut scheduler = SyncScheduler::default();
        scheduler.start(2, start);
        assert!(!scheduler.poll(1, start + Duration::from_secs(1)));

        scheduler.stop();
        assert!(!scheduler.is_running());
        assert!(!scheduler.poll(2, start + Duration::from_secs(1)));
        assert_eq!(scheduler.time_until_due(start), None);
    }
}
