use std::time::{Duration, Instant};

/// A one-shot deadline that can be re-armed or cancelled.
///
/// The timer never fires on its own; the owner polls it with the current
/// time from its event loop.
#[derive(Debug, Clone, Default)]
pub struct ResetTimer {
    deadline: Option<Instant>,
}

impl ResetTimer {
    /// Arms the timer to fire `delay` after `now`, replacing any earlier deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Disarms the timer. Returns whether it was armed.
    pub fn cancel(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Returns `true` exactly once, the first time it is polled at or after
    /// the deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_after_deadline() {
        let start = Instant::now();
        let mut timer = ResetTimer::default();
        timer.schedule(start, Duration::from_secs(2));

        assert!(!timer.fire_if_due(start));
        assert!(!timer.fire_if_due(start + Duration::from_millis(1999)));
        assert!(timer.fire_if_due(start + Duration::from_secs(2)));
        assert!(!timer.fire_if_due(start + Duration::from_secs(3)));
        assert!(!timer.is_armed());
    }

    #[test]
    fn test_cancel() {
        let start = Instant::now();
        let mut timer = ResetTimer::default();
        assert!(!timer.cancel());

        timer.schedule(start, Duration::from_secs(2));
        assert!(timer.cancel());
        assert!(timer.deadline().is_none());
        assert!(!timer.fire_if_due(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_reschedule_replaces_deadline() {
        let start = Instant::now();
        let mut timer = ResetTimer::default();
        timer.schedule(start, Duration::from_secs(2));
        timer.schedule(start + Duration::from_secs(1), Duration::from_secs(2));

        assert!(!timer.fire_if_due(start + Duration::from_secs(2)));
        assert!(timer.fire_if_due(start + Duration::from_secs(3)));
    }
}
