//! Trailing-edge debouncing driven by the caller's event loop
//!
//! The debouncer owns at most one pending payload. Arming replaces whatever
//! was pending, so only the last payload of a burst is ever returned from
//! [`Debouncer::poll`], and only once the quiet period has elapsed.

use std::time::{Duration, Instant};

#[derive(Debug)]
struct Pending<T> {
    deadline: Instant,
    payload: T,
}

/// Cancellable single-slot timer
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer whose [`schedule`](Self::schedule) uses `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Arm with the configured delay, starting now
    ///
    /// Returns the payload that was pending before, if any; it will never fire.
    pub fn schedule(&mut self, payload: T) -> Option<T> {
        self.arm_at(Instant::now(), self.delay, payload)
    }

    /// Arm with an explicit delay, starting now
    pub fn arm(&mut self, delay: Duration, payload: T) -> Option<T> {
        self.arm_at(Instant::now(), delay, payload)
    }

    /// Arm so that `payload` fires at `now + delay`
    pub fn arm_at(&mut self, now: Instant, delay: Duration, payload: T) -> Option<T> {
        self.pending
            .replace(Pending {
                deadline: now + delay,
                payload,
            })
            .map(|p| p.payload)
    }

    /// Drop the pending payload without firing it
    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.payload)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    /// Time left until the pending payload fires, zero if already due
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Take the pending payload if its deadline has passed
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let due = self.pending.as_ref().is_some_and(|p| now >= p.deadline);
        if due { self.cancel() } else { None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(200);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.arm_at(start, DELAY, "a");

        assert_eq!(debouncer.poll(start + ms(199)), None);
        assert_eq!(debouncer.poll(start + ms(200)), Some("a"));
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn test_burst_fires_once_with_last_payload() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        assert_eq!(debouncer.arm_at(start, DELAY, 1), None);
        assert_eq!(debouncer.poll(start + ms(50)), None);
        assert_eq!(debouncer.arm_at(start + ms(50), DELAY, 2), Some(1));
        assert_eq!(debouncer.poll(start + ms(150)), None);
        assert_eq!(debouncer.arm_at(start + ms(150), DELAY, 3), Some(2));

        // The first deadline has passed but was superseded
        assert_eq!(debouncer.poll(start + ms(300)), None);

        let mut fired = Vec::new();
        for t in (300..1000).step_by(10) {
            fired.extend(debouncer.poll(start + ms(t)));
        }
        assert_eq!(fired, vec![3]);
    }

    #[test]
    fn test_cancel_drops_pending() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.arm_at(start, DELAY, ());
        assert_eq!(debouncer.cancel(), Some(()));
        assert_eq!(debouncer.poll(start + ms(1000)), None);
    }

    #[test]
    fn test_remaining() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        assert_eq!(debouncer.remaining(start), None);

        debouncer.arm_at(start, DELAY, ());
        assert_eq!(debouncer.remaining(start + ms(50)), Some(ms(150)));
        assert_eq!(debouncer.remaining(start + ms(500)), Some(Duration::ZERO));
    }

    #[test]
    fn test_separate_bursts_fire_separately() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.arm_at(start, DELAY, 'x');
        assert_eq!(debouncer.poll(start + ms(250)), Some('x'));

        debouncer.arm_at(start + ms(400), DELAY, 'y');
        assert_eq!(debouncer.poll(start + ms(500)), None);
        assert_eq!(debouncer.poll(start + ms(600)), Some('y'));
    }
}
