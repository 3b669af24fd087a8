//! Trailing-edge debouncer driven by the main loop's clock.

use std::time::{Duration, Instant};

/// Holds the latest triggered value until `window` has passed without a
/// new trigger. Every trigger restarts the window.
///
/// The debouncer owns no timer; the main loop calls [`Debouncer::poll`]
/// with the current time.
#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    pending: Option<T>,
    last_trigger: Option<Instant>,
}

impl<T> Debouncer<T> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            last_trigger: None,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Records a new value, replacing the pending one, and restarts the
    /// window. Returns the value that was coalesced away, if any.
    pub fn trigger(&mut self, value: T, now: Instant) -> Option<T> {
        self.last_trigger = Some(now);
        self.pending.replace(value)
    }

    /// Returns the pending value once the window has elapsed since the last
    /// trigger.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let deadline = self.deadline()?;
        if now < deadline {
            return None;
        }
        self.last_trigger = None;
        self.pending.take()
    }

    /// When the pending value will fire, if one is pending.
    pub fn deadline(&self) -> Option<Instant> {
        match (&self.pending, self.last_trigger) {
            (Some(_), Some(at)) => Some(at + self.window),
            _ => None,
        }
    }

    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Drops the pending value without firing it.
    pub fn cancel(&mut self) -> Option<T> {
        self.last_trigger = None;
        self.pending.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_millis(400);

    #[test]
    fn test_fires_after_quiet_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        assert!(d.trigger(1, t0).is_none());

        assert_eq!(d.poll(t0 + Duration::from_millis(399)), None);
        assert_eq!(d.poll(t0 + WINDOW), Some(1));
        assert_eq!(d.poll(t0 + WINDOW * 2), None);
    }

    #[test]
    fn test_trigger_restarts_window() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.trigger("a", t0);
        assert_eq!(d.trigger("b", t0 + Duration::from_millis(300)), Some("a"));

        // 400ms after the first trigger, but only 100ms after the second.
        assert_eq!(d.poll(t0 + WINDOW), None);
        assert_eq!(d.poll(t0 + Duration::from_millis(700)), Some("b"));
    }

    #[test]
    fn test_burst_coalesces_to_last_value() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        for i in 0..10u32 {
            d.trigger(i, t0 + Duration::from_millis(u64::from(i) * 50));
        }
        let fired: Vec<_> = (0..40u64)
            .filter_map(|step| d.poll(t0 + Duration::from_millis(step * 50)))
            .collect();
        assert_eq!(fired, vec![9]);
    }

    #[test]
    fn test_cancel() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(WINDOW);
        d.trigger(5, t0);
        assert_eq!(d.cancel(), Some(5));
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + WINDOW), None);
    }

    #[test]
    fn test_zero_window_fires_on_next_poll() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::ZERO);
        d.trigger((), t0);
        assert_eq!(d.poll(t0), Some(()));
    }
}
