//! Monotonic Time Source
//!
//! Every liveness decision in the store is a pure function of timestamps,
//! so all of them flow through a single [`Clock`] collaborator. Production
//! code uses [`SystemClock`]; tests (and embedders that replay or simulate
//! time) use [`ManualClock`] to move time forward deterministically.
//!
//! Timestamps are monotonic seconds as `f64`, measured from the clock's
//! origin. They are meaningful only relative to other readings from the
//! same clock instance.

use std::sync::Mutex;
use std::time::Instant;

/// A monotonic time source.
///
/// One `now()` call is made per store operation, and each sweep pass takes
/// a single reading so every record in the pass is judged against the same
/// instant.
pub trait Clock: Send + Sync {
    /// Returns monotonic seconds elapsed since the clock's origin.
    fn now(&self) -> f64;
}

/// Wall-clock-independent monotonic time, anchored at construction.
#[derive(Debug)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

/// A clock that only moves when told to.
///
/// Useful for exercising expiry behavior without real sleeps:
///
/// ```
/// use emberkv::clock::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// assert_eq!(clock.now(), 0.0);
/// clock.advance(6.0);
/// assert_eq!(clock.now(), 6.0);
/// ```
#[derive(Debug, Default)]
pub struct ManualClock {
    seconds: Mutex<f64>,
}

impl ManualClock {
    /// Creates a clock starting at zero seconds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at the given reading.
    pub fn starting_at(seconds: f64) -> Self {
        Self {
            seconds: Mutex::new(seconds),
        }
    }

    /// Moves the clock forward by `seconds`.
    pub fn advance(&self, seconds: f64) {
        *self.seconds.lock().unwrap() += seconds;
    }

    /// Sets the clock to an absolute reading.
    pub fn set(&self, seconds: f64) {
        *self.seconds.lock().unwrap() = seconds;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> f64 {
        *self.seconds.lock().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_manual_clock_advance_and_set() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), 0.0);

        clock.advance(1.5);
        assert_eq!(clock.now(), 1.5);

        clock.advance(0.5);
        assert_eq!(clock.now(), 2.0);

        clock.set(10.0);
        assert_eq!(clock.now(), 10.0);
    }

    #[test]
    fn test_manual_clock_starting_at() {
        let clock = ManualClock::starting_at(100.0);
        assert_eq!(clock.now(), 100.0);
    }
}
