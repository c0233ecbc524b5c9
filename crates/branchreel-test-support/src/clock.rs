//! Test clock — a `Clock` that only moves when the test moves it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use branchreel_core::clock::Clock;

/// A clock advanced by hand. Clones share the same reading, so a test can
/// keep one handle while the engine holds another.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<Mutex<Duration>>);

impl ManualClock {
    /// Creates a clock reading zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the clock forward by `by`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn advance(&self, by: Duration) {
        *self.0.lock().unwrap() += by;
    }

    /// Moves the clock forward by `secs` seconds.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned or `secs` is negative.
    pub fn advance_secs(&self, secs: f64) {
        self.advance(Duration::from_secs_f64(secs));
    }

    /// Sets the clock to `at`.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn set(&self, at: Duration) {
        *self.0.lock().unwrap() = at;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.0.lock().unwrap()
    }
}
