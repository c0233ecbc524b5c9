//! Logical clock abstraction for determinism.

use std::time::{Duration, Instant};

/// Abstraction over monotonic time.
///
/// `now` is the time elapsed since the clock's origin. Production code uses
/// [`SystemClock`]; tests inject a clock they can advance by hand.
pub trait Clock: Send + Sync {
    /// Returns the time elapsed since the clock's origin.
    fn now(&self) -> Duration;
}

/// Production clock backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock whose origin is the moment of construction.
    #[must_use]
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
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}
