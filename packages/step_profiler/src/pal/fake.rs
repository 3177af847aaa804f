//! Fake platform implementation for testing.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::pal::abstractions::Platform;

/// A clock that only moves when a test tells it to.
///
/// Clones share the same time state, so a test can keep one clone and advance
/// time while the profiler reads from another.
#[derive(Clone, Debug)]
pub(crate) struct FakePlatform {
    origin: Instant,
    elapsed: Arc<Mutex<Duration>>,
}

impl FakePlatform {
    /// Creates a fake clock frozen at an arbitrary origin.
    pub(crate) fn new() -> Self {
        Self {
            origin: Instant::now(),
            elapsed: Arc::new(Mutex::new(Duration::ZERO)),
        }
    }

    /// Moves the clock forward by `by`.
    pub(crate) fn advance(&self, by: Duration) {
        let mut elapsed = self
            .elapsed
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        *elapsed = elapsed
            .checked_add(by)
            .expect("fake clock advanced beyond Duration range - unrealistic test");
    }
}

impl Platform for FakePlatform {
    fn now(&self) -> Instant {
        let elapsed = *self
            .elapsed
            .lock()
            .expect("FakePlatform state lock should not be poisoned");

        self.origin
            .checked_add(elapsed)
            .expect("fake clock advanced beyond Instant range - unrealistic test")
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn does_not_move_on_its_own() {
        let platform = FakePlatform::new();

        assert_eq!(platform.now(), platform.now());
    }

    #[test]
    fn advance_accumulates() {
        let platform = FakePlatform::new();
        let start = platform.now();

        platform.advance(Duration::from_nanos(10));
        platform.advance(Duration::from_nanos(20));

        assert_eq!(platform.now().duration_since(start), Duration::from_nanos(30));
    }

    #[test]
    fn shared_state_between_clones() {
        let platform1 = FakePlatform::new();
        let platform2 = platform1.clone();
        let start = platform2.now();

        platform1.advance(Duration::from_millis(100));

        assert_eq!(
            platform2.now().duration_since(start),
            Duration::from_millis(100)
        );
    }
}
