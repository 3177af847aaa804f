//! Real platform implementation backed by the system monotonic clock.

use std::time::Instant;

use crate::pal::abstractions::Platform;

#[derive(Debug, Clone)]
pub(crate) struct RealPlatform;

impl Platform for RealPlatform {
    fn now(&self) -> Instant {
        Instant::now()
    }
}
