//! Platform facade for switching between real and test implementations.

#[cfg(test)]
use std::sync::Arc;
use std::time::Instant;

use crate::pal::abstractions::Platform;
#[cfg(test)]
use crate::pal::{FakePlatform, MockPlatform};
use crate::pal::real::RealPlatform;

/// Unified handle to whichever clock the profiler was created with.
#[derive(Debug, Clone)]
pub(crate) enum PlatformFacade {
    Real(RealPlatform),

    #[cfg(test)]
    Fake(FakePlatform),

    #[cfg(test)]
    Mock(Arc<MockPlatform>),
}

impl PlatformFacade {
    pub(crate) fn real() -> Self {
        Self::Real(RealPlatform)
    }

    #[cfg(test)]
    pub(crate) fn fake(fake_platform: FakePlatform) -> Self {
        Self::Fake(fake_platform)
    }

    #[cfg(test)]
    pub(crate) fn from_mock(mock: MockPlatform) -> Self {
        Self::Mock(Arc::new(mock))
    }
}

impl Platform for PlatformFacade {
    fn now(&self) -> Instant {
        match self {
            Self::Real(platform) => platform.now(),
            #[cfg(test)]
            Self::Fake(platform) => platform.now(),
            #[cfg(test)]
            Self::Mock(platform) => platform.now(),
        }
    }
}
