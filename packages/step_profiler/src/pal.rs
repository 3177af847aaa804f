//! Platform abstraction layer for reading the clock.
//!
//! Real builds read the monotonic system clock. Tests either drive a fake clock
//! forward by hand or use a mock to verify how often the clock is read.

mod abstractions;
mod facade;
#[cfg(test)]
mod fake;
mod real;

#[cfg(test)]
pub(crate) use abstractions::MockPlatform;
pub(crate) use abstractions::Platform;
pub(crate) use facade::PlatformFacade;
#[cfg(test)]
pub(crate) use fake::FakePlatform;
