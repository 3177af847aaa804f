use std::{io, result};

use thiserror::Error;

/// Errors surfaced by the explicit-writer and configuration entry points.
///
/// Instrumentation itself (beginning, stepping and ending units) never fails;
/// these errors only come from operations where the caller asked for an outcome.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Writing a dump or an analysis report to the caller-provided writer failed.
    #[error("failed to write profiling output: {0}")]
    Sink(#[from] io::Error),

    /// A sampling gate was requested with a ratio that is not a probability.
    #[error("invalid sample ratio {ratio}: must be within 0.0..=1.0")]
    InvalidSampleRatio {
        /// The ratio that was rejected.
        ratio: f64,
    },
}

/// A specialized `Result` type for profiler operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = result::Result<T, Error>;

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::fmt::Debug;

    use static_assertions::assert_impl_all;

    use super::*;

    assert_impl_all!(Error: Send, Sync, Debug);

    #[test]
    fn io_error_converts_into_sink_error() {
        let error: Error = io::Error::new(io::ErrorKind::BrokenPipe, "closed").into();

        assert!(matches!(error, Error::Sink(_)));
        assert!(error.to_string().contains("closed"));
    }

    #[test]
    fn invalid_ratio_mentions_value() {
        let error = Error::InvalidSampleRatio { ratio: 1.5 };

        assert!(error.to_string().contains("1.5"));
    }
}
