//! Error taxonomy for dataset construction, configuration and verification.

use std::collections::TryReserveError;

use thiserror::Error;

/// Errors raised by the reduction core and the harness.
#[derive(Debug, Error)]
pub enum ReduceError {
    /// An extent is zero or `m * n * p` overflows `usize`.
    #[error("invalid dimensions {m}x{n}x{p}: every extent must be positive and the product must fit in usize")]
    InvalidDimensions { m: usize, n: usize, p: usize },

    /// The element buffer could not be reserved.
    #[error("cannot allocate {elements} elements")]
    Allocation {
        elements: usize,
        #[source]
        source: TryReserveError,
    },

    /// A caller-supplied buffer does not match `m * n * p`.
    #[error("buffer holds {actual} elements, dimensions require {expected}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Two or more strategies disagreed on the same dataset.
    #[error("{count} strategy result(s) disagree with the reference: {detail}")]
    Inconsistent { count: usize, detail: String },

    /// A report line could not be parsed back into an extremum.
    #[error("malformed report line: {0:?}")]
    MalformedReport(String),
}

pub type Result<T> = std::result::Result<T, ReduceError>;
