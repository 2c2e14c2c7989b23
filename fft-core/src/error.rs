//! Error types for the spectral analysis core

use thiserror::Error;

/// Errors reported by the transform buffer lifecycle.
///
/// Algorithmic preconditions (power-of-two length, single destructive
/// transform) are enforced by construction and the domain tag, so they
/// never surface here.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpectrumError {
    /// Append attempted after the buffer reached capacity or was already
    /// transformed. Recoverable: reset the buffer and refill.
    #[error("Buffer full: reset before appending more samples")]
    BufferFull,

    /// Peak search attempted while the buffer still holds time-domain
    /// samples. Call `calc_spectrum` first.
    #[error("Buffer holds time-domain data: compute the spectrum before searching peaks")]
    NotTransformed,
}
