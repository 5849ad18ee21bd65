//! Error handling for the fastddc library
//!
//! Configuration problems are reported once, when a channelizer is built.
//! Per-block processing has no error path: a channelizer that was built
//! successfully processes every correctly sized block.

use std::io;

use thiserror::Error;

/// A specialized Result type for fastddc operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for fastddc operations
#[derive(Debug, Error)]
pub enum Error {
    /// Decimation factor must be at least 1
    #[error("Invalid decimation: {0} (must be >= 1)")]
    InvalidDecimation(usize),

    /// Transition bandwidth must be finite and within (0, 1]
    #[error("Invalid transition bandwidth: {0} (must be within (0, 1])")]
    InvalidTransitionBandwidth(f32),

    /// Frequency shift must be finite and within [-0.5, 0.5]
    #[error("Invalid frequency shift: {0} (must be within [-0.5, 0.5])")]
    InvalidShift(f32),

    /// The requested combination derives an unusable FFT size
    #[error("Degenerate configuration: fft_size = {fft_size} (must be > 2)")]
    Degenerate { fft_size: usize },

    /// The requested combination derives sizes that do not fit in a `usize`
    #[error(
        "Configuration too large: taps_min_length = {taps_min_length}, decimation = {decimation}"
    )]
    Oversized {
        taps_min_length: usize,
        decimation: usize,
    },

    /// I/O error (file operations, stdin, stdout)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid I/Q format or conversion error
    #[error("Format error: {0}")]
    Format(String),

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl Error {
    /// Create a format error with a custom message
    pub fn format<S: Into<String>>(msg: S) -> Self {
        Error::Format(msg.into())
    }

    /// Create a generic error with a custom message
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Error::Other(msg.into())
    }

    /// Returns true for errors caused by the requested channel parameters.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidDecimation(_)
                | Error::InvalidTransitionBandwidth(_)
                | Error::InvalidShift(_)
                | Error::Degenerate { .. }
                | Error::Oversized { .. }
        )
    }
}
