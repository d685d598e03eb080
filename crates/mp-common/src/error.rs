//! Error types for Meshprobe.
//!
//! Structured error handling with stable error codes for machine parsing and
//! a category classification for grouping. Precondition violations (bad slot
//! index, malformed point arrays) are reported at the call site before any
//! communication is attempted; communication failures are not retried, since
//! the collective protocol offers no liveness guarantee against a missing
//! peer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Meshprobe operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories for grouping related errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Probe construction, indexing, and evaluation errors.
    Probe,
    /// Process-group and message-exchange errors.
    Comm,
    /// Non-matching interpolation errors.
    Interp,
    /// File I/O and serialization errors.
    Io,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCategory::Probe => write!(f, "probe"),
            ErrorCategory::Comm => write!(f, "comm"),
            ErrorCategory::Interp => write!(f, "interp"),
            ErrorCategory::Io => write!(f, "io"),
        }
    }
}

/// Unified error type for Meshprobe.
#[derive(Error, Debug)]
pub enum Error {
    // Probe errors (10-19)
    #[error("malformed point array: {len} coordinates is not a multiple of geometry dimension {gdim}")]
    MalformedPoints { len: usize, gdim: usize },

    #[error("snapshot {requested} out of range: {available} snapshots recorded")]
    SnapshotOutOfRange { requested: usize, available: usize },

    #[error("statistic slot {requested} out of range: valid slots are 0 and 1")]
    InvalidStatSlot { requested: usize },

    #[error("value component {requested} out of range: field has {value_size} components")]
    ComponentOutOfRange { requested: usize, value_size: usize },

    // Communication errors (20-29)
    #[error("rank {rank} out of range for process group of size {size}")]
    RankOutOfRange { rank: usize, size: usize },

    #[error("process group channel closed: {0}")]
    GroupClosed(String),

    #[error("unexpected payload for tag {tag}: {got}")]
    PayloadMismatch { tag: &'static str, got: &'static str },

    #[error("incomplete probe coverage: {found} of {expected} points located in the source domain")]
    IncompleteCoverage { expected: usize, found: usize },

    #[error("payload shape mismatch: expected {expected:?}, got {actual:?}")]
    PayloadShape {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    // Interpolation errors (30-39)
    #[error("geometry dimension mismatch: source has {source}, destination has {dest}")]
    GeometryMismatch { r#source: usize, dest: usize },

    #[error("scalar destination requires a single-component source, got {value_size} components")]
    ValueSizeMismatch { value_size: usize },

    #[error("dof {dof} has no component assignment in the destination layout")]
    UnmappedDof { dof: usize },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("probe dump encoding error: {0}")]
    Encode(#[from] bincode::Error),
}

impl Error {
    /// Stable error code, grouped by category:
    /// - 10-19: probe errors
    /// - 20-29: communication errors
    /// - 30-39: interpolation errors
    /// - 60-69: I/O errors
    pub fn code(&self) -> u32 {
        match self {
            Error::MalformedPoints { .. } => 10,
            Error::SnapshotOutOfRange { .. } => 11,
            Error::InvalidStatSlot { .. } => 12,
            Error::ComponentOutOfRange { .. } => 13,
            Error::RankOutOfRange { .. } => 20,
            Error::GroupClosed(_) => 21,
            Error::PayloadMismatch { .. } => 22,
            Error::IncompleteCoverage { .. } => 23,
            Error::PayloadShape { .. } => 24,
            Error::GeometryMismatch { .. } => 30,
            Error::ValueSizeMismatch { .. } => 31,
            Error::UnmappedDof { .. } => 32,
            Error::Io(_) => 60,
            Error::Encode(_) => 61,
        }
    }

    /// Category for this error.
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            10..=19 => ErrorCategory::Probe,
            20..=29 => ErrorCategory::Comm,
            30..=39 => ErrorCategory::Interp,
            _ => ErrorCategory::Io,
        }
    }
}
