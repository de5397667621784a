//! Error types for the common FLO-2D types.

use thiserror::Error;

/// Result type alias using Flo2dError.
pub type Flo2dResult<T> = Result<T, Flo2dError>;

/// Errors raised while building grid references or resolving times.
#[derive(Debug, Error)]
pub enum Flo2dError {
    #[error("Reference point set is empty")]
    EmptyReference,

    #[error("Invalid cell size: {0} (must be finite and greater than 0)")]
    InvalidCellSize(f64),

    #[error("Cell id {0} appears more than once in the reference points")]
    DuplicateCellId(u64),

    #[error("Invalid time value: {0}")]
    InvalidTime(String),

    #[error("Invalid UTC offset: {0}. Expected '+HH:MM' or '-HH:MM[:SS]'")]
    InvalidUtcOffset(String),

    #[error("Invalid hour window: start {start} is after end {end}")]
    InvalidWindow { start: f64, end: f64 },
}
