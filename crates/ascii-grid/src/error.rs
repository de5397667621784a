//! Error types for grid construction and ASCII grid I/O.

use thiserror::Error;

/// Errors that can occur while building, reading or combining grids.
#[derive(Error, Debug)]
pub enum GridError {
    /// A header line is missing or malformed.
    #[error("invalid grid header: {0}")]
    InvalidHeader(String),

    /// A data row has the wrong number of values or a non-numeric value.
    #[error("invalid grid row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    /// Two grids that must share a shape do not.
    #[error("grid shape mismatch: {left_cols}x{left_rows} vs {right_cols}x{right_rows}")]
    ShapeMismatch {
        left_cols: usize,
        left_rows: usize,
        right_cols: usize,
        right_rows: usize,
    },

    /// Grid reference error.
    #[error(transparent)]
    Reference(#[from] flo2d_common::Flo2dError),
}

impl GridError {
    /// Create an InvalidHeader error.
    pub fn invalid_header(msg: impl Into<String>) -> Self {
        Self::InvalidHeader(msg.into())
    }

    /// Create an InvalidRow error.
    pub fn invalid_row(row: usize, msg: impl Into<String>) -> Self {
        Self::InvalidRow {
            row,
            message: msg.into(),
        }
    }
}

/// Result type for grid operations.
pub type GridResult<T> = std::result::Result<T, GridError>;
