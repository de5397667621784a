//! Error types for FLO-2D output parsing.

use std::path::PathBuf;

use flo2d_common::Flo2dError;
use thiserror::Error;

/// Result type for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Error types for FLO-2D output parsing.
#[derive(Error, Debug)]
pub enum ParseError {
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Required input file does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingFile(PathBuf),

    /// Line that cannot be interpreted in the expected layout
    #[error("Invalid data format at line {line}: {message}")]
    InvalidFormat { line: usize, message: String },

    /// Grid reference error
    #[error(transparent)]
    Reference(#[from] Flo2dError),
}

impl ParseError {
    pub(crate) fn invalid(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            line,
            message: message.into(),
        }
    }
}
