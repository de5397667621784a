//! Error types for the ingestion crate.

use std::path::PathBuf;

use ascii_grid::GridError;
use flo2d_common::Flo2dError;
use flo2d_parser::ParseError;
use storage::StorageError;
use thiserror::Error;

/// Errors that end an extraction step.
#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Input file not found: {}", .0.display())]
    MissingInputFile(PathBuf),

    #[error("Failed to read file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreate {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", path.display())]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse model output: {0}")]
    Parse(ParseError),

    #[error("Invalid grid reference: {0}")]
    Reference(#[from] Flo2dError),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<ParseError> for IngestionError {
    fn from(err: ParseError) -> Self {
        match err {
            ParseError::MissingFile(path) => Self::MissingInputFile(path),
            ParseError::Reference(e) => Self::Reference(e),
            other => Self::Parse(other),
        }
    }
}

/// Result type for ingestion operations.
pub type Result<T> = std::result::Result<T, IngestionError>;
