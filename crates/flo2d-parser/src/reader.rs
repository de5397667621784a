//! Opening model output files.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{ParseError, ParseResult};

/// Size of the read buffer used for every model file.
pub const READ_BUFFER_SIZE: usize = 64 * 1024;

/// Open a model output file for buffered, forward-only reading.
///
/// Paths ending in `.gz` are decompressed while streaming.
pub fn open_model_file<P: AsRef<Path>>(path: P) -> ParseResult<Box<dyn BufRead>> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(ParseError::MissingFile(path.to_path_buf()));
    }

    let file = File::open(path)?;
    let gzipped = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("gz"));

    debug!(path = %path.display(), gzipped, "Opening model file");

    if gzipped {
        Ok(Box::new(BufReader::with_capacity(
            READ_BUFFER_SIZE,
            GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(READ_BUFFER_SIZE, file)))
    }
}
