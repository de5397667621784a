//! Reference point file (`CADPTS.DAT`).
//!
//! One row per model cell: `cell_id x y`, whitespace separated, no header.
//! Extra trailing columns are ignored.

use std::io::BufRead;
use std::path::Path;

use flo2d_common::CellPoint;
use tracing::info;

use crate::error::{ParseError, ParseResult};
use crate::reader::open_model_file;

/// Read all reference points from a stream. Blank lines are skipped.
pub fn read_reference_points<R: BufRead>(reader: R) -> ParseResult<Vec<CellPoint>> {
    let mut points = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();

        let Some(id) = tokens.next() else {
            continue;
        };
        let (Some(x), Some(y)) = (tokens.next(), tokens.next()) else {
            return Err(ParseError::invalid(
                line_no,
                "expected 'cell_id x y'",
            ));
        };

        let id = id
            .parse::<u64>()
            .map_err(|_| ParseError::invalid(line_no, format!("invalid cell id '{}'", id)))?;
        let x = parse_coord(x, line_no)?;
        let y = parse_coord(y, line_no)?;

        points.push(CellPoint::new(id, x, y));
    }

    Ok(points)
}

/// Open and read a reference point file.
pub fn load_reference_points<P: AsRef<Path>>(path: P) -> ParseResult<Vec<CellPoint>> {
    let reader = open_model_file(path.as_ref())?;
    let points = read_reference_points(reader)?;
    info!(path = %path.as_ref().display(), cells = points.len(), "Loaded reference points");
    Ok(points)
}

fn parse_coord(token: &str, line_no: usize) -> ParseResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::invalid(line_no, format!("invalid coordinate '{}'", token)))
}
