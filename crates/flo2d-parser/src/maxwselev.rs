//! Maximum water surface (`MAXWSELEV.OUT`) and ground elevation (`TOPO.DAT`).
//!
//! Both files list one cell per row in the same order, so the maximum
//! inundation depth of a cell is the difference of matching rows.

use std::io::BufRead;

use crate::error::{ParseError, ParseResult};

/// One row of `MAXWSELEV.OUT`: `cell_id x y surface_elevation`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaxSurfaceRecord {
    pub cell_id: u64,
    pub x: f64,
    pub y: f64,
    pub surface_elevation: f64,
}

fn field(token: Option<&str>, line_no: usize, name: &str) -> ParseResult<f64> {
    token
        .and_then(|t| t.parse::<f64>().ok())
        .ok_or_else(|| ParseError::invalid(line_no, format!("missing or invalid {}", name)))
}

pub fn read_max_surface_elevation<R: BufRead>(reader: R) -> ParseResult<Vec<MaxSurfaceRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;
        let mut tokens = line.split_whitespace();
        let Some(id) = tokens.next() else {
            continue;
        };
        let cell_id = id
            .parse::<u64>()
            .map_err(|_| ParseError::invalid(line_no, format!("invalid cell id '{}'", id)))?;

        records.push(MaxSurfaceRecord {
            cell_id,
            x: field(tokens.next(), line_no, "x")?,
            y: field(tokens.next(), line_no, "y")?,
            surface_elevation: field(tokens.next(), line_no, "surface elevation")?,
        });
    }
    Ok(records)
}

/// Ground elevations from `TOPO.DAT` (`x y ground_elevation`), in file order.
pub fn read_topography<R: BufRead>(reader: R) -> ParseResult<Vec<f64>> {
    let mut elevations = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }
        elevations.push(field(tokens.get(2).copied(), index + 1, "ground elevation")?);
    }
    Ok(elevations)
}

/// Depth per cell as `(row_index + 1, surface - ground)`.
///
/// Rows are paired by position; both files must have the same row count.
pub fn max_depths(surface: &[MaxSurfaceRecord], ground: &[f64]) -> ParseResult<Vec<(u64, f64)>> {
    if surface.len() != ground.len() {
        return Err(ParseError::invalid(
            surface.len().min(ground.len()) + 1,
            format!(
                "MAXWSELEV has {} rows but TOPO has {}",
                surface.len(),
                ground.len()
            ),
        ));
    }

    Ok(surface
        .iter()
        .zip(ground)
        .enumerate()
        .map(|(i, (record, ground))| (i as u64 + 1, record.surface_elevation - ground))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_depths() {
        let surface = read_max_surface_elevation(
            "1 100.0 200.0 5.50\n2 150.0 200.0 4.00\n".as_bytes(),
        )
        .unwrap();
        let ground = read_topography("100.0 200.0 5.00\n150.0 200.0 4.25\n".as_bytes()).unwrap();

        let depths = max_depths(&surface, &ground).unwrap();
        assert_eq!(depths.len(), 2);
        assert_eq!(depths[0].0, 1);
        assert!((depths[0].1 - 0.5).abs() < 1e-9);
        assert!((depths[1].1 + 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_row_count_mismatch() {
        let surface = read_max_surface_elevation("1 0 0 1.0\n".as_bytes()).unwrap();
        assert!(max_depths(&surface, &[]).is_err());
    }

    #[test]
    fn test_short_topography_row() {
        let err = read_topography("1.0 2.0 3.0\n1.0 2.0\n".as_bytes()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFormat { line: 2, .. }));
    }
}
