//! Esri ASCII grid text.
//!
//! ```text
//! ncols	3
//! nrows	3
//! xllcorner	-25.0
//! yllcorner	-25.0
//! cellsize	50.0
//! NODATA_value	-9999
//! 0.60 -9999 -9999
//! ...
//! ```

use std::fmt::Write;

use flo2d_common::BoundingBox;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};
use crate::grid::Grid;

/// The six header fields of an ASCII grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridHeader {
    pub ncols: usize,
    pub nrows: usize,
    pub xllcorner: f64,
    pub yllcorner: f64,
    pub cellsize: f64,
    pub nodata: f64,
}

impl GridHeader {
    /// Header for a grid built over `bbox`. The lower-left corner sits half a
    /// cell beyond the westernmost and southernmost cell centres.
    pub fn for_grid(grid: &Grid, bbox: &BoundingBox, cell_size: f64) -> Self {
        Self {
            ncols: grid.cols(),
            nrows: grid.rows(),
            xllcorner: bbox.xll_corner(cell_size),
            yllcorner: bbox.yll_corner(cell_size),
            cellsize: cell_size,
            nodata: grid.nodata(),
        }
    }

    fn same_shape(&self, other: &GridHeader) -> bool {
        self.ncols == other.ncols && self.nrows == other.nrows
    }
}

/// A parsed grid file.
#[derive(Debug, Clone, PartialEq)]
pub struct AsciiGrid {
    pub header: GridHeader,
    pub grid: Grid,
}

fn format_value(value: f64, nodata: f64) -> String {
    if value == nodata {
        format_nodata(nodata)
    } else {
        format!("{:.2}", value)
    }
}

fn format_nodata(nodata: f64) -> String {
    if nodata.fract() == 0.0 && nodata.abs() < 1e15 {
        format!("{}", nodata as i64)
    } else {
        format!("{}", nodata)
    }
}

/// Render a header and grid rows, northernmost row first.
pub fn write_ascii_grid(header: &GridHeader, grid: &Grid) -> String {
    let mut out = String::with_capacity(64 + grid.values().len() * 6);
    let _ = writeln!(out, "ncols\t{}", header.ncols);
    let _ = writeln!(out, "nrows\t{}", header.nrows);
    let _ = writeln!(out, "xllcorner\t{:?}", header.xllcorner);
    let _ = writeln!(out, "yllcorner\t{:?}", header.yllcorner);
    let _ = writeln!(out, "cellsize\t{:?}", header.cellsize);
    let _ = writeln!(out, "NODATA_value\t{}", format_nodata(header.nodata));

    for row in 0..grid.rows() {
        let line: Vec<String> = grid
            .row(row)
            .iter()
            .map(|v| format_value(*v, header.nodata))
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// Render a rasterized grid over `bbox`.
pub fn format_ascii_grid(grid: &Grid, bbox: &BoundingBox, cell_size: f64) -> String {
    write_ascii_grid(&GridHeader::for_grid(grid, bbox, cell_size), grid)
}

fn header_value<'a>(lines: &mut impl Iterator<Item = &'a str>, key: &str) -> GridResult<&'a str> {
    let line = lines
        .next()
        .ok_or_else(|| GridError::invalid_header(format!("missing '{}'", key)))?;
    let mut tokens = line.split_whitespace();
    match (tokens.next(), tokens.next()) {
        (Some(k), Some(v)) if k.eq_ignore_ascii_case(key) => Ok(v),
        _ => Err(GridError::invalid_header(format!(
            "expected '{}', found '{}'",
            key,
            line.trim()
        ))),
    }
}

fn parse_header_number<T: std::str::FromStr>(value: &str, key: &str) -> GridResult<T> {
    value
        .parse::<T>()
        .map_err(|_| GridError::invalid_header(format!("{} value '{}' is not a number", key, value)))
}

/// Parse ASCII grid text.
pub fn read_ascii_grid(text: &str) -> GridResult<AsciiGrid> {
    let mut lines = text.lines();

    let ncols = parse_header_number(header_value(&mut lines, "ncols")?, "ncols")?;
    let nrows = parse_header_number(header_value(&mut lines, "nrows")?, "nrows")?;
    let xllcorner = parse_header_number(header_value(&mut lines, "xllcorner")?, "xllcorner")?;
    let yllcorner = parse_header_number(header_value(&mut lines, "yllcorner")?, "yllcorner")?;
    let cellsize = parse_header_number(header_value(&mut lines, "cellsize")?, "cellsize")?;
    let nodata = parse_header_number(header_value(&mut lines, "NODATA_value")?, "NODATA_value")?;

    let header = GridHeader {
        ncols,
        nrows,
        xllcorner,
        yllcorner,
        cellsize,
        nodata,
    };

    let mut data = Vec::with_capacity(ncols * nrows);
    let mut rows = 0;
    for line in lines.filter(|l| !l.trim().is_empty()) {
        if rows == nrows {
            return Err(GridError::invalid_row(rows, "more rows than nrows"));
        }
        let start = data.len();
        for token in line.split_whitespace() {
            let value = token.parse::<f64>().map_err(|_| {
                GridError::invalid_row(rows, format!("'{}' is not a number", token))
            })?;
            data.push(value);
        }
        if data.len() - start != ncols {
            return Err(GridError::invalid_row(
                rows,
                format!("expected {} values, found {}", ncols, data.len() - start),
            ));
        }
        rows += 1;
    }
    if rows != nrows {
        return Err(GridError::invalid_row(
            rows,
            format!("expected {} rows, found {}", nrows, rows),
        ));
    }

    Ok(AsciiGrid {
        header,
        grid: Grid::from_parts(ncols, nrows, nodata, data),
    })
}

/// Cell-wise `a - b`.
///
/// No-data cells count as zero. An exactly zero difference becomes no-data;
/// small non-zero differences are kept and written as `0.00`. The result keeps
/// the header of `a`.
pub fn subtract_grids(a: &AsciiGrid, b: &AsciiGrid) -> GridResult<AsciiGrid> {
    if !a.header.same_shape(&b.header) {
        return Err(GridError::ShapeMismatch {
            left_cols: a.header.ncols,
            left_rows: a.header.nrows,
            right_cols: b.header.ncols,
            right_rows: b.header.nrows,
        });
    }

    let nodata = a.header.nodata;
    let data = a
        .grid
        .values()
        .iter()
        .zip(b.grid.values())
        .map(|(x, y)| {
            let x = if a.grid.is_nodata(*x) { 0.0 } else { *x };
            let y = if b.grid.is_nodata(*y) { 0.0 } else { *y };
            let diff = x - y;
            if diff == 0.0 {
                nodata
            } else {
                diff
            }
        })
        .collect();

    Ok(AsciiGrid {
        header: a.header,
        grid: Grid::from_parts(a.header.ncols, a.header.nrows, nodata, data),
    })
}

impl AsciiGrid {
    pub fn to_text(&self) -> String {
        write_ascii_grid(&self.header, &self.grid)
    }
}
