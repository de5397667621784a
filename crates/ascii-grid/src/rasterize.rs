//! Placing per-cell values onto the raster.

use flo2d_common::{CellCoordinateMap, CellLookup};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grid::{round2, Grid, DEFAULT_NODATA};

/// Rasterization parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RasterSettings {
    pub cell_size: f64,
    /// Values below this are left as no-data.
    pub min_threshold: f64,
    pub nodata: f64,
}

impl RasterSettings {
    pub fn new(cell_size: f64, min_threshold: f64) -> Self {
        Self {
            cell_size,
            min_threshold,
            nodata: DEFAULT_NODATA,
        }
    }
}

/// A record that could not be placed on the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RasterIssue {
    /// The cell id is not in the reference file.
    UndefinedCellId { cell_id: u64 },
    /// The reference cell lies outside the grid extents.
    OutOfBoundsCell { cell_id: u64, col: i64, row: i64 },
    /// The value column is missing or not a number.
    NonNumericValue { cell_id: u64 },
}

/// A finished raster and the records that were skipped while building it.
#[derive(Debug, Clone)]
pub struct Rasterized {
    pub grid: Grid,
    pub issues: Vec<RasterIssue>,
}

/// Build a grid from `(cell_id, value)` pairs.
///
/// Values are rounded to two decimals first; a rounded value at or above the
/// threshold is stored, a lower one leaves the cell as no-data. A later record for the same cell
/// overwrites an earlier one.
pub fn rasterize<I>(records: I, cell_map: &CellCoordinateMap, settings: &RasterSettings) -> Rasterized
where
    I: IntoIterator<Item = (u64, Option<f64>)>,
{
    let mut grid = Grid::new(cell_map.dimensions(), settings.nodata);
    let mut issues = Vec::new();

    for (cell_id, value) in records {
        let coord = match cell_map.lookup(cell_id) {
            CellLookup::Inside(coord) => coord,
            CellLookup::OutOfBounds(cell) => {
                issues.push(RasterIssue::OutOfBoundsCell {
                    cell_id,
                    col: cell.col,
                    row: cell.row,
                });
                continue;
            }
            CellLookup::Undefined => {
                issues.push(RasterIssue::UndefinedCellId { cell_id });
                continue;
            }
        };

        let Some(value) = value else {
            issues.push(RasterIssue::NonNumericValue { cell_id });
            continue;
        };

        let rounded = round2(value);
        if rounded >= settings.min_threshold {
            grid.set(coord.row, coord.col, rounded);
        }
    }

    debug!(
        populated = grid.populated(),
        issues = issues.len(),
        "Rasterized block"
    );
    Rasterized { grid, issues }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flo2d_common::{build_bounding_box, build_cell_map, CellPoint, BoundingBox};

    fn corner_map() -> CellCoordinateMap {
        let points = vec![
            CellPoint::new(1, 0.0, 0.0),
            CellPoint::new(2, 100.0, 0.0),
            CellPoint::new(3, 0.0, 100.0),
            CellPoint::new(4, 100.0, 100.0),
        ];
        let bbox = build_bounding_box(&points).unwrap();
        build_cell_map(&points, &bbox, 50.0).unwrap()
    }

    #[test]
    fn test_threshold_and_rounding() {
        let map = corner_map();
        let settings = RasterSettings::new(50.0, 0.3);
        let out = rasterize(
            vec![(1, Some(0.456)), (2, Some(0.05)), (4, Some(0.3))],
            &map,
            &settings,
        );

        assert!(out.issues.is_empty());
        assert_eq!(out.grid.get(2, 0), Some(0.46));
        assert_eq!(out.grid.get(2, 2), Some(-9999.0));
        assert_eq!(out.grid.get(0, 2), Some(0.3));
        assert_eq!(out.grid.populated(), 2);
    }

    #[test]
    fn test_threshold_applies_to_rounded_value() {
        let map = corner_map();
        let out = rasterize(
            vec![(1, Some(0.296)), (2, Some(0.125)), (3, Some(0.375)), (4, Some(0.294))],
            &map,
            &RasterSettings::new(50.0, 0.1),
        );
        assert_eq!(out.grid.get(2, 0), Some(0.3));
        assert_eq!(out.grid.get(2, 2), Some(0.12));
        assert_eq!(out.grid.get(0, 0), Some(0.38));

        let out = rasterize(
            vec![(1, Some(0.296)), (4, Some(0.294))],
            &map,
            &RasterSettings::new(50.0, 0.3),
        );
        assert_eq!(out.grid.get(2, 0), Some(0.3));
        assert_eq!(out.grid.get(0, 2), Some(-9999.0));
    }

    #[test]
    fn test_threshold_monotonicity() {
        let map = corner_map();
        let records = vec![(1, Some(0.1)), (2, Some(0.35)), (3, Some(0.7)), (4, Some(1.2))];

        let mut previous = usize::MAX;
        for threshold in [0.0, 0.2, 0.35, 0.5, 1.0, 2.0] {
            let out = rasterize(records.clone(), &map, &RasterSettings::new(50.0, threshold));
            let populated = out.grid.populated();
            assert!(populated <= previous);
            previous = populated;
        }
        assert_eq!(previous, 0);
    }

    #[test]
    fn test_issues_are_collected() {
        let points = vec![CellPoint::new(1, 0.0, 0.0), CellPoint::new(2, 500.0, 0.0)];
        let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0);
        let map = build_cell_map(&points, &bbox, 50.0).unwrap();

        let out = rasterize(
            vec![(1, None), (2, Some(1.0)), (9, Some(1.0))],
            &map,
            &RasterSettings::new(50.0, 0.3),
        );

        assert_eq!(
            out.issues,
            vec![
                RasterIssue::NonNumericValue { cell_id: 1 },
                RasterIssue::OutOfBoundsCell {
                    cell_id: 2,
                    col: 10,
                    row: 2
                },
                RasterIssue::UndefinedCellId { cell_id: 9 },
            ]
        );
        assert_eq!(out.grid.populated(), 0);
    }
}
