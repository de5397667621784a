//! Mapping from FLO-2D cell ids to raster grid coordinates.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::bbox::{validate_cell_size, BoundingBox};
use crate::error::{Flo2dError, Flo2dResult};

/// A single reference point: one physical model cell and its centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellPoint {
    pub id: u64,
    pub longitude: f64,
    pub latitude: f64,
}

impl CellPoint {
    pub fn new(id: u64, longitude: f64, latitude: f64) -> Self {
        Self {
            id,
            longitude,
            latitude,
        }
    }
}

/// Number of columns and rows of the raster grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridDimensions {
    pub cols: usize,
    pub rows: usize,
}

impl GridDimensions {
    /// Total number of grid cells.
    pub fn len(&self) -> usize {
        self.cols * self.rows
    }

    /// Check if grid is empty.
    pub fn is_empty(&self) -> bool {
        self.cols == 0 || self.rows == 0
    }

    /// Whether signed indices fall inside the grid.
    pub fn contains(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as usize) < self.cols && (row as usize) < self.rows
    }
}

/// Position of a cell within the grid. Row 0 is the northernmost band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellCoord {
    pub col: usize,
    pub row: usize,
}

/// A reference cell whose computed position falls outside the grid extents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfBoundsCell {
    pub id: u64,
    pub col: i64,
    pub row: i64,
}

/// Result of looking up a cell id in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellLookup {
    Inside(CellCoord),
    OutOfBounds(OutOfBoundsCell),
    Undefined,
}

/// Cell id to grid coordinate mapping for one reference file.
#[derive(Debug, Clone)]
pub struct CellCoordinateMap {
    dimensions: GridDimensions,
    cells: HashMap<u64, CellCoord>,
    out_of_bounds: HashMap<u64, OutOfBoundsCell>,
}

impl CellCoordinateMap {
    /// Grid extents the map was built against.
    pub fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Resolve a cell id.
    pub fn lookup(&self, id: u64) -> CellLookup {
        if let Some(coord) = self.cells.get(&id) {
            CellLookup::Inside(*coord)
        } else if let Some(cell) = self.out_of_bounds.get(&id) {
            CellLookup::OutOfBounds(*cell)
        } else {
            CellLookup::Undefined
        }
    }

    /// Coordinate of an in-bounds cell.
    pub fn get(&self, id: u64) -> Option<CellCoord> {
        self.cells.get(&id).copied()
    }

    /// Number of cells that map inside the grid.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// True when no cell maps inside the grid.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Reference cells flagged as outside the grid, sorted by id.
    pub fn out_of_bounds(&self) -> Vec<OutOfBoundsCell> {
        let mut cells: Vec<_> = self.out_of_bounds.values().copied().collect();
        cells.sort_by_key(|c| c.id);
        cells
    }
}

/// Build the cell id to (column, row) map.
///
/// `column = floor((lon - long_min) / cell_size)` and
/// `row = rows - floor((lat - lat_min) / cell_size) - 1`.
/// A cell is placed only when both indices are non-negative and inside the
/// grid; every other cell is kept as an [`OutOfBoundsCell`] so callers can
/// report it.
pub fn build_cell_map(
    points: &[CellPoint],
    bbox: &BoundingBox,
    cell_size: f64,
) -> Flo2dResult<CellCoordinateMap> {
    validate_cell_size(cell_size)?;
    let dimensions = bbox.dimensions(cell_size)?;

    let mut cells = HashMap::with_capacity(points.len());
    let mut out_of_bounds = HashMap::new();

    for point in points {
        if cells.contains_key(&point.id) || out_of_bounds.contains_key(&point.id) {
            return Err(Flo2dError::DuplicateCellId(point.id));
        }

        let col = ((point.longitude - bbox.long_min) / cell_size).floor() as i64;
        let band = ((point.latitude - bbox.lat_min) / cell_size).floor() as i64;
        let row = dimensions.rows as i64 - band - 1;

        if dimensions.contains(col, row) {
            cells.insert(
                point.id,
                CellCoord {
                    col: col as usize,
                    row: row as usize,
                },
            );
        } else {
            warn!(
                id = point.id,
                col,
                row,
                cols = dimensions.cols,
                rows = dimensions.rows,
                "Reference cell falls outside the grid"
            );
            out_of_bounds.insert(
                point.id,
                OutOfBoundsCell {
                    id: point.id,
                    col,
                    row,
                },
            );
        }
    }

    Ok(CellCoordinateMap {
        dimensions,
        cells,
        out_of_bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bbox::build_bounding_box;

    fn corners() -> Vec<CellPoint> {
        vec![
            CellPoint::new(1, 0.0, 0.0),
            CellPoint::new(2, 100.0, 0.0),
            CellPoint::new(3, 0.0, 100.0),
            CellPoint::new(4, 100.0, 100.0),
        ]
    }

    #[test]
    fn test_corner_scenario() {
        let points = corners();
        let bbox = build_bounding_box(&points).unwrap();
        let map = build_cell_map(&points, &bbox, 50.0).unwrap();

        assert_eq!(map.dimensions(), GridDimensions { cols: 3, rows: 3 });
        assert_eq!(map.get(4), Some(CellCoord { col: 2, row: 0 }));
        assert_eq!(map.get(1), Some(CellCoord { col: 0, row: 2 }));
        assert_eq!(map.get(2), Some(CellCoord { col: 2, row: 2 }));
        assert_eq!(map.get(3), Some(CellCoord { col: 0, row: 0 }));
        assert!(map.out_of_bounds().is_empty());
    }

    #[test]
    fn test_row_flip() {
        let points = vec![
            CellPoint::new(10, 5.0, 500.0),
            CellPoint::new(11, 20.0, 260.0),
            CellPoint::new(12, 35.0, 20.0),
        ];
        let bbox = build_bounding_box(&points).unwrap();
        let map = build_cell_map(&points, &bbox, 30.0).unwrap();
        let rows = map.dimensions().rows;

        assert_eq!(map.get(10).unwrap().row, 0);
        assert_eq!(map.get(12).unwrap().row, rows - 1);
    }

    #[test]
    fn test_all_cells_inside_grid() {
        let mut points = Vec::new();
        let mut id = 1;
        for i in 0..17 {
            for j in 0..11 {
                points.push(CellPoint::new(id, 1000.0 + i as f64 * 37.5, 2000.0 + j as f64 * 41.0));
                id += 1;
            }
        }
        let bbox = build_bounding_box(&points).unwrap();
        let map = build_cell_map(&points, &bbox, 40.0).unwrap();
        let dims = map.dimensions();

        assert_eq!(map.len(), points.len());
        for point in &points {
            let coord = map.get(point.id).unwrap();
            assert!(coord.col < dims.cols);
            assert!(coord.row < dims.rows);
        }
    }

    #[test]
    fn test_duplicate_id_is_error() {
        let points = vec![CellPoint::new(1, 0.0, 0.0), CellPoint::new(1, 10.0, 10.0)];
        let bbox = build_bounding_box(&points).unwrap();
        assert!(matches!(
            build_cell_map(&points, &bbox, 5.0),
            Err(Flo2dError::DuplicateCellId(1))
        ));
    }

    #[test]
    fn test_point_outside_supplied_bbox_is_flagged() {
        let points = vec![
            CellPoint::new(1, 0.0, 0.0),
            CellPoint::new(2, 100.0, 100.0),
            CellPoint::new(3, 500.0, 50.0),
        ];
        let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0);
        let map = build_cell_map(&points, &bbox, 50.0).unwrap();

        assert_eq!(map.len(), 2);
        assert!(matches!(map.lookup(3), CellLookup::OutOfBounds(c) if c.col == 10));
        assert_eq!(map.lookup(99), CellLookup::Undefined);
    }

    #[test]
    fn test_one_negative_index_is_rejected() {
        // Column is negative while the row is valid. A lenient "either index
        // non-negative" check would accept this cell; both must be valid.
        let points = vec![CellPoint::new(7, -60.0, 50.0)];
        let bbox = BoundingBox::new(0.0, 100.0, 0.0, 100.0);
        let map = build_cell_map(&points, &bbox, 50.0).unwrap();

        match map.lookup(7) {
            CellLookup::OutOfBounds(cell) => {
                assert_eq!(cell.col, -2);
                assert_eq!(cell.row, 1);
            }
            other => panic!("expected out of bounds, got {:?}", other),
        }
        assert!(map.is_empty());
    }
}
