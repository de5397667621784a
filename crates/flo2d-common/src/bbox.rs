//! Bounding box of the FLO-2D reference cell centres.

use serde::{Deserialize, Serialize};

use crate::error::{Flo2dError, Flo2dResult};
use crate::grid::{CellPoint, GridDimensions};

/// Extent of the model domain in projected coordinates.
///
/// Computed once per reference file as the min/max of all cell centre
/// coordinates. `long_*` is the easting (x) axis and `lat_*` the northing (y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub long_min: f64,
    pub long_max: f64,
    pub lat_min: f64,
    pub lat_max: f64,
}

impl BoundingBox {
    /// Create a new bounding box from its extents.
    pub fn new(long_min: f64, long_max: f64, lat_min: f64, lat_max: f64) -> Self {
        Self {
            long_min,
            long_max,
            lat_min,
            lat_max,
        }
    }

    /// Width of the bounding box in coordinate units.
    pub fn width(&self) -> f64 {
        self.long_max - self.long_min
    }

    /// Height of the bounding box in coordinate units.
    pub fn height(&self) -> f64 {
        self.lat_max - self.lat_min
    }

    /// Grid extents for the given cell size.
    ///
    /// The `+ 1` absorbs boundary rounding so the point at the maximum
    /// coordinate always lands inside the grid.
    pub fn dimensions(&self, cell_size: f64) -> Flo2dResult<GridDimensions> {
        validate_cell_size(cell_size)?;
        let cols = (self.width() / cell_size).ceil() as usize + 1;
        let rows = (self.height() / cell_size).ceil() as usize + 1;
        Ok(GridDimensions { cols, rows })
    }

    /// Lower-left corner x so that grid cell centres align with reference points.
    pub fn xll_corner(&self, cell_size: f64) -> f64 {
        self.long_min - cell_size / 2.0
    }

    /// Lower-left corner y so that grid cell centres align with reference points.
    pub fn yll_corner(&self, cell_size: f64) -> f64 {
        self.lat_min - cell_size / 2.0
    }
}

/// Compute the bounding box of a set of reference points.
pub fn build_bounding_box(points: &[CellPoint]) -> Flo2dResult<BoundingBox> {
    let first = points.first().ok_or(Flo2dError::EmptyReference)?;

    let mut bbox = BoundingBox::new(
        first.longitude,
        first.longitude,
        first.latitude,
        first.latitude,
    );
    for point in &points[1..] {
        bbox.long_min = bbox.long_min.min(point.longitude);
        bbox.long_max = bbox.long_max.max(point.longitude);
        bbox.lat_min = bbox.lat_min.min(point.latitude);
        bbox.lat_max = bbox.lat_max.max(point.latitude);
    }

    Ok(bbox)
}

pub(crate) fn validate_cell_size(cell_size: f64) -> Flo2dResult<()> {
    if cell_size.is_finite() && cell_size > 0.0 {
        Ok(())
    } else {
        Err(Flo2dError::InvalidCellSize(cell_size))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corners() -> Vec<CellPoint> {
        vec![
            CellPoint::new(1, 0.0, 0.0),
            CellPoint::new(2, 100.0, 0.0),
            CellPoint::new(3, 0.0, 100.0),
            CellPoint::new(4, 100.0, 100.0),
        ]
    }

    #[test]
    fn test_bbox_from_points() {
        let bbox = build_bounding_box(&corners()).unwrap();
        assert_eq!(bbox, BoundingBox::new(0.0, 100.0, 0.0, 100.0));
    }

    #[test]
    fn test_bbox_with_negative_coordinates() {
        let points = vec![
            CellPoint::new(1, -20.0, -5.0),
            CellPoint::new(2, -10.0, -1.0),
        ];
        let bbox = build_bounding_box(&points).unwrap();
        assert_eq!(bbox.long_max, -10.0);
        assert_eq!(bbox.lat_max, -1.0);
    }

    #[test]
    fn test_empty_reference_is_error() {
        assert!(matches!(
            build_bounding_box(&[]),
            Err(Flo2dError::EmptyReference)
        ));
    }

    #[test]
    fn test_dimensions() {
        let bbox = build_bounding_box(&corners()).unwrap();
        let dims = bbox.dimensions(50.0).unwrap();
        assert_eq!(dims.cols, 3);
        assert_eq!(dims.rows, 3);

        let dims = bbox.dimensions(30.0).unwrap();
        assert_eq!(dims.cols, 5);
        assert_eq!(dims.rows, 5);
    }

    #[test]
    fn test_corners_offset_by_half_cell() {
        let bbox = BoundingBox::new(396960.0, 411660.0, 482590.0, 498550.0);
        assert_eq!(bbox.xll_corner(50.0), 396935.0);
        assert_eq!(bbox.yll_corner(50.0), 482565.0);
    }

    #[test]
    fn test_invalid_cell_size() {
        let bbox = BoundingBox::new(0.0, 1.0, 0.0, 1.0);
        assert!(bbox.dimensions(0.0).is_err());
        assert!(bbox.dimensions(-5.0).is_err());
        assert!(bbox.dimensions(f64::NAN).is_err());
    }
}
