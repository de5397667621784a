//! Common types and utilities shared across the FLO-2D extraction crates.

pub mod bbox;
pub mod error;
pub mod grid;
pub mod station;
pub mod time;

pub use bbox::{build_bounding_box, BoundingBox};
pub use error::{Flo2dError, Flo2dResult};
pub use grid::{
    build_cell_map, CellCoord, CellCoordinateMap, CellLookup, CellPoint, GridDimensions,
    OutOfBoundsCell,
};
pub use station::{file_safe_name, StationKind, StationMap};
pub use time::{
    model_time_to_datetime, parse_date, parse_time, HourWindow, UtcOffset, DATE_TIME_FORMAT,
    FILE_STAMP_FORMAT,
};
