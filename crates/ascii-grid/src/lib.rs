//! Esri ASCII grid rasterization for FLO-2D outputs.
//!
//! ```text
//! TimeBlock records ──► rasterize(cell map, settings) ──► Grid
//!                                                          │
//!                                    format_ascii_grid ◄───┘
//! ```
//!
//! Grids can also be read back and combined cell by cell with
//! [`subtract_grids`].

pub mod error;
pub mod format;
pub mod grid;
pub mod rasterize;

pub use error::{GridError, GridResult};
pub use format::{
    format_ascii_grid, read_ascii_grid, subtract_grids, write_ascii_grid, AsciiGrid, GridHeader,
};
pub use grid::{round2, Grid, DEFAULT_NODATA};
pub use rasterize::{rasterize, RasterIssue, RasterSettings, Rasterized};
