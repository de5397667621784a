//! FLO-2D output extraction.
//!
//! Turns the text outputs of a FLO-2D run into:
//!
//! - one Esri ASCII grid per depth block at or after the model state time
//! - a maximum-inundation grid
//! - per-station water-level CSV files (channel and flood-plain elements)
//! - forecast horizons stored through a [`storage::TimeseriesSink`]
//!
//! # Architecture
//!
//! [`ExtractionConfig`] is built once and handed to an [`Extractor`], which
//! runs the requested [`Step`]s. Recoverable data problems are collected as
//! [`Diagnostic`]s in the returned [`RunReport`]; a step that cannot finish
//! (missing input, unwritable output) is recorded as failed and the run
//! moves on.

pub mod config;
pub mod error;
pub mod forecast;
mod ingester;
mod raster;
pub mod report;
pub mod scheduler;
pub mod series;

// Re-exports
pub use config::{
    preset_cell_size, resolve_cell_size, ExtractionConfig, GridOptions, InputFiles, OutputNames,
    RunTimes, WaterLevelOptions, DEFAULT_CELL_SIZE, DEFAULT_MODEL, MODEL_PRESETS,
};
pub use error::{IngestionError, Result};
pub use forecast::{
    format_run_name, forecast_slice, horizon_label, partition_by_day, store_forecast,
    validate_run_name, DayBucket, MAX_FORECAST_DAYS,
};
pub use ingester::{subtract_grid_files, Extractor, StationSeries, SLICED_DEPTH_FILE};
pub use raster::{run_grid, run_max_grid, GridReference};
pub use report::{Diagnostic, FailedStep, RunReport, Step};
pub use series::{Sample, SampleValue};
