//! Extraction configuration.
//!
//! One immutable [`ExtractionConfig`] is built at startup (see the extractor
//! service for YAML loading and CLI overrides) and passed to every step.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use flo2d_common::{HourWindow, StationMap, UtcOffset};
use flo2d_parser::ChannelColumn;

use crate::error::{IngestionError, Result};
use crate::forecast::validate_run_name;

/// Model used when none is configured.
pub const DEFAULT_MODEL: &str = "FLO2D_250";

/// Cell size of the default model.
pub const DEFAULT_CELL_SIZE: f64 = 250.0;

/// Known FLO-2D model variants and their cell sizes in metres.
pub const MODEL_PRESETS: &[(&str, f64)] = &[
    ("FLO2D_250", 250.0),
    ("FLO2D_150", 150.0),
    ("FLO2D_30", 30.0),
];

/// Cell size for a named model, if it is a known preset.
pub fn preset_cell_size(model: &str) -> Option<f64> {
    MODEL_PRESETS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(model))
        .map(|(_, size)| *size)
}

/// An explicit cell size wins; otherwise the model preset, otherwise 250.
pub fn resolve_cell_size(model: &str, explicit: Option<f64>) -> f64 {
    explicit
        .or_else(|| preset_cell_size(model))
        .unwrap_or(DEFAULT_CELL_SIZE)
}

/// Names of the model files inside the input directory.
#[derive(Debug, Clone, PartialEq)]
pub struct InputFiles {
    pub reference_points: String,
    pub depth: String,
    pub hydrograph: String,
    pub max_surface: String,
    pub topography: String,
}

impl Default for InputFiles {
    fn default() -> Self {
        Self {
            reference_points: "CADPTS.DAT".to_string(),
            depth: "TIMDEP.OUT".to_string(),
            hydrograph: "HYCHAN.OUT".to_string(),
            max_surface: "MAXWSELEV.OUT".to_string(),
            topography: "TOPO.DAT".to_string(),
        }
    }
}

/// Names of produced files and directories. File names are templates: a
/// time stamp or station name is inserted before the extension.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputNames {
    pub grid_file: String,
    pub grid_dir: String,
    pub water_level_file: String,
    pub water_level_dir: String,
    pub max_grid_file: String,
}

impl Default for OutputNames {
    fn default() -> Self {
        Self {
            grid_file: "water_level_grid.asc".to_string(),
            grid_dir: "water_level_grid".to_string(),
            water_level_file: "water_level.txt".to_string(),
            water_level_dir: "water_level".to_string(),
            max_grid_file: "max_wl_map.asc".to_string(),
        }
    }
}

/// Time references of one run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunTimes {
    /// Model state date and time; also the grid materialization cutoff.
    pub state: NaiveDateTime,
    /// Time that model hour 0 corresponds to.
    pub base: NaiveDateTime,
    /// Suffix of the output directories.
    pub output_suffix: String,
}

impl RunTimes {
    /// State at `date time`, base at midnight of the state date, suffix = date.
    pub fn new(date: NaiveDate, time: NaiveTime) -> Self {
        Self {
            state: date.and_time(time),
            base: date.and_time(NaiveTime::MIN),
            output_suffix: date.format("%Y-%m-%d").to_string(),
        }
    }

    pub fn with_base(mut self, base: NaiveDateTime) -> Self {
        self.base = base;
        self
    }

    pub fn with_output_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.output_suffix = suffix.into();
        self
    }
}

/// Settings of the per-timestep raster run.
#[derive(Debug, Clone, PartialEq)]
pub struct GridOptions {
    pub min_threshold: f64,
    pub nodata: f64,
    /// 1-based value column of the depth file.
    pub depth_column: usize,
    pub window: HourWindow,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            min_threshold: 0.3,
            nodata: ascii_grid::DEFAULT_NODATA,
            depth_column: 1,
            window: HourWindow::unbounded(),
        }
    }
}

/// Settings of the station series and forecast storage.
#[derive(Debug, Clone, PartialEq)]
pub struct WaterLevelOptions {
    pub stations: StationMap,
    pub channel_column: ChannelColumn,
    /// 1-based value column of the depth file used for flood-plain stations.
    pub flood_plain_column: usize,
    pub missing_value: f64,
    /// Replace existing events instead of skipping them.
    pub force_insert: bool,
    /// Run name, optionally with a `<strftime>` section.
    pub run_name: String,
    pub utc_offset: UtcOffset,
    pub variable: String,
    pub unit: String,
}

impl Default for WaterLevelOptions {
    fn default() -> Self {
        Self {
            stations: StationMap::default(),
            channel_column: ChannelColumn::Elevation,
            flood_plain_column: 5,
            missing_value: -999.0,
            force_insert: false,
            run_name: "Cloud-1".to_string(),
            utc_offset: UtcOffset::zero(),
            variable: "WaterLevel".to_string(),
            unit: "m".to_string(),
        }
    }
}

/// Everything an extraction run needs.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionConfig {
    pub model: String,
    pub cell_size: f64,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub inputs: InputFiles,
    pub outputs: OutputNames,
    pub times: RunTimes,
    pub grid: GridOptions,
    pub water_level: WaterLevelOptions,
}

impl ExtractionConfig {
    /// Configuration with defaults for everything but directories and times.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>, times: RunTimes) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            cell_size: DEFAULT_CELL_SIZE,
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            inputs: InputFiles::default(),
            outputs: OutputNames::default(),
            times,
            grid: GridOptions::default(),
            water_level: WaterLevelOptions::default(),
        }
    }

    /// Select a model and the cell size it implies.
    pub fn with_model(mut self, model: impl Into<String>, cell_size: Option<f64>) -> Self {
        self.model = model.into();
        self.cell_size = resolve_cell_size(&self.model, cell_size);
        self
    }

    pub fn input_path(&self, name: &str) -> PathBuf {
        self.input_dir.join(name)
    }

    pub fn grid_dir(&self) -> PathBuf {
        suffixed_dir(&self.output_dir, &self.outputs.grid_dir, &self.times.output_suffix)
    }

    pub fn water_level_dir(&self) -> PathBuf {
        suffixed_dir(
            &self.output_dir,
            &self.outputs.water_level_dir,
            &self.times.output_suffix,
        )
    }

    /// Reject values that would only fail later, mid-run.
    pub fn validate(&self) -> Result<()> {
        if !(self.cell_size.is_finite() && self.cell_size > 0.0) {
            return Err(IngestionError::InvalidConfig(format!(
                "cell size must be positive, got {}",
                self.cell_size
            )));
        }
        if !self.grid.min_threshold.is_finite() {
            return Err(IngestionError::InvalidConfig(
                "minimum threshold must be a finite number".to_string(),
            ));
        }
        if self.grid.depth_column == 0 || self.water_level.flood_plain_column == 0 {
            return Err(IngestionError::InvalidConfig(
                "value columns are 1-based; column 0 is the cell id".to_string(),
            ));
        }
        validate_run_name(&self.water_level.run_name)?;
        Ok(())
    }
}

fn suffixed_dir(root: &Path, name: &str, suffix: &str) -> PathBuf {
    if suffix.is_empty() {
        root.join(name)
    } else {
        root.join(format!("{}-{}", name, suffix))
    }
}
