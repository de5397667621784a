//! Grid runs: one raster per materialized depth block, and the
//! maximum-inundation raster.

use std::path::{Path, PathBuf};

use ascii_grid::{format_ascii_grid, rasterize, RasterIssue, RasterSettings};
use flo2d_common::{
    build_bounding_box, build_cell_map, BoundingBox, CellCoordinateMap,
};
use flo2d_parser::{
    load_reference_points, max_depths, open_model_file, read_max_surface_elevation,
    read_topography, BlockReader,
};
use tracing::{debug, info};

use crate::config::ExtractionConfig;
use crate::error::{IngestionError, Result};
use crate::report::{Diagnostic, RunReport, Step};
use crate::scheduler::{grid_file_name, should_materialize, Materialize, OutputDir};

/// Reference points resolved into a bounding box and a cell map.
#[derive(Debug, Clone)]
pub struct GridReference {
    pub bbox: BoundingBox,
    pub cell_map: CellCoordinateMap,
    pub cell_size: f64,
}

impl GridReference {
    /// Load the reference point file and index it at `cell_size`.
    pub fn load(path: &Path, cell_size: f64) -> Result<Self> {
        let points = load_reference_points(path)?;
        let bbox = build_bounding_box(&points)?;
        let cell_map = build_cell_map(&points, &bbox, cell_size)?;
        let dims = cell_map.dimensions();
        info!(
            path = %path.display(),
            cells = cell_map.len(),
            cols = dims.cols,
            rows = dims.rows,
            "Loaded grid reference"
        );
        Ok(Self {
            bbox,
            cell_map,
            cell_size,
        })
    }
}

fn settings(config: &ExtractionConfig) -> RasterSettings {
    RasterSettings {
        cell_size: config.cell_size,
        min_threshold: config.grid.min_threshold,
        nodata: config.grid.nodata,
    }
}

fn issue_diagnostic(step: Step, issue: RasterIssue, model_time: Option<f64>) -> Diagnostic {
    match issue {
        RasterIssue::UndefinedCellId { cell_id } => Diagnostic::UndefinedCellId {
            step,
            cell_id,
            model_time,
            occurrences: 1,
        },
        RasterIssue::OutOfBoundsCell { cell_id, col, row } => Diagnostic::OutOfBoundsCell {
            step,
            cell_id,
            col,
            row,
            occurrences: 1,
        },
        RasterIssue::NonNumericValue { cell_id } => Diagnostic::NonNumericValue {
            step,
            element_id: cell_id.to_string(),
            model_time,
            occurrences: 1,
        },
    }
}

pub(crate) fn write_text(path: &Path, text: &str) -> Result<()> {
    std::fs::write(path, text).map_err(|source| IngestionError::FileWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Write one grid per depth block inside the hour window and at or after the
/// model state time.
pub fn run_grid(config: &ExtractionConfig, report: &mut RunReport) -> Result<()> {
    let reference = GridReference::load(
        &config.input_path(&config.inputs.reference_points),
        config.cell_size,
    )?;
    let blocks = BlockReader::open(config.input_path(&config.inputs.depth))?;
    let settings = settings(config);
    let mut out_dir = OutputDir::new(config.grid_dir());

    for block in blocks {
        let block = block?;
        for line in &block.malformed_lines {
            report.record(Diagnostic::MalformedLine {
                step: Step::Grid,
                line: *line,
            });
        }

        if !config.grid.window.contains(block.model_time) {
            report.blocks_outside_window += 1;
            continue;
        }
        let at = match should_materialize(config.times.base, block.model_time, config.times.state) {
            Materialize::At(at) => at,
            Materialize::BeforeCutoff => {
                report.grids_skipped += 1;
                continue;
            }
            Materialize::OutOfRange => {
                report.record(Diagnostic::TimeOutOfRange {
                    step: Step::Grid,
                    element_id: None,
                    model_time: block.model_time,
                });
                continue;
            }
        };

        let column = config.grid.depth_column;
        let rasterized = rasterize(
            block.records.iter().map(|r| (r.cell_id, r.value(column))),
            &reference.cell_map,
            &settings,
        );
        for issue in rasterized.issues {
            report.record_repeated(issue_diagnostic(Step::Grid, issue, Some(block.model_time)));
        }

        let path = out_dir.file(&grid_file_name(&config.outputs.grid_file, at))?;
        write_text(
            &path,
            &format_ascii_grid(&rasterized.grid, &reference.bbox, reference.cell_size),
        )?;
        debug!(
            path = %path.display(),
            model_time = block.model_time,
            populated = rasterized.grid.populated(),
            "Wrote grid"
        );
        report.grids_written.push(path);
    }

    info!(
        written = report.grids_written.len(),
        skipped = report.grids_skipped,
        outside_window = report.blocks_outside_window,
        dir = %out_dir.path().display(),
        "Grid run finished"
    );
    Ok(())
}

/// Rasterize maximum depth (maximum water surface minus ground elevation).
pub fn run_max_grid(config: &ExtractionConfig, report: &mut RunReport) -> Result<PathBuf> {
    let reference = GridReference::load(
        &config.input_path(&config.inputs.reference_points),
        config.cell_size,
    )?;
    let surface = read_max_surface_elevation(open_model_file(
        config.input_path(&config.inputs.max_surface),
    )?)?;
    let ground = read_topography(open_model_file(config.input_path(&config.inputs.topography))?)?;
    let depths = max_depths(&surface, &ground)?;

    let rasterized = rasterize(
        depths.into_iter().map(|(id, depth)| (id, Some(depth))),
        &reference.cell_map,
        &settings(config),
    );
    for issue in rasterized.issues {
        report.record_repeated(issue_diagnostic(Step::MaxGrid, issue, None));
    }

    let path = OutputDir::new(&config.output_dir).file(&config.outputs.max_grid_file)?;
    write_text(
        &path,
        &format_ascii_grid(&rasterized.grid, &reference.bbox, reference.cell_size),
    )?;
    info!(path = %path.display(), populated = rasterized.grid.populated(), "Wrote max depth grid");
    report.grids_written.push(path.clone());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunTimes;
    use chrono::{NaiveDate, NaiveTime};
    use test_utils::{fixtures, write_fixture};

    fn config(input: &Path, output: &Path, state_hour: u32) -> ExtractionConfig {
        let times = RunTimes::new(
            NaiveDate::from_ymd_opt(2017, 5, 20).unwrap(),
            NaiveTime::from_hms_opt(state_hour, 0, 0).unwrap(),
        );
        ExtractionConfig::new(input, output, times).with_model("FLO2D_250", Some(50.0))
    }

    #[test]
    fn test_grid_run_respects_cutoff() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fixture(input.path(), "CADPTS.DAT", fixtures::CORNER_CADPTS);
        write_fixture(input.path(), "TIMDEP.OUT", fixtures::TWO_BLOCK_TIMDEP);

        // State at 02:00 keeps only the block at model hour 2.0.
        let config = config(input.path(), output.path(), 2);
        let mut report = RunReport::new();
        run_grid(&config, &mut report).unwrap();

        assert_eq!(report.grids_written.len(), 1);
        assert_eq!(report.grids_skipped, 1);
        let name = report.grids_written[0].file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "water_level_grid-2017-05-20_02-00-00.asc");
        assert!(report.grids_written[0].starts_with(output.path().join("water_level_grid-2017-05-20")));
    }

    #[test]
    fn test_grid_run_without_eligible_blocks_creates_no_directory() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fixture(input.path(), "CADPTS.DAT", fixtures::CORNER_CADPTS);
        write_fixture(input.path(), "TIMDEP.OUT", fixtures::TWO_BLOCK_TIMDEP);

        let config = config(input.path(), output.path(), 23);
        let mut report = RunReport::new();
        run_grid(&config, &mut report).unwrap();

        assert!(report.grids_written.is_empty());
        assert!(!config.grid_dir().exists());
    }

    #[test]
    fn test_unrepresentable_block_time_is_a_diagnostic() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fixture(input.path(), "CADPTS.DAT", fixtures::CORNER_CADPTS);
        write_fixture(input.path(), "TIMDEP.OUT", "1e12\n1 0.5\n\n2.0\n1 0.6\n");

        let config = config(input.path(), output.path(), 0);
        let mut report = RunReport::new();
        run_grid(&config, &mut report).unwrap();

        assert_eq!(report.grids_written.len(), 1);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::TimeOutOfRange {
                step: Step::Grid,
                element_id: None,
                model_time: 1e12,
            }]
        );
    }

    #[test]
    fn test_infinite_block_time_fails_the_step() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fixture(input.path(), "CADPTS.DAT", fixtures::CORNER_CADPTS);
        write_fixture(input.path(), "TIMDEP.OUT", "1.0\n1 0.5\n\ninf\n1 0.6\n");

        let config = config(input.path(), output.path(), 0);
        let mut report = RunReport::new();
        let err = run_grid(&config, &mut report).unwrap_err();
        assert!(err.to_string().contains("line 4"), "{}", err);
        assert_eq!(report.grids_written.len(), 1);
    }

    #[test]
    fn test_undefined_cell_is_reported_once_per_run() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        write_fixture(input.path(), "CADPTS.DAT", fixtures::CORNER_CADPTS);
        write_fixture(input.path(), "TIMDEP.OUT", "1.0\n9 0.5\n1 0.5\n\n2.0\n9 0.6\n\n3.0\n9 0.7\n");

        let config = config(input.path(), output.path(), 0);
        let mut report = RunReport::new();
        run_grid(&config, &mut report).unwrap();

        assert_eq!(report.grids_written.len(), 3);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UndefinedCellId {
                step: Step::Grid,
                cell_id: 9,
                model_time: Some(1.0),
                occurrences: 3,
            }]
        );
    }

    #[test]
    fn test_missing_reference_file() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let config = config(input.path(), output.path(), 0);
        let mut report = RunReport::new();
        let err = run_grid(&config, &mut report).unwrap_err();
        assert!(matches!(err, IngestionError::MissingInputFile(_)));
    }
}
