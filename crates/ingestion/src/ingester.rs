//! The extraction orchestrator.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use ascii_grid::{read_ascii_grid, subtract_grids};
use flo2d_common::StationKind;
use flo2d_parser::{
    extract_channel_series_from_path, open_model_file, slice_blocks, BlockReader, SliceSummary,
};
use storage::TimeseriesSink;
use tracing::{info, instrument, warn};

use crate::config::ExtractionConfig;
use crate::error::{IngestionError, Result};
use crate::forecast::store_forecast;
use crate::raster::{run_grid, run_max_grid, write_text};
use crate::report::{Diagnostic, RunReport, Step};
use crate::scheduler::{station_file_name, OutputDir};
use crate::series::{channel_samples, extract_floodplain_series, write_series_csv, Sample};

/// File name of a sliced depth file.
pub const SLICED_DEPTH_FILE: &str = "TIMDEP_S.OUT";

/// Extracted series of one station.
#[derive(Debug, Clone)]
pub struct StationSeries {
    pub kind: StationKind,
    pub element_id: String,
    pub station: String,
    pub samples: Vec<Sample>,
}

/// Runs extraction steps against one configuration.
///
/// Each step either completes or fails on its own: [`Extractor::run`] records
/// a failed step in the report and carries on with the next one.
pub struct Extractor<'a> {
    config: &'a ExtractionConfig,
}

impl<'a> Extractor<'a> {
    pub fn new(config: &'a ExtractionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractionConfig {
        self.config
    }

    /// Run `steps` in order. Series extracted by the channel and flood-plain
    /// steps feed the forecast step, which needs a sink.
    #[instrument(skip_all, fields(model = %self.config.model))]
    pub fn run(&self, steps: &[Step], mut sink: Option<&mut dyn TimeseriesSink>) -> RunReport {
        let mut report = RunReport::new();
        let mut series: Vec<StationSeries> = Vec::new();

        for step in steps {
            let outcome = match step {
                Step::Grid => run_grid(self.config, &mut report),
                Step::MaxGrid => run_max_grid(self.config, &mut report).map(|_| ()),
                Step::ChannelSeries => self
                    .station_series(StationKind::Channel, &mut report)
                    .map(|s| series.extend(s)),
                Step::FloodPlainSeries => self
                    .station_series(StationKind::FloodPlain, &mut report)
                    .map(|s| series.extend(s)),
                Step::Forecast => match sink.as_deref_mut() {
                    Some(sink) => self.store_forecasts(&series, sink, &mut report),
                    None => Err(IngestionError::InvalidConfig(
                        "forecast storage requires a timeseries sink".to_string(),
                    )),
                },
                Step::Slice => {
                    let output = self.config.output_dir.join(SLICED_DEPTH_FILE);
                    self.slice(&output).map(|_| ())
                }
                Step::Subtract => Err(IngestionError::InvalidConfig(
                    "grid subtraction takes explicit files, see subtract_grid_files".to_string(),
                )),
            };

            if let Err(e) = outcome {
                report.fail(*step, e);
            }
        }

        report.log_summary();
        report
    }

    /// Extract every configured station of one kind and write its CSV file.
    pub fn station_series(&self, kind: StationKind, report: &mut RunReport) -> Result<Vec<StationSeries>> {
        let options = &self.config.water_level;
        let ids = options.stations.ids(kind);
        if ids.is_empty() {
            info!(?kind, "No stations configured");
            return Ok(Vec::new());
        }

        let extracted = match kind {
            StationKind::Channel => self.channel_series(&ids, report)?,
            StationKind::FloodPlain => self.flood_plain_series(&ids, report)?,
        };

        let mut out_dir = OutputDir::new(self.config.water_level_dir());
        let mut result = Vec::with_capacity(extracted.len());
        for (element_id, samples) in extracted {
            let station = options
                .stations
                .name(kind, &element_id)
                .unwrap_or(&element_id)
                .to_string();
            let file_name =
                station_file_name(&self.config.outputs.water_level_file, &station, self.config.times.state);
            let path = out_dir.file(&file_name)?;
            write_series_csv(&path, &samples, options.missing_value)?;
            info!(station = %station, samples = samples.len(), path = %path.display(), "Wrote station series");
            report.series_files.push(path);

            result.push(StationSeries {
                kind,
                element_id,
                station,
                samples,
            });
        }
        Ok(result)
    }

    fn channel_series(&self, ids: &[String], report: &mut RunReport) -> Result<Vec<(String, Vec<Sample>)>> {
        let step = Step::ChannelSeries;
        let extraction = extract_channel_series_from_path(
            self.config.input_path(&self.config.inputs.hydrograph),
            ids,
            self.config.water_level.channel_column,
        )?;

        for section in &extraction.incomplete {
            report.record(Diagnostic::IncompleteSection {
                element_id: section.element_id.clone(),
                rows: section.rows,
                expected: section.expected,
            });
        }

        let mut out = Vec::new();
        for id in ids {
            match extraction.series.get(id) {
                Some(series) => {
                    if series.dropped > 0 {
                        report.record(Diagnostic::NonNumericValue {
                            step,
                            element_id: id.clone(),
                            model_time: None,
                            occurrences: series.dropped,
                        });
                    }
                    let (samples, out_of_range) = channel_samples(series, self.config.times.base);
                    for model_time in out_of_range {
                        report.record(Diagnostic::TimeOutOfRange {
                            step,
                            element_id: Some(id.clone()),
                            model_time,
                        });
                    }
                    out.push((id.clone(), samples));
                }
                None => report.record(Diagnostic::ElementNotFound {
                    step,
                    element_id: id.clone(),
                }),
            }
        }
        Ok(out)
    }

    fn flood_plain_series(&self, ids: &[String], report: &mut RunReport) -> Result<Vec<(String, Vec<Sample>)>> {
        let step = Step::FloodPlainSeries;
        let blocks = BlockReader::open(self.config.input_path(&self.config.inputs.depth))?;
        let extracted = extract_floodplain_series(
            blocks,
            ids,
            self.config.water_level.flood_plain_column,
            self.config.times.base,
        )?;

        for line in &extracted.malformed_lines {
            report.record(Diagnostic::MalformedLine { step, line: *line });
        }
        for model_time in &extracted.out_of_range {
            report.record(Diagnostic::TimeOutOfRange {
                step,
                element_id: None,
                model_time: *model_time,
            });
        }
        for missing in extracted.missing.iter().filter(|m| m.present) {
            report.record(Diagnostic::NonNumericValue {
                step,
                element_id: missing.element_id.clone(),
                model_time: Some(missing.model_time),
                occurrences: 1,
            });
        }

        // An element absent from every block still gets its all-missing
        // series, so every station stays aligned with the block times.
        for id in extracted.series.keys() {
            let absent = extracted
                .missing
                .iter()
                .filter(|m| &m.element_id == id && !m.present)
                .count();
            if extracted.blocks > 0 && absent == extracted.blocks {
                report.record(Diagnostic::ElementNotFound {
                    step,
                    element_id: id.clone(),
                });
            }
        }
        Ok(extracted.series.into_iter().collect())
    }

    /// Store the forecast horizons of every extracted station.
    pub fn store_forecasts(
        &self,
        series: &[StationSeries],
        sink: &mut dyn TimeseriesSink,
        report: &mut RunReport,
    ) -> Result<()> {
        for station in series {
            store_forecast(
                sink,
                &station.station,
                &station.samples,
                self.config.times.state,
                &self.config.water_level,
                &self.config.model,
                report,
            )?;
        }
        Ok(())
    }

    /// Copy the depth blocks inside the configured hour window to `output`.
    pub fn slice(&self, output: &Path) -> Result<SliceSummary> {
        let input = open_model_file(self.config.input_path(&self.config.inputs.depth))?;
        if let Some(parent) = output.parent() {
            OutputDir::new(parent).ensure()?;
        }
        let file = File::create(output).map_err(|source| IngestionError::FileWrite {
            path: output.to_path_buf(),
            source,
        })?;
        let summary = slice_blocks(input, BufWriter::new(file), &self.config.grid.window)?;
        if summary.blocks_written == 0 {
            warn!(path = %output.display(), "No blocks inside the hour window");
        }
        info!(
            path = %output.display(),
            blocks_read = summary.blocks_read,
            blocks_written = summary.blocks_written,
            "Sliced depth file"
        );
        Ok(summary)
    }
}

/// Write `a - b` for two ASCII grid files.
pub fn subtract_grid_files(a: &Path, b: &Path, output: &Path) -> Result<PathBuf> {
    let read = |path: &Path| -> Result<ascii_grid::AsciiGrid> {
        if !path.exists() {
            return Err(IngestionError::MissingInputFile(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Ok(read_ascii_grid(&text)?)
    };
    let diff = subtract_grids(&read(a)?, &read(b)?)?;
    if let Some(parent) = output.parent() {
        OutputDir::new(parent).ensure()?;
    }
    write_text(output, &diff.to_text())?;
    info!(a = %a.display(), b = %b.display(), output = %output.display(), "Wrote grid difference");
    Ok(output.to_path_buf())
}
