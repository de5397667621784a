//! Per-run summary of what was produced and what was skipped.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::{info, warn};

/// Extraction steps, in the order a full run executes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Grid,
    MaxGrid,
    ChannelSeries,
    FloodPlainSeries,
    Forecast,
    Slice,
    Subtract,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Grid => "grid",
            Step::MaxGrid => "max_grid",
            Step::ChannelSeries => "channel_series",
            Step::FloodPlainSeries => "flood_plain_series",
            Step::Forecast => "forecast",
            Step::Slice => "slice",
            Step::Subtract => "subtract",
        };
        f.write_str(name)
    }
}

/// A recoverable problem met during a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    /// A record references a cell id missing from the reference file.
    /// `model_time` is the first block it was seen in.
    UndefinedCellId {
        step: Step,
        cell_id: u64,
        model_time: Option<f64>,
        occurrences: usize,
    },
    /// A reference cell maps outside the grid extents.
    OutOfBoundsCell {
        step: Step,
        cell_id: u64,
        col: i64,
        row: i64,
        occurrences: usize,
    },
    /// A value could not be read as a number.
    NonNumericValue {
        step: Step,
        element_id: String,
        model_time: Option<f64>,
        occurrences: usize,
    },
    /// A model time that does not map to a representable timestamp.
    TimeOutOfRange {
        step: Step,
        element_id: Option<String>,
        model_time: f64,
    },
    /// A data line whose cell id could not be parsed.
    MalformedLine { step: Step, line: usize },
    /// A hydrograph section ended before the inferred length.
    IncompleteSection {
        element_id: String,
        rows: usize,
        expected: usize,
    },
    /// A configured element has no data in the model output.
    ElementNotFound { step: Step, element_id: String },
    /// The sink does not know the station.
    StationNotFound { station: String },
    /// An event for this horizon exists and overwriting was not requested.
    EventExists { station: String, horizon: String },
    /// A sink call failed.
    PersistenceSinkUnavailable {
        station: String,
        horizon: Option<String>,
        message: String,
    },
}

impl Diagnostic {
    /// Short name of the diagnostic kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Diagnostic::UndefinedCellId { .. } => "undefined_cell_id",
            Diagnostic::OutOfBoundsCell { .. } => "out_of_bounds_cell",
            Diagnostic::NonNumericValue { .. } => "non_numeric_value",
            Diagnostic::TimeOutOfRange { .. } => "time_out_of_range",
            Diagnostic::MalformedLine { .. } => "malformed_line",
            Diagnostic::IncompleteSection { .. } => "incomplete_section",
            Diagnostic::ElementNotFound { .. } => "element_not_found",
            Diagnostic::StationNotFound { .. } => "station_not_found",
            Diagnostic::EventExists { .. } => "event_exists",
            Diagnostic::PersistenceSinkUnavailable { .. } => "persistence_sink_unavailable",
        }
    }

    /// How many times the problem was seen.
    pub fn occurrences(&self) -> usize {
        match self {
            Diagnostic::UndefinedCellId { occurrences, .. }
            | Diagnostic::OutOfBoundsCell { occurrences, .. }
            | Diagnostic::NonNumericValue { occurrences, .. } => *occurrences,
            _ => 1,
        }
    }

    fn repeat_key(&self) -> Option<RepeatKey> {
        match self {
            Diagnostic::UndefinedCellId { step, cell_id, .. }
            | Diagnostic::OutOfBoundsCell { step, cell_id, .. } => {
                Some((self.kind(), *step, cell_id.to_string()))
            }
            Diagnostic::NonNumericValue { step, element_id, .. } => {
                Some((self.kind(), *step, element_id.clone()))
            }
            _ => None,
        }
    }

    fn add_occurrence(&mut self) {
        if let Diagnostic::UndefinedCellId { occurrences, .. }
        | Diagnostic::OutOfBoundsCell { occurrences, .. }
        | Diagnostic::NonNumericValue { occurrences, .. } = self
        {
            *occurrences += 1;
        }
    }
}

type RepeatKey = (&'static str, Step, String);

/// A step that ended with an error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedStep {
    pub step: Step,
    pub error: String,
}

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub grids_written: Vec<PathBuf>,
    /// Blocks before the materialization cutoff.
    pub grids_skipped: usize,
    /// Blocks outside the model-hour window.
    pub blocks_outside_window: usize,
    pub series_files: Vec<PathBuf>,
    pub horizons_stored: usize,
    pub rows_stored: usize,
    pub diagnostics: Vec<Diagnostic>,
    pub failed_steps: Vec<FailedStep>,
    #[serde(skip)]
    repeats: HashMap<RepeatKey, usize>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and log a diagnostic.
    pub fn record(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::EventExists { station, horizon } => {
                info!(%station, %horizon, "Timeseries already exists, use force to update")
            }
            other => warn!(kind = other.kind(), detail = ?other, "Diagnostic"),
        }
        self.diagnostics.push(diagnostic);
    }

    /// Record a per-cell diagnostic once. Later reports of the same problem
    /// for the same cell and step only raise its occurrence count.
    pub fn record_repeated(&mut self, diagnostic: Diagnostic) {
        let Some(key) = diagnostic.repeat_key() else {
            return self.record(diagnostic);
        };
        if let Some(existing) = self.repeats.get(&key).and_then(|&i| self.diagnostics.get_mut(i)) {
            existing.add_occurrence();
            return;
        }
        self.repeats.insert(key, self.diagnostics.len());
        self.record(diagnostic);
    }

    /// Record a step that ended with an error.
    pub fn fail(&mut self, step: Step, error: impl fmt::Display) {
        let error = error.to_string();
        warn!(%step, %error, "Step failed");
        self.failed_steps.push(FailedStep { step, error });
    }

    /// True when no step failed.
    pub fn is_success(&self) -> bool {
        self.failed_steps.is_empty()
    }

    /// Number of diagnostics of one kind.
    pub fn count(&self, kind: &str) -> usize {
        self.diagnostics.iter().filter(|d| d.kind() == kind).count()
    }

    /// Total occurrences behind the diagnostics of one kind.
    pub fn occurrences(&self, kind: &str) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.kind() == kind)
            .map(Diagnostic::occurrences)
            .sum()
    }

    /// Log the totals.
    pub fn log_summary(&self) {
        info!(
            grids_written = self.grids_written.len(),
            grids_skipped = self.grids_skipped,
            blocks_outside_window = self.blocks_outside_window,
            series_files = self.series_files.len(),
            horizons_stored = self.horizons_stored,
            rows_stored = self.rows_stored,
            diagnostics = self.diagnostics.len(),
            failed_steps = self.failed_steps.len(),
            "Run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_success() {
        let mut report = RunReport::new();
        report.record(Diagnostic::UndefinedCellId {
            step: Step::Grid,
            cell_id: 9,
            model_time: Some(1.0),
            occurrences: 1,
        });
        report.record(Diagnostic::UndefinedCellId {
            step: Step::Grid,
            cell_id: 9,
            model_time: Some(2.0),
            occurrences: 1,
        });
        report.record(Diagnostic::StationNotFound {
            station: "Dehiwala Canal".to_string(),
        });

        assert_eq!(report.count("undefined_cell_id"), 2);
        assert_eq!(report.count("station_not_found"), 1);
        assert!(report.is_success());

        report.fail(Step::ChannelSeries, "Input file not found: HYCHAN.OUT");
        assert!(!report.is_success());
    }

    #[test]
    fn test_repeated_cell_problems_are_folded() {
        let mut report = RunReport::new();
        for block in 0..1000 {
            for cell_id in [7, 8] {
                report.record_repeated(Diagnostic::UndefinedCellId {
                    step: Step::Grid,
                    cell_id,
                    model_time: Some(block as f64),
                    occurrences: 1,
                });
            }
        }
        report.record_repeated(Diagnostic::UndefinedCellId {
            step: Step::MaxGrid,
            cell_id: 7,
            model_time: None,
            occurrences: 1,
        });
        report.record_repeated(Diagnostic::MalformedLine {
            step: Step::Grid,
            line: 4,
        });

        assert_eq!(report.diagnostics.len(), 4);
        assert_eq!(report.count("undefined_cell_id"), 3);
        assert_eq!(report.occurrences("undefined_cell_id"), 2001);
        assert_eq!(
            report.diagnostics[0],
            Diagnostic::UndefinedCellId {
                step: Step::Grid,
                cell_id: 7,
                model_time: Some(0.0),
                occurrences: 1000,
            }
        );
        assert_eq!(report.count("malformed_line"), 1);
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let diagnostic = Diagnostic::OutOfBoundsCell {
            step: Step::Grid,
            cell_id: 3,
            col: -1,
            row: 0,
            occurrences: 1,
        };
        let json = serde_json::to_value(&diagnostic).unwrap();
        assert_eq!(json["kind"], "out_of_bounds_cell");
        assert_eq!(json["step"], "grid");
    }
}
