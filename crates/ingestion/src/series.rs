//! Station time series from the hydrograph report and the depth file.
//!
//! Channel and flood-plain series treat unreadable values differently:
//! - channel samples that are missing, non-numeric or NaN are dropped
//! - flood-plain samples become [`SampleValue::Missing`], so every station
//!   has exactly one sample per block

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::Path;

use chrono::NaiveDateTime;
use flo2d_common::{model_time_to_datetime, DATE_TIME_FORMAT};
use flo2d_parser::{BlockReader, ChannelSeries};
use serde::Serialize;

use crate::error::{IngestionError, Result};

/// A reading or the declared missing-value marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum SampleValue {
    Value(f64),
    Missing,
}

impl SampleValue {
    /// Numeric form, with `Missing` as `sentinel`.
    pub fn or_sentinel(self, sentinel: f64) -> f64 {
        match self {
            SampleValue::Value(v) => v,
            SampleValue::Missing => sentinel,
        }
    }
}

/// One timestamped sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    pub time: NaiveDateTime,
    pub value: SampleValue,
}

/// Channel samples as timestamps relative to `base`, and the model hours of
/// samples whose timestamp cannot be represented.
pub fn channel_samples(series: &ChannelSeries, base: NaiveDateTime) -> (Vec<Sample>, Vec<f64>) {
    let mut samples = Vec::with_capacity(series.samples.len());
    let mut out_of_range = Vec::new();
    for s in &series.samples {
        match model_time_to_datetime(base, s.hours) {
            Some(time) => samples.push(Sample {
                time,
                value: SampleValue::Value(s.value),
            }),
            None => out_of_range.push(s.hours),
        }
    }
    (samples, out_of_range)
}

/// A flood-plain value that could not be read.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingSample {
    pub element_id: String,
    pub model_time: f64,
    /// False when the cell had no record in the block at all.
    pub present: bool,
}

/// Result of reading flood-plain series.
#[derive(Debug, Clone, Default)]
pub struct FloodPlainSeries {
    pub series: BTreeMap<String, Vec<Sample>>,
    pub missing: Vec<MissingSample>,
    pub malformed_lines: Vec<usize>,
    /// Model times of blocks skipped because their timestamp cannot be
    /// represented.
    pub out_of_range: Vec<f64>,
    /// Blocks that contributed a sample.
    pub blocks: usize,
}

/// Read one value per listed element from every block of a depth file.
///
/// Elements without a record in a block, or whose value is not a number, get
/// [`SampleValue::Missing`] at that timestamp.
pub fn extract_floodplain_series<R: BufRead>(
    blocks: BlockReader<R>,
    element_ids: &[String],
    column: usize,
    base: NaiveDateTime,
) -> Result<FloodPlainSeries> {
    let wanted: BTreeMap<u64, &str> = element_ids
        .iter()
        .filter_map(|id| id.trim().parse::<u64>().ok().map(|n| (n, id.as_str())))
        .collect();
    if wanted.len() != element_ids.len() {
        return Err(IngestionError::InvalidConfig(
            "flood-plain element ids must be integer cell ids".to_string(),
        ));
    }

    let mut out = FloodPlainSeries {
        series: element_ids.iter().map(|id| (id.clone(), Vec::new())).collect(),
        ..Default::default()
    };

    for block in blocks {
        let block = block?;
        out.malformed_lines.extend(&block.malformed_lines);
        let Some(time) = model_time_to_datetime(base, block.model_time) else {
            out.out_of_range.push(block.model_time);
            continue;
        };
        out.blocks += 1;

        let mut found: BTreeMap<u64, Option<f64>> = BTreeMap::new();
        for record in &block.records {
            if wanted.contains_key(&record.cell_id) {
                found.insert(record.cell_id, record.value(column));
            }
        }

        for (cell_id, element_id) in &wanted {
            let value = match found.get(cell_id) {
                Some(Some(v)) => SampleValue::Value(*v),
                Some(None) | None => {
                    out.missing.push(MissingSample {
                        element_id: element_id.to_string(),
                        model_time: block.model_time,
                        present: found.contains_key(cell_id),
                    });
                    SampleValue::Missing
                }
            };
            if let Some(series) = out.series.get_mut(*element_id) {
                series.push(Sample { time, value });
            }
        }
    }

    Ok(out)
}

/// Write `timestamp,value` rows without a header.
pub fn write_series_csv(path: &Path, samples: &[Sample], missing_value: f64) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for sample in samples {
        writer.write_record([
            sample.time.format(DATE_TIME_FORMAT).to_string(),
            sample.value.or_sentinel(missing_value).to_string(),
        ])?;
    }
    writer.flush().map_err(|source| IngestionError::FileWrite {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(())
}
