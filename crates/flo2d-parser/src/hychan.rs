//! Channel hydrograph report (`HYCHAN.OUT`).
//!
//! The report holds one section per channel element. A section opens with a
//! header line containing [`CHANNEL_HYDROGRAPH_MARKER`] followed by the
//! element id, then a few column-title lines, then one numeric row per output
//! time: `time_hours elevation depth ...`.
//!
//! Sections carry no explicit length, so reading takes two passes over the
//! file: [`infer_section_length`] counts the rows of the first section and
//! [`extract_channel_series`] then collects exactly that many rows for each
//! requested element.

use std::collections::{BTreeMap, HashSet};
use std::io::BufRead;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::ParseResult;
use crate::reader::open_model_file;

/// Text identifying a section header line.
pub const CHANNEL_HYDROGRAPH_MARKER: &str = "CHANNEL HYDROGRAPH FOR ELEMENT NO:";

/// Which value column of a hydrograph row to extract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChannelColumn {
    /// Water surface elevation (column 1).
    #[default]
    Elevation,
    /// Flow depth (column 2).
    Depth,
}

impl ChannelColumn {
    /// Token index within a row; index 0 is the time.
    pub fn index(self) -> usize {
        match self {
            ChannelColumn::Elevation => 1,
            ChannelColumn::Depth => 2,
        }
    }
}

/// One hydrograph sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelSample {
    /// Hours since model start.
    pub hours: f64,
    pub value: f64,
}

/// Extracted series for a channel element.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelSeries {
    pub element_id: String,
    pub samples: Vec<ChannelSample>,
    /// Rows whose value was missing, non-numeric or NaN.
    pub dropped: usize,
}

/// A requested section that ended before reaching the inferred length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncompleteSection {
    pub element_id: String,
    pub rows: usize,
    pub expected: usize,
}

/// Result of the extraction pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelExtraction {
    /// Complete sections keyed by element id.
    pub series: BTreeMap<String, ChannelSeries>,
    pub incomplete: Vec<IncompleteSection>,
}

fn is_numeric(token: &str) -> bool {
    token.parse::<f64>().map_or(false, |v| v.is_finite())
}

fn header_element_id(line: &str) -> Option<Option<&str>> {
    let start = line.find(CHANNEL_HYDROGRAPH_MARKER)?;
    Some(
        line[start + CHANNEL_HYDROGRAPH_MARKER.len()..]
            .split_whitespace()
            .next(),
    )
}

/// Count the data rows of the first section.
///
/// Counting starts at the first numeric row after a header and stops at the
/// first non-numeric line that follows, or at end of input. Returns `None`
/// when the report contains no data rows.
pub fn infer_section_length<R: BufRead>(reader: R) -> ParseResult<Option<usize>> {
    let mut in_section = false;
    let mut count = 0usize;

    for line in reader.lines() {
        let line = line?;
        if header_element_id(&line).is_some() {
            if count > 0 {
                return Ok(Some(count));
            }
            in_section = true;
            continue;
        }
        if !in_section {
            continue;
        }

        match line.split_whitespace().next() {
            Some(first) if is_numeric(first) => count += 1,
            _ if count > 0 => return Ok(Some(count)),
            _ => {}
        }
    }

    Ok((count > 0).then_some(count))
}

struct OpenSection {
    element_id: String,
    rows: usize,
    samples: Vec<ChannelSample>,
    dropped: usize,
}

impl OpenSection {
    fn incomplete(self, expected: usize) -> IncompleteSection {
        IncompleteSection {
            element_id: self.element_id,
            rows: self.rows,
            expected,
        }
    }
}

/// Collect `section_len` rows for each requested element.
///
/// A header line resets the row count. Sections for ids not in `element_ids`
/// are skipped. A section cut short by the next header or end of input is
/// reported in [`ChannelExtraction::incomplete`] and contributes no series.
pub fn extract_channel_series<R: BufRead>(
    reader: R,
    section_len: usize,
    element_ids: &[String],
    column: ChannelColumn,
) -> ParseResult<ChannelExtraction> {
    let wanted: HashSet<&str> = element_ids.iter().map(String::as_str).collect();
    let mut extraction = ChannelExtraction::default();
    let mut open: Option<OpenSection> = None;
    let value_index = column.index();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;

        if let Some(id) = header_element_id(&line) {
            if let Some(section) = open.take() {
                extraction.incomplete.push(section.incomplete(section_len));
            }
            match id {
                Some(id) if wanted.contains(id) => {
                    open = Some(OpenSection {
                        element_id: id.to_string(),
                        rows: 0,
                        samples: Vec::with_capacity(section_len),
                        dropped: 0,
                    });
                }
                Some(_) => {}
                None => warn!(line = index + 1, "Hydrograph header without element id"),
            }
            continue;
        }

        let Some(section) = open.as_mut() else {
            continue;
        };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(hours) = tokens
            .first()
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|h| h.is_finite())
        else {
            continue;
        };

        section.rows += 1;
        let value = tokens
            .get(value_index)
            .and_then(|t| t.parse::<f64>().ok())
            .filter(|v| !v.is_nan());
        match value {
            Some(value) => section.samples.push(ChannelSample { hours, value }),
            None => section.dropped += 1,
        }

        if section.rows == section_len {
            if let Some(done) = open.take() {
                debug!(
                    element_id = %done.element_id,
                    samples = done.samples.len(),
                    dropped = done.dropped,
                    "Channel section complete"
                );
                let element_id = done.element_id.clone();
                let series = ChannelSeries {
                    element_id: done.element_id,
                    samples: done.samples,
                    dropped: done.dropped,
                };
                if extraction.series.insert(element_id.clone(), series).is_some() {
                    warn!(%element_id, "Element reported twice, keeping last");
                }
            }
        }
    }

    if let Some(section) = open.take() {
        extraction.incomplete.push(section.incomplete(section_len));
    }

    Ok(extraction)
}

/// Run both passes over a hydrograph file.
pub fn extract_channel_series_from_path<P: AsRef<Path>>(
    path: P,
    element_ids: &[String],
    column: ChannelColumn,
) -> ParseResult<ChannelExtraction> {
    let path = path.as_ref();
    let Some(section_len) = infer_section_length(open_model_file(path)?)? else {
        warn!(path = %path.display(), "Hydrograph report has no data rows");
        return Ok(ChannelExtraction::default());
    };
    info!(path = %path.display(), section_len, "Inferred hydrograph section length");

    extract_channel_series(open_model_file(path)?, section_len, element_ids, column)
}
