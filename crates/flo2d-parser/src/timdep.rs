//! Time-stepped depth file (`TIMDEP.OUT`).
//!
//! The file is a sequence of blocks. A line with exactly one token opens a
//! block and carries the model time in hours. Each following line with two or
//! more tokens is a record: `cell_id value_1 value_2 ...`. A blank line closes
//! the record window of the current block; lines after it are ignored until
//! the next framing line. Lines before the first framing line are preamble.

use std::io::{BufRead, Write};
use std::path::Path;

use flo2d_common::HourWindow;
use tracing::{debug, trace};

use crate::error::{ParseError, ParseResult};
use crate::reader::open_model_file;

/// One record line of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockRecord {
    pub cell_id: u64,
    /// Values after the cell id. Tokens that are not finite numbers are `None`.
    pub values: Vec<Option<f64>>,
}

impl BlockRecord {
    /// Value at a 1-based data column (column 0 is the cell id).
    pub fn value(&self, column: usize) -> Option<f64> {
        column
            .checked_sub(1)
            .and_then(|i| self.values.get(i))
            .copied()
            .flatten()
    }

    /// Whether the line had a token at this 1-based data column.
    pub fn has_column(&self, column: usize) -> bool {
        column >= 1 && column <= self.values.len()
    }
}

/// One time step of the file.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBlock {
    /// Hours since model start.
    pub model_time: f64,
    /// 1-based line number of the framing line.
    pub line: usize,
    pub records: Vec<BlockRecord>,
    /// Record lines whose cell id could not be parsed.
    pub malformed_lines: Vec<usize>,
}

impl TimeBlock {
    fn new(model_time: f64, line: usize) -> Self {
        Self {
            model_time,
            line,
            records: Vec::new(),
            malformed_lines: Vec::new(),
        }
    }
}

/// Forward-only reader yielding one [`TimeBlock`] at a time.
pub struct BlockReader<R> {
    reader: R,
    buf: String,
    line_no: usize,
    current: Option<TimeBlock>,
    window_closed: bool,
    finished: bool,
    // Raised by a bad framing line after the block before it was returned.
    pending_error: Option<ParseError>,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: String::new(),
            line_no: 0,
            current: None,
            window_closed: false,
            finished: false,
            pending_error: None,
        }
    }

    /// Read the next complete block. The trailing block is returned at end of
    /// input even without a closing blank line.
    ///
    /// A framing line that is not a finite number is an error. The block
    /// before it is still returned first.
    pub fn next_block(&mut self) -> ParseResult<Option<TimeBlock>> {
        if let Some(err) = self.pending_error.take() {
            self.finished = true;
            return Err(err);
        }
        if self.finished {
            return Ok(None);
        }

        loop {
            self.buf.clear();
            if self.reader.read_line(&mut self.buf)? == 0 {
                self.finished = true;
                return Ok(self.current.take());
            }
            self.line_no += 1;

            let mut tokens = self.buf.split_whitespace();
            match (tokens.next(), tokens.next()) {
                (None, _) => {
                    if self.current.is_some() {
                        self.window_closed = true;
                    }
                }
                (Some(frame), None) => {
                    let model_time = match parse_frame(frame, self.line_no) {
                        Ok(model_time) => model_time,
                        Err(err) => match self.current.take() {
                            Some(done) => {
                                self.pending_error = Some(err);
                                return Ok(Some(done));
                            }
                            None => {
                                self.finished = true;
                                return Err(err);
                            }
                        },
                    };
                    trace!(line = self.line_no, model_time, "Block start");

                    self.window_closed = false;
                    let next = TimeBlock::new(model_time, self.line_no);
                    if let Some(done) = self.current.replace(next) {
                        return Ok(Some(done));
                    }
                }
                (Some(id), Some(first)) => {
                    let Some(block) = self.current.as_mut() else {
                        continue;
                    };
                    if self.window_closed {
                        continue;
                    }
                    match id.parse::<u64>() {
                        Ok(cell_id) => {
                            let values = std::iter::once(first)
                                .chain(tokens)
                                .map(parse_value)
                                .collect();
                            block.records.push(BlockRecord { cell_id, values });
                        }
                        Err(_) => block.malformed_lines.push(self.line_no),
                    }
                }
            }
        }
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = ParseResult<TimeBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_block() {
            Ok(block) => block.map(Ok),
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Iterate over the blocks of a stream.
pub fn parse_blocks<R: BufRead>(reader: R) -> BlockReader<R> {
    BlockReader::new(reader)
}

impl BlockReader<Box<dyn BufRead>> {
    /// Open a `TIMDEP.OUT` (or `.gz`) file.
    pub fn open<P: AsRef<Path>>(path: P) -> ParseResult<Self> {
        Ok(Self::new(open_model_file(path)?))
    }
}

fn parse_frame(token: &str, line: usize) -> ParseResult<f64> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ParseError::invalid(line, format!("framing line '{}' is not a model time", token)))
}

fn parse_value(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Counts from a slicing pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SliceSummary {
    pub blocks_read: usize,
    pub blocks_written: usize,
}

/// Copy the blocks whose model time lies inside `window` verbatim.
///
/// Framing and data lines of a selected block are written unchanged,
/// including the blank separator lines that follow them.
pub fn slice_blocks<R: BufRead, W: Write>(
    mut reader: R,
    mut writer: W,
    window: &HourWindow,
) -> ParseResult<SliceSummary> {
    let mut summary = SliceSummary::default();
    let mut buf = String::new();
    let mut line_no = 0;
    let mut writing = false;

    loop {
        buf.clear();
        if reader.read_line(&mut buf)? == 0 {
            break;
        }
        line_no += 1;

        let mut tokens = buf.split_whitespace();
        if let (Some(frame), None) = (tokens.next(), tokens.next()) {
            let model_time = parse_frame(frame, line_no)?;
            summary.blocks_read += 1;
            writing = window.contains(model_time);
            if writing {
                summary.blocks_written += 1;
            }
        }

        if writing {
            writer.write_all(buf.as_bytes())?;
        }
    }

    writer.flush()?;
    debug!(
        blocks_read = summary.blocks_read,
        blocks_written = summary.blocks_written,
        "Sliced time-stepped file"
    );
    Ok(summary)
}
