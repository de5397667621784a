//! Parsers for FLO-2D model output files.
//!
//! All readers stream through a 64 KiB buffer so memory stays proportional to
//! one block or section, never to the whole file. Files ending in `.gz` are
//! decompressed on the fly.
//!
//! # File kinds
//!
//! - `CADPTS.DAT`: reference cell centres (`id x y`)
//! - `TIMDEP.OUT`: time-stepped per-cell values, framed by single-token lines
//! - `HYCHAN.OUT`: channel hydrograph report, one section per element
//! - `MAXWSELEV.OUT` / `TOPO.DAT`: maximum water surface and ground elevation

pub mod cadpts;
pub mod error;
pub mod hychan;
pub mod maxwselev;
pub mod reader;
pub mod timdep;

pub use cadpts::{load_reference_points, read_reference_points};
pub use error::{ParseError, ParseResult};
pub use hychan::{
    extract_channel_series, extract_channel_series_from_path, infer_section_length,
    ChannelColumn, ChannelExtraction, ChannelSample, ChannelSeries, IncompleteSection,
    CHANNEL_HYDROGRAPH_MARKER,
};
pub use maxwselev::{max_depths, read_max_surface_elevation, read_topography, MaxSurfaceRecord};
pub use reader::{open_model_file, READ_BUFFER_SIZE};
pub use timdep::{parse_blocks, slice_blocks, BlockReader, BlockRecord, SliceSummary, TimeBlock};
