//! Persistence for extracted forecast time series.
//!
//! Provides:
//! - The [`TimeseriesSink`] interface consumed by the extractor
//! - An in-memory sink for tests and dry runs
//! - A JSON file catalog used by the command line tool

pub mod catalog;
pub mod error;
pub mod memory;
pub mod sink;

pub use catalog::JsonCatalogSink;
pub use error::{StorageError, StorageResult};
pub use memory::MemorySink;
pub use sink::{EventId, EventMetadata, Station, TimeseriesPoint, TimeseriesSink};
