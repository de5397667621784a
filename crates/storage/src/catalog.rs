//! JSON file catalog.
//!
//! The whole catalog (stations, events and their points) lives in one JSON
//! document. Every mutation rewrites the file through a temporary sibling and
//! a rename, so a crash never leaves a half-written catalog.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::StorageResult;
use crate::memory::MemorySink;
use crate::sink::{EventId, EventMetadata, Station, TimeseriesPoint, TimeseriesSink};

/// File-backed sink.
pub struct JsonCatalogSink {
    path: PathBuf,
    state: MemorySink,
}

impl JsonCatalogSink {
    /// Open a catalog file, starting empty when it does not exist yet.
    pub fn open<P: AsRef<Path>>(path: P) -> StorageResult<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let text = fs::read_to_string(&path)?;
            serde_json::from_str(&text)?
        } else {
            MemorySink::new()
        };

        info!(
            path = %path.display(),
            events = state.event_count(),
            "Opened timeseries catalog"
        );
        Ok(Self { path, state })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read-only view of the catalog contents.
    pub fn state(&self) -> &MemorySink {
        &self.state
    }

    /// Register a station and persist. Known names are left untouched.
    pub fn add_station(&mut self, station: Station) -> StorageResult<bool> {
        let added = self.state.add_station(station);
        if added {
            self.persist()?;
        }
        Ok(added)
    }

    fn persist(&self) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(&self.state)?)?;
        fs::rename(&tmp, &self.path)?;
        debug!(path = %self.path.display(), "Catalog written");
        Ok(())
    }
}

impl TimeseriesSink for JsonCatalogSink {
    fn get_station(&self, name: &str) -> StorageResult<Option<Station>> {
        self.state.get_station(name)
    }

    fn get_event_id(&self, metadata: &EventMetadata) -> StorageResult<Option<EventId>> {
        self.state.get_event_id(metadata)
    }

    fn create_event_id(&mut self, metadata: &EventMetadata) -> StorageResult<EventId> {
        let id = self.state.create_event_id(metadata)?;
        self.persist()?;
        Ok(id)
    }

    fn insert_timeseries(
        &mut self,
        event_id: EventId,
        points: &[TimeseriesPoint],
        overwrite: bool,
    ) -> StorageResult<usize> {
        let written = self.state.insert_timeseries(event_id, points, overwrite)?;
        if written > 0 {
            self.persist()?;
        }
        Ok(written)
    }
}
