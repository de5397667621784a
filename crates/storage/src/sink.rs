//! Sink interface and the records it stores.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::StorageResult;

/// A measurement station known to the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
}

impl Station {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latitude: None,
            longitude: None,
        }
    }
}

/// Identity of one stored series. Two events are the same when every field
/// matches.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventMetadata {
    pub station: String,
    pub variable: String,
    pub unit: String,
    /// Forecast horizon label, e.g. `Forecast-0-d`.
    #[serde(rename = "type")]
    pub event_type: String,
    pub source: String,
    /// Run name.
    pub name: String,
}

/// Opaque event identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(Uuid);

impl EventId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One stored sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesPoint {
    pub time: NaiveDateTime,
    pub value: f64,
}

impl TimeseriesPoint {
    pub fn new(time: NaiveDateTime, value: f64) -> Self {
        Self { time, value }
    }
}

/// Station, event and time-series store.
pub trait TimeseriesSink {
    /// Look up a station by name.
    fn get_station(&self, name: &str) -> StorageResult<Option<Station>>;

    /// Find the event matching `metadata`, if one exists.
    fn get_event_id(&self, metadata: &EventMetadata) -> StorageResult<Option<EventId>>;

    /// Register a new event.
    fn create_event_id(&mut self, metadata: &EventMetadata) -> StorageResult<EventId>;

    /// Store points under an event. With `overwrite`, points at existing
    /// timestamps are replaced; without it they are kept. Returns the number of
    /// points written.
    fn insert_timeseries(
        &mut self,
        event_id: EventId,
        points: &[TimeseriesPoint],
        overwrite: bool,
    ) -> StorageResult<usize>;
}
