//! In-memory sink.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{StorageError, StorageResult};
use crate::sink::{EventId, EventMetadata, Station, TimeseriesPoint, TimeseriesSink};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct StoredEvent {
    pub metadata: EventMetadata,
    #[serde(default)]
    pub points: BTreeMap<NaiveDateTime, f64>,
}

/// Sink keeping everything in maps. Also the state behind the JSON catalog.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MemorySink {
    #[serde(default)]
    stations: BTreeMap<String, Station>,
    #[serde(default)]
    events: BTreeMap<EventId, StoredEvent>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_station(mut self, station: Station) -> Self {
        self.add_station(station);
        self
    }

    /// Register a station. Returns false when the name was already known.
    pub fn add_station(&mut self, station: Station) -> bool {
        if self.stations.contains_key(&station.name) {
            return false;
        }
        self.stations.insert(station.name.clone(), station);
        true
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn metadata(&self, event_id: EventId) -> Option<&EventMetadata> {
        self.events.get(&event_id).map(|e| &e.metadata)
    }

    /// Stored points of an event in time order.
    pub fn points(&self, event_id: EventId) -> Vec<TimeseriesPoint> {
        self.events
            .get(&event_id)
            .map(|e| {
                e.points
                    .iter()
                    .map(|(time, value)| TimeseriesPoint::new(*time, *value))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Events whose metadata matches `predicate`.
    pub fn find_events<F>(&self, predicate: F) -> Vec<(EventId, &EventMetadata)>
    where
        F: Fn(&EventMetadata) -> bool,
    {
        self.events
            .iter()
            .filter(|(_, e)| predicate(&e.metadata))
            .map(|(id, e)| (*id, &e.metadata))
            .collect()
    }
}

impl TimeseriesSink for MemorySink {
    fn get_station(&self, name: &str) -> StorageResult<Option<Station>> {
        Ok(self.stations.get(name).cloned())
    }

    fn get_event_id(&self, metadata: &EventMetadata) -> StorageResult<Option<EventId>> {
        Ok(self
            .events
            .iter()
            .find(|(_, e)| &e.metadata == metadata)
            .map(|(id, _)| *id))
    }

    fn create_event_id(&mut self, metadata: &EventMetadata) -> StorageResult<EventId> {
        let id = EventId::new();
        self.events.insert(
            id,
            StoredEvent {
                metadata: metadata.clone(),
                points: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    fn insert_timeseries(
        &mut self,
        event_id: EventId,
        points: &[TimeseriesPoint],
        overwrite: bool,
    ) -> StorageResult<usize> {
        let event = self
            .events
            .get_mut(&event_id)
            .ok_or(StorageError::UnknownEvent(event_id))?;

        let mut written = 0;
        for point in points {
            if overwrite || !event.points.contains_key(&point.time) {
                event.points.insert(point.time, point.value);
                written += 1;
            }
        }
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn metadata() -> EventMetadata {
        EventMetadata {
            station: "Dehiwala Canal".to_string(),
            variable: "WaterLevel".to_string(),
            unit: "m".to_string(),
            event_type: "Forecast-0-d".to_string(),
            source: "FLO2D_250".to_string(),
            name: "Cloud-1".to_string(),
        }
    }

    fn at(hour: u32, value: f64) -> TimeseriesPoint {
        let time = NaiveDate::from_ymd_opt(2017, 5, 20)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap();
        TimeseriesPoint::new(time, value)
    }

    #[test]
    fn test_event_lookup_by_metadata() {
        let mut sink = MemorySink::new();
        assert_eq!(sink.get_event_id(&metadata()).unwrap(), None);

        let id = sink.create_event_id(&metadata()).unwrap();
        assert_eq!(sink.get_event_id(&metadata()).unwrap(), Some(id));

        let mut other = metadata();
        other.event_type = "Forecast-1-d-after".to_string();
        assert_eq!(sink.get_event_id(&other).unwrap(), None);
    }

    #[test]
    fn test_insert_without_overwrite_keeps_existing() {
        let mut sink = MemorySink::new();
        let id = sink.create_event_id(&metadata()).unwrap();

        assert_eq!(sink.insert_timeseries(id, &[at(1, 1.0), at(2, 2.0)], false).unwrap(), 2);
        assert_eq!(sink.insert_timeseries(id, &[at(2, 9.0), at(3, 3.0)], false).unwrap(), 1);
        assert_eq!(sink.points(id)[1].value, 2.0);

        assert_eq!(sink.insert_timeseries(id, &[at(2, 9.0)], true).unwrap(), 1);
        assert_eq!(sink.points(id)[1].value, 9.0);
        assert_eq!(sink.points(id).len(), 3);
    }

    #[test]
    fn test_unknown_event() {
        let mut sink = MemorySink::new();
        let result = sink.insert_timeseries(EventId::new(), &[at(1, 1.0)], false);
        assert!(matches!(result, Err(StorageError::UnknownEvent(_))));
    }

    #[test]
    fn test_station_registration() {
        let mut sink = MemorySink::new().with_station(Station::new("Dehiwala Canal"));
        assert!(!sink.add_station(Station::new("Dehiwala Canal")));
        assert!(sink.get_station("Dehiwala Canal").unwrap().is_some());
        assert!(sink.get_station("Nowhere").unwrap().is_none());
    }
}
