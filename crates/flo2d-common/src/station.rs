//! Station lookup for channel and flood-plain elements.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which model output a station is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    /// Channel element, read from the hydrograph report.
    Channel,
    /// Flood-plain grid element, read from the time-stepped depth file.
    FloodPlain,
}

/// Cell id to human readable station name, split by output kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StationMap {
    #[serde(default)]
    pub channel: BTreeMap<String, String>,
    #[serde(default)]
    pub flood_plain: BTreeMap<String, String>,
}

impl StationMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.channel.insert(id.into(), name.into());
        self
    }

    pub fn with_flood_plain(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.flood_plain.insert(id.into(), name.into());
        self
    }

    /// Stations of one kind.
    pub fn stations(&self, kind: StationKind) -> &BTreeMap<String, String> {
        match kind {
            StationKind::Channel => &self.channel,
            StationKind::FloodPlain => &self.flood_plain,
        }
    }

    /// Element ids of one kind, in id order.
    pub fn ids(&self, kind: StationKind) -> Vec<String> {
        self.stations(kind).keys().cloned().collect()
    }

    pub fn name(&self, kind: StationKind, id: &str) -> Option<&str> {
        self.stations(kind).get(id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.channel.len() + self.flood_plain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty() && self.flood_plain.is_empty()
    }
}

/// Station name as used inside output file names.
pub fn file_safe_name(name: &str) -> String {
    name.replace(' ', "_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_kind() {
        let map = StationMap::new()
            .with_channel("179", "Wellawatta Canal-St Peters College")
            .with_channel("220", "Dehiwala Canal")
            .with_flood_plain("2669", "Parlimant Lake Side");

        assert_eq!(map.len(), 3);
        assert_eq!(map.ids(StationKind::Channel), vec!["179", "220"]);
        assert_eq!(map.name(StationKind::FloodPlain, "2669"), Some("Parlimant Lake Side"));
        assert_eq!(map.name(StationKind::Channel, "2669"), None);
    }

    #[test]
    fn test_deserialize_partial() {
        let map: StationMap = serde_json::from_str(r#"{"channel": {"618": "Nagalagam Street River"}}"#).unwrap();
        assert!(map.flood_plain.is_empty());
        assert_eq!(map.name(StationKind::Channel, "618"), Some("Nagalagam Street River"));
    }

    #[test]
    fn test_file_safe_name() {
        assert_eq!(file_safe_name("Parlimant Lake Side"), "Parlimant_Lake_Side");
    }
}
