//! Map marker grouping.
//!
//! Events are grouped by exact coordinate equality, not by distance. All events
//! without coordinates share the `(0, 0)` marker.

use crate::constants::{
    MAP_CENTER_LATITUDE, MAP_CENTER_LONGITUDE, MAP_LATITUDE_DELTA, MAP_LONGITUDE_DELTA,
};
use crate::domain::{Coordinates, Event};
use serde::Serialize;
use std::collections::HashMap;

/// One map marker: every event at one exact coordinate pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventGroup {
    pub coordinates: Coordinates,
    pub events: Vec<Event>,
}

impl EventGroup {
    /// Marker title: the city of the first event
    pub fn title(&self) -> &str {
        self.events
            .first()
            .map(|e| e.venue.city.as_str())
            .unwrap_or_default()
    }

    /// Popover shows a single full-width card instead of a grid
    pub fn is_single(&self) -> bool {
        self.events.len() == 1
    }

    /// Marker collecting events that had no coordinates upstream
    pub fn is_sentinel(&self) -> bool {
        self.coordinates.is_sentinel()
    }
}

/// Initial visible region of the map
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MapViewport {
    pub center: Coordinates,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Default for MapViewport {
    fn default() -> Self {
        Self {
            center: Coordinates {
                latitude: MAP_CENTER_LATITUDE,
                longitude: MAP_CENTER_LONGITUDE,
            },
            latitude_delta: MAP_LATITUDE_DELTA,
            longitude_delta: MAP_LONGITUDE_DELTA,
        }
    }
}

impl MapViewport {
    pub fn contains(&self, point: &Coordinates) -> bool {
        (point.latitude - self.center.latitude).abs() <= self.latitude_delta / 2.0
            && (point.longitude - self.center.longitude).abs() <= self.longitude_delta / 2.0
    }
}

/// Partition `events` by coordinate pair. Groups appear in first-seen order
/// and keep the input order inside each group.
pub fn group(events: &[Event]) -> Vec<EventGroup> {
    let mut index: HashMap<(u64, u64), usize> = HashMap::new();
    let mut groups: Vec<EventGroup> = Vec::new();
    for event in events {
        let coordinates = event.coordinates();
        let slot = *index.entry(coordinates.key()).or_insert_with(|| {
            groups.push(EventGroup {
                coordinates,
                events: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].events.push(event.clone());
    }
    groups
}
