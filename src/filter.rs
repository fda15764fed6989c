use crate::domain::Event;
use serde::{Deserialize, Serialize};

/// Filter selections on the listing screen
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    /// Keep only events that can be booked directly
    pub reservable_only: bool,
    /// Exact city match; `None` disables the region filter
    pub region: Option<String>,
}

impl FilterState {
    pub fn new(reservable_only: bool, region: Option<String>) -> Self {
        Self {
            reservable_only,
            region,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        if self.reservable_only && !event.is_reservable() {
            return false;
        }
        match &self.region {
            Some(region) => event.venue.city == *region,
            None => true,
        }
    }
}

/// Subset of `events` matching `state`, in aggregate order.
pub fn filter<'a>(events: &'a [Event], state: &FilterState) -> Vec<&'a Event> {
    events.iter().filter(|e| state.matches(e)).collect()
}
