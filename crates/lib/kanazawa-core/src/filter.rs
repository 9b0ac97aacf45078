//! Record predicates shared by the open-data and fallback tiers.
//!
//! The local store expresses the same predicates as query conditions; see
//! `store::surreal`.

use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};

/// Exact area and day match.
#[must_use]
pub fn garbage_matches(area_code: &str, date: &str, schedule: &GarbageSchedule) -> bool {
    schedule.area_code == area_code && schedule.date == date
}

/// Case-insensitive substring match on name or description.
///
/// `keyword` must already be lowercased.
#[must_use]
pub fn tourist_matches(keyword: &str, spot: &TouristSpot) -> bool {
    spot.name.to_lowercase().contains(keyword)
        || spot.description.to_lowercase().contains(keyword)
}

/// Exact stop kind match.
#[must_use]
pub fn stop_matches(kind: &str, stop: &TransportationStop) -> bool {
    stop.kind == kind
}

/// Bus timetable filter. Unset criteria match everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusFilter {
    pub hour: Option<u32>,
    pub route_name: Option<String>,
    pub stop_name: Option<String>,
    pub limit: usize,
}

impl BusFilter {
    #[must_use]
    pub fn matches(&self, entry: &BusScheduleEntry) -> bool {
        if let Some(hour) = self.hour
            && entry.departure_hour() != Some(hour)
        {
            return false;
        }
        if let Some(route_name) = self.route_name.as_deref()
            && !entry.route_name.contains(route_name)
        {
            return false;
        }
        if let Some(stop_name) = self.stop_name.as_deref()
            && !entry.stop_name.contains(stop_name)
        {
            return false;
        }
        true
    }

    /// Keeps matching entries in their original order, truncated at `limit`.
    #[must_use]
    pub fn apply(&self, entries: Vec<BusScheduleEntry>) -> Vec<BusScheduleEntry> {
        entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .take(self.limit)
            .collect()
    }

    /// `HH:` prefix used by store queries for the hour criterion.
    #[must_use]
    pub fn hour_prefix(&self) -> Option<String> {
        self.hour.map(|hour| format!("{hour:02}:"))
    }
}
