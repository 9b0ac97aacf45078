use serde::{Deserialize, Serialize};

/// Garbage collection entry for an area on a given day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GarbageSchedule {
    pub area_code: String,
    /// Collection day, `YYYY-MM-DD`.
    pub date: String,
    pub garbage_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Sightseeing spot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouristSpot {
    pub name: String,
    pub description: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

/// Station or bus stop.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportationStop {
    pub name: String,
    /// Stop kind such as `bus_stop` or `train_station`.
    #[serde(rename = "type")]
    pub kind: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<String>>,
}

/// Single departure in a bus timetable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusScheduleEntry {
    pub route_name: String,
    pub stop_name: String,
    /// Departure time, `HH:MM`.
    pub departure_time: String,
    pub destination: String,
    pub bus_number: String,
}

impl BusScheduleEntry {
    /// Hour component of `departure_time`, if it parses.
    #[must_use]
    pub fn departure_hour(&self) -> Option<u32> {
        let (hour, _) = self.departure_time.split_once(':')?;
        hour.trim().parse().ok()
    }
}

/// Latitude/longitude pair as rendered in tool payloads.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// Tourist spot as returned by `search_tourist_spots`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouristSpotSummary {
    pub name: String,
    pub description: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
}

impl From<TouristSpot> for TouristSpotSummary {
    fn from(spot: TouristSpot) -> Self {
        Self {
            name: spot.name,
            description: spot.description,
            location: GeoPoint {
                lat: spot.latitude,
                lng: spot.longitude,
            },
            category: spot.category,
            address: spot.address,
            opening_hours: spot.opening_hours,
            contact: spot.contact,
        }
    }
}

/// Stop as returned by `get_transportation_info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StopSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub location: GeoPoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub routes: Option<Vec<String>>,
}

impl From<TransportationStop> for StopSummary {
    fn from(stop: TransportationStop) -> Self {
        Self {
            name: stop.name,
            kind: stop.kind,
            location: GeoPoint {
                lat: stop.latitude,
                lng: stop.longitude,
            },
            address: stop.address,
            routes: stop.routes,
        }
    }
}

/// Payload of `get_garbage_schedule`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GarbageScheduleData {
    pub area_code: String,
    pub date: String,
    pub garbage_types: Vec<String>,
    pub schedules: Vec<GarbageSchedule>,
}

impl GarbageScheduleData {
    #[must_use]
    pub fn new(area_code: &str, date: &str, schedules: Vec<GarbageSchedule>) -> Self {
        let garbage_types = schedules
            .iter()
            .map(|schedule| schedule.garbage_type.clone())
            .collect();
        Self {
            area_code: area_code.to_string(),
            date: date.to_string(),
            garbage_types,
            schedules,
        }
    }
}

/// Payload of `search_tourist_spots`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TouristSpotsData {
    pub spots: Vec<TouristSpotSummary>,
}

/// Payload of `get_transportation_info`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportationData {
    pub stops: Vec<StopSummary>,
}

/// Payload of `get_bus_schedule`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusScheduleData {
    pub departures: Vec<BusScheduleEntry>,
}

/// Domain payload carried by a [`ToolResult`].
///
/// Variants are distinguished by their required fields, so the envelope
/// decodes without an explicit discriminator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ToolData {
    GarbageSchedule(GarbageScheduleData),
    TouristSpots(TouristSpotsData),
    Transportation(TransportationData),
    BusSchedule(BusScheduleData),
}

impl ToolData {
    /// Number of records carried by the payload.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::GarbageSchedule(data) => data.schedules.len(),
            Self::TouristSpots(data) => data.spots.len(),
            Self::Transportation(data) => data.stops.len(),
            Self::BusSchedule(data) => data.departures.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Tier that produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    OpenData,
    LocalDb,
    Static,
}

impl DataSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenData => "open_data",
            Self::LocalDb => "local_db",
            Self::Static => "static",
        }
    }
}

/// Envelope returned by every successful tool call and stored in the cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub data: ToolData,
    pub data_source: DataSource,
}

impl ToolResult {
    #[must_use]
    pub const fn new(data: ToolData, data_source: DataSource) -> Self {
        Self { data, data_source }
    }

    /// Serializes the envelope for the cache.
    ///
    /// # Errors
    /// Returns the serializer error if the payload cannot be rendered.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Decodes an envelope previously written by [`ToolResult::to_json`].
    ///
    /// # Errors
    /// Returns the deserializer error if the value is not a valid envelope.
    pub fn from_json(value: &str) -> serde_json::Result<Self> {
        serde_json::from_str(value)
    }
}
