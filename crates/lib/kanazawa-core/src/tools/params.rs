//! Typed parameter records, one per tool.
//!
//! Parameters arrive as loose JSON objects. [`ToolParams::decode`] picks the
//! record for the tool, applies defaults, and validates formats before any
//! cache or data-source access happens.

use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveTime, Timelike};
use schemars::JsonSchema;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ToolError, ToolName};
use crate::filter::BusFilter;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";

/// Largest `limit` a store query can carry.
pub const MAX_LIMIT: u64 = i64::MAX.unsigned_abs();

/// Parameters for `get_garbage_schedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct GarbageScheduleInput {
    /// Collection area code.
    pub area_code: String,
    /// Collection day, `YYYY-MM-DD`.
    pub date: String,
}

/// Parameters for `search_tourist_spots`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TouristSpotInput {
    /// Matched against spot names and descriptions, ignoring case.
    pub keyword: String,
    #[serde(default = "default_tourist_limit", deserialize_with = "lenient_limit")]
    #[schemars(range(min = 1))]
    pub limit: usize,
}

/// Parameters for `get_transportation_info`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TransportationInput {
    /// Stop kind, e.g. `bus_stop` or `train_station`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Accepted for compatibility; not applied to results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<BTreeMap<String, Value>>,
}

/// Parameters for `get_bus_schedule`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BusScheduleInput {
    /// Departure hour to match, `HH:MM`; only the hour is compared.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<String>,
    /// Substring of the route name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_name: Option<String>,
    /// Substring of the stop name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_name: Option<String>,
    #[serde(default = "default_bus_limit", deserialize_with = "lenient_limit")]
    #[schemars(range(min = 1))]
    pub limit: usize,
}

impl BusScheduleInput {
    /// Timetable filter for these parameters. Blank criteria are ignored.
    #[must_use]
    pub fn filter(&self) -> BusFilter {
        BusFilter {
            hour: self
                .time_range
                .as_deref()
                .and_then(|value| NaiveTime::parse_from_str(value.trim(), TIME_FORMAT).ok())
                .map(|time| time.hour()),
            route_name: non_blank(self.route_name.as_deref()),
            stop_name: non_blank(self.stop_name.as_deref()),
            limit: self.limit,
        }
    }
}

/// Decoded parameters tagged by tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolParams {
    GarbageSchedule(GarbageScheduleInput),
    TouristSpots(TouristSpotInput),
    Transportation(TransportationInput),
    BusSchedule(BusScheduleInput),
}

impl ToolParams {
    /// Decodes and validates raw parameters for `tool`.
    ///
    /// # Errors
    /// Returns `ToolError::InvalidParameter` when a required field is missing,
    /// a value has the wrong type, or a date/time does not parse.
    pub fn decode(tool: ToolName, params: &Map<String, Value>) -> Result<Self, ToolError> {
        let value = Value::Object(params.clone());
        let mut decoded = match tool {
            ToolName::GarbageSchedule => Self::GarbageSchedule(parse(tool, value)?),
            ToolName::TouristSpots => Self::TouristSpots(parse(tool, value)?),
            ToolName::Transportation => Self::Transportation(parse(tool, value)?),
            ToolName::BusSchedule => Self::BusSchedule(parse(tool, value)?),
        };
        decoded
            .normalize()
            .map_err(|message| ToolError::InvalidParameter {
                tool: tool.as_str(),
                message,
            })?;
        Ok(decoded)
    }

    #[must_use]
    pub const fn tool(&self) -> ToolName {
        match self {
            Self::GarbageSchedule(_) => ToolName::GarbageSchedule,
            Self::TouristSpots(_) => ToolName::TouristSpots,
            Self::Transportation(_) => ToolName::Transportation,
            Self::BusSchedule(_) => ToolName::BusSchedule,
        }
    }

    /// Validates formats and rewrites the date into its canonical form so
    /// filters compare like with like.
    fn normalize(&mut self) -> Result<(), String> {
        match self {
            Self::GarbageSchedule(input) => {
                let date = NaiveDate::parse_from_str(input.date.trim(), DATE_FORMAT)
                    .map_err(|err| format!("date must be YYYY-MM-DD, got {:?}: {err}", input.date))?;
                input.date = date.format(DATE_FORMAT).to_string();
            }
            Self::BusSchedule(input) => {
                if let Some(time_range) = non_blank(input.time_range.as_deref()) {
                    NaiveTime::parse_from_str(&time_range, TIME_FORMAT).map_err(|err| {
                        format!("time_range must be HH:MM, got {time_range:?}: {err}")
                    })?;
                }
            }
            Self::TouristSpots(_) | Self::Transportation(_) => {}
        }
        Ok(())
    }
}

fn parse<T: DeserializeOwned>(tool: ToolName, value: Value) -> Result<T, ToolError> {
    serde_json::from_value(value).map_err(|err| ToolError::InvalidParameter {
        tool: tool.as_str(),
        message: err.to_string(),
    })
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

const fn default_tourist_limit() -> usize {
    5
}

const fn default_bus_limit() -> usize {
    10
}

/// Accepts a positive integer or a string holding one.
fn lenient_limit<'de, D>(deserializer: D) -> Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLimit {
        Number(u64),
        Text(String),
    }

    let limit = match RawLimit::deserialize(deserializer)
        .map_err(|_| de::Error::custom("limit must be a positive integer"))?
    {
        RawLimit::Number(value) => value,
        RawLimit::Text(text) => text
            .trim()
            .parse::<u64>()
            .map_err(|_| de::Error::custom(format!("limit must be a positive integer, got {text:?}")))?,
    };
    if limit == 0 {
        return Err(de::Error::custom("limit must be at least 1"));
    }
    if limit > MAX_LIMIT {
        return Err(de::Error::custom(format!("limit must not exceed {MAX_LIMIT}")));
    }
    usize::try_from(limit).map_err(de::Error::custom)
}
