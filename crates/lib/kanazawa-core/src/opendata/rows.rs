//! Decoding of portal rows into domain records.
//!
//! Values arrive as strings; coordinates are parsed here. Rows that cannot be
//! decoded are skipped by the caller.

use std::error::Error;
use std::fmt;

use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};

use super::OpenDataRow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowError {
    MissingField(&'static str),
    InvalidNumber { field: &'static str, value: String },
}

impl fmt::Display for RowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "missing field: {field}"),
            Self::InvalidNumber { field, value } => {
                write!(f, "invalid number in {field}: {value}")
            }
        }
    }
}

impl Error for RowError {}

/// Decodes a garbage collection row.
///
/// # Errors
/// Returns `RowError` when a required column is missing or blank.
pub fn garbage_schedule(row: &OpenDataRow) -> Result<GarbageSchedule, RowError> {
    Ok(GarbageSchedule {
        area_code: required(row, "area_code")?,
        date: required(row, "date")?,
        garbage_type: required(row, "garbage_type")?,
        description: optional(row, "description"),
    })
}

/// Decodes a tourist spot row.
///
/// # Errors
/// Returns `RowError` when a required column is missing or a coordinate does
/// not parse.
pub fn tourist_spot(row: &OpenDataRow) -> Result<TouristSpot, RowError> {
    Ok(TouristSpot {
        name: required(row, "name")?,
        description: optional(row, "description").unwrap_or_default(),
        latitude: coordinate(row, "latitude")?,
        longitude: coordinate(row, "longitude")?,
        category: optional(row, "category"),
        address: optional(row, "address"),
        opening_hours: optional(row, "opening_hours"),
        contact: optional(row, "contact"),
    })
}

/// Decodes a station or bus stop row.
///
/// # Errors
/// Returns `RowError` when a required column is missing or a coordinate does
/// not parse.
pub fn transportation_stop(row: &OpenDataRow) -> Result<TransportationStop, RowError> {
    Ok(TransportationStop {
        name: required(row, "name")?,
        kind: required(row, "type")?,
        latitude: coordinate(row, "latitude")?,
        longitude: coordinate(row, "longitude")?,
        address: optional(row, "address"),
        routes: optional(row, "routes").map(|value| split_routes(&value)),
    })
}

/// Decodes a timetable row.
///
/// # Errors
/// Returns `RowError` when a required column is missing or blank.
pub fn bus_schedule_entry(row: &OpenDataRow) -> Result<BusScheduleEntry, RowError> {
    Ok(BusScheduleEntry {
        route_name: required(row, "route_name")?,
        stop_name: required(row, "stop_name")?,
        departure_time: required(row, "departure_time")?,
        destination: optional(row, "destination").unwrap_or_default(),
        bus_number: optional(row, "bus_number").unwrap_or_default(),
    })
}

fn required(row: &OpenDataRow, field: &'static str) -> Result<String, RowError> {
    optional(row, field).ok_or(RowError::MissingField(field))
}

fn optional(row: &OpenDataRow, field: &str) -> Option<String> {
    row.get(field)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Finite decimal degrees only; `NaN` and `inf` have no JSON form.
fn coordinate(row: &OpenDataRow, field: &'static str) -> Result<f64, RowError> {
    let value = required(row, field)?;
    match value.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() => Ok(parsed),
        _ => Err(RowError::InvalidNumber { field, value }),
    }
}

/// Routes are published either as a JSON array or as a `;`-separated list.
fn split_routes(value: &str) -> Vec<String> {
    if value.starts_with('[')
        && let Ok(routes) = serde_json::from_str::<Vec<String>>(value)
    {
        return routes;
    }
    value
        .split(';')
        .map(str::trim)
        .filter(|route| !route.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> OpenDataRow {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
            .collect()
    }

    #[test]
    fn stop_row_parses_coordinates_and_json_routes() {
        let stop = transportation_stop(&row(&[
            ("name", "金沢駅"),
            ("type", "train_station"),
            ("latitude", "36.5778"),
            ("longitude", "136.6483"),
            ("routes", r#"["北陸新幹線","JR北陸本線"]"#),
        ]))
        .expect("row should decode");

        assert!((stop.latitude - 36.5778).abs() < f64::EPSILON);
        assert_eq!(
            stop.routes,
            Some(vec!["北陸新幹線".to_string(), "JR北陸本線".to_string()])
        );
        assert_eq!(stop.address, None);
    }

    #[test]
    fn semicolon_routes_are_split() {
        assert_eq!(split_routes("A; B;"), vec!["A".to_string(), "B".to_string()]);
    }

    #[test]
    fn bad_coordinate_is_rejected() {
        let err = tourist_spot(&row(&[
            ("name", "兼六園"),
            ("latitude", "north"),
            ("longitude", "136.6"),
        ]))
        .expect_err("latitude should not parse");
        assert_eq!(
            err,
            RowError::InvalidNumber {
                field: "latitude",
                value: "north".to_string()
            }
        );
    }

    #[test]
    fn non_finite_coordinates_are_rejected() {
        for raw in ["NaN", "inf", "-infinity"] {
            let err = transportation_stop(&row(&[
                ("name", "金沢駅"),
                ("type", "train_station"),
                ("latitude", "36.5778"),
                ("longitude", raw),
            ]))
            .expect_err("non-finite longitude");
            assert_eq!(
                err,
                RowError::InvalidNumber {
                    field: "longitude",
                    value: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn blank_required_field_is_missing() {
        let err = garbage_schedule(&row(&[
            ("area_code", " "),
            ("date", "2024-01-15"),
            ("garbage_type", "燃やすごみ"),
        ]))
        .expect_err("blank area code");
        assert_eq!(err, RowError::MissingField("area_code"));
    }
}
