//! Open-data portal client.
//!
//! Datasets are published as UTF-8 CSV with a header row. Any transport,
//! status, or parse failure is logged and reported to callers as an empty row
//! list, which the data-source chain treats as "fall through".

pub mod rows;

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use kanazawa_store::schema::{
    DATASET_BUS_SCHEDULE,
    DATASET_GARBAGE_SCHEDULE,
    DATASET_TOURIST_SPOTS,
    DATASET_TRANSPORTATION_STOPS,
    dataset_url,
};
use tracing::{debug, warn};

pub const OPEN_DATA_TIMEOUT: Duration = Duration::from_secs(30);

/// One CSV row keyed by header name.
pub type OpenDataRow = HashMap<String, String>;

/// Datasets published on the portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    GarbageSchedule,
    TouristSpots,
    TransportationStops,
    BusSchedule,
}

impl Dataset {
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::GarbageSchedule => DATASET_GARBAGE_SCHEDULE,
            Self::TouristSpots => DATASET_TOURIST_SPOTS,
            Self::TransportationStops => DATASET_TRANSPORTATION_STOPS,
            Self::BusSchedule => DATASET_BUS_SCHEDULE,
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Upstream failure while fetching a dataset. Never leaves this module's
/// [`OpenDataFetcher`] implementation.
#[derive(Debug)]
pub enum OpenDataError {
    Transport(reqwest::Error),
    Status { url: String, status: u16 },
    Parse(csv::Error),
}

impl fmt::Display for OpenDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(err) => write!(f, "open data request failed: {err}"),
            Self::Status { url, status } => {
                write!(f, "open data request to {url} returned status {status}")
            }
            Self::Parse(err) => write!(f, "open data response is not valid CSV: {err}"),
        }
    }
}

impl Error for OpenDataError {}

impl From<reqwest::Error> for OpenDataError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err)
    }
}

impl From<csv::Error> for OpenDataError {
    fn from(err: csv::Error) -> Self {
        Self::Parse(err)
    }
}

/// Source of raw dataset rows.
#[async_trait]
pub trait OpenDataFetcher: Send + Sync {
    /// Returns every row of `dataset`, or an empty list on any failure.
    async fn fetch(&self, dataset: Dataset) -> Vec<OpenDataRow>;
}

/// HTTP client for the municipal open-data portal.
#[derive(Debug, Clone)]
pub struct OpenDataClient {
    http: reqwest::Client,
    base_url: String,
}

impl OpenDataClient {
    /// Builds a client with the fixed request timeout.
    ///
    /// # Errors
    /// Returns `OpenDataError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, OpenDataError> {
        let http = reqwest::Client::builder()
            .timeout(OPEN_DATA_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetches and parses one dataset, surfacing the failure cause.
    ///
    /// # Errors
    /// Returns `OpenDataError` on transport failure, non-2xx status, or
    /// malformed CSV.
    pub async fn fetch_dataset(&self, dataset: Dataset) -> Result<Vec<OpenDataRow>, OpenDataError> {
        let url = dataset_url(&self.base_url, dataset.path());
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(OpenDataError::Status {
                url,
                status: status.as_u16(),
            });
        }
        let body = response.text().await?;
        let rows = parse_delimited(&body)?;
        debug!(%dataset, rows = rows.len(), "fetched open data");
        Ok(rows)
    }
}

#[async_trait]
impl OpenDataFetcher for OpenDataClient {
    async fn fetch(&self, dataset: Dataset) -> Vec<OpenDataRow> {
        match self.fetch_dataset(dataset).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(%dataset, error = %err, "open data unavailable");
                Vec::new()
            }
        }
    }
}

/// Parses comma-separated text with a header row into row mappings.
///
/// # Errors
/// Returns `csv::Error` when a record cannot be read, including rows whose
/// field count differs from the header.
pub fn parse_delimited(body: &str) -> Result<Vec<OpenDataRow>, csv::Error> {
    let body = body.strip_prefix('\u{feff}').unwrap_or(body);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());
    let headers = reader.headers()?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        let row = headers
            .iter()
            .zip(record.iter())
            .map(|(header, value)| (header.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let body = "\u{feff}name,type,latitude\n金沢駅,train_station,36.5778\n\"香林坊, 南\",bus_stop,36.5610\n";
        let rows = parse_delimited(body).expect("csv should parse");

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get("name").map(String::as_str), Some("金沢駅"));
        assert_eq!(rows[1].get("name").map(String::as_str), Some("香林坊, 南"));
        assert_eq!(rows[1].get("type").map(String::as_str), Some("bus_stop"));
    }

    #[test]
    fn ragged_rows_fail_to_parse() {
        let body = "a,b\n1,2\n3\n";
        assert!(parse_delimited(body).is_err());
    }

    #[test]
    fn empty_body_yields_no_rows() {
        assert!(parse_delimited("").expect("empty body parses").is_empty());
    }
}
