//! Tiered data-source chain.
//!
//! Each tool call walks `open_data (0) -> local_db (1) -> static (2)` and stops
//! at the first tier that yields records. Recoverable failures (portal down,
//! store unreachable, nothing matched) are explicit, logged transitions; any
//! other store error aborts the call.

mod bus;
mod garbage;
mod tourist;
mod transportation;

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use kanazawa_store::models::{DataSource, ToolData, ToolResult};
use tracing::{debug, warn};

use crate::opendata::rows::RowError;
use crate::opendata::{Dataset, OpenDataFetcher, OpenDataRow};
use crate::store::{LocalStore, StoreError};
use crate::tools::params::ToolParams;

/// Position in the fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    OpenData,
    LocalDb,
    Static,
}

impl Tier {
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::OpenData => 0,
            Self::LocalDb => 1,
            Self::Static => 2,
        }
    }

    #[must_use]
    pub const fn source(self) -> DataSource {
        match self {
            Self::OpenData => DataSource::OpenData,
            Self::LocalDb => DataSource::LocalDb,
            Self::Static => DataSource::Static,
        }
    }

    /// Next tier to consult. The static tier is terminal.
    #[must_use]
    pub const fn next(self) -> Self {
        match self {
            Self::OpenData => Self::LocalDb,
            Self::LocalDb | Self::Static => Self::Static,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.source().as_str())
    }
}

/// Why a tier handed the request to the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallthrough {
    Disabled,
    NotConfigured,
    NoMatches,
    Unavailable(String),
}

impl fmt::Display for Fallthrough {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("tier disabled"),
            Self::NotConfigured => f.write_str("tier not configured"),
            Self::NoMatches => f.write_str("no matching records"),
            Self::Unavailable(reason) => write!(f, "unavailable: {reason}"),
        }
    }
}

/// Outcome of consulting one tier.
#[derive(Debug)]
pub enum Step {
    Served(ToolData),
    FallThrough(Fallthrough),
}

/// Non-recoverable failure inside a tier.
#[derive(Debug)]
pub enum SourceError {
    Store(StoreError),
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Store(err) => write!(f, "local store query failed: {err}"),
        }
    }
}

impl Error for SourceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
        }
    }
}

impl From<StoreError> for SourceError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

/// Produces results for validated tool parameters.
#[async_trait]
pub trait ToolBackend: Send + Sync {
    async fn run(&self, params: &ToolParams) -> Result<ToolResult, SourceError>;
}

/// Remote, local, and static tiers for every tool domain.
#[derive(Clone, Default)]
pub struct DataSourceChain {
    open_data: Option<Arc<dyn OpenDataFetcher>>,
    local: Option<Arc<dyn LocalStore>>,
}

impl DataSourceChain {
    /// Chain that only answers from the embedded fallback data.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enables the open-data tier.
    #[must_use]
    pub fn with_open_data(mut self, fetcher: Arc<dyn OpenDataFetcher>) -> Self {
        self.open_data = Some(fetcher);
        self
    }

    #[must_use]
    pub fn with_local_store(mut self, store: Arc<dyn LocalStore>) -> Self {
        self.local = Some(store);
        self
    }

    /// Walks the tiers in order and tags the result with the serving tier.
    ///
    /// # Errors
    /// Returns `SourceError` when the local store fails for a reason other than
    /// being unreachable.
    pub async fn resolve(&self, params: &ToolParams) -> Result<ToolResult, SourceError> {
        let tool = params.tool().as_str();
        let mut tier = Tier::OpenData;
        loop {
            match self.attempt(tier, params).await? {
                Step::Served(data) => {
                    debug!(tool, %tier, records = data.len(), "tier served request");
                    return Ok(ToolResult::new(data, tier.source()));
                }
                Step::FallThrough(reason) => {
                    let next = tier.next();
                    if matches!(reason, Fallthrough::Unavailable(_)) {
                        warn!(tool, from = %tier, to = %next, %reason, "falling through to next tier");
                    } else {
                        debug!(tool, from = %tier, to = %next, %reason, "falling through to next tier");
                    }
                    tier = next;
                }
            }
        }
    }

    /// Consults a single tier.
    ///
    /// # Errors
    /// Returns `SourceError` for non-recoverable local store failures.
    pub async fn attempt(&self, tier: Tier, params: &ToolParams) -> Result<Step, SourceError> {
        match tier {
            Tier::OpenData => Ok(self.try_open_data(params).await),
            Tier::LocalDb => self.try_local(params).await,
            Tier::Static => Ok(Step::Served(serve_fallback(params))),
        }
    }

    async fn try_open_data(&self, params: &ToolParams) -> Step {
        let Some(fetcher) = self.open_data.as_deref() else {
            return Step::FallThrough(Fallthrough::Disabled);
        };
        let data = match params {
            ToolParams::GarbageSchedule(input) => garbage::open_data(fetcher, input).await,
            ToolParams::TouristSpots(input) => tourist::open_data(fetcher, input).await,
            ToolParams::Transportation(input) => transportation::open_data(fetcher, input).await,
            ToolParams::BusSchedule(input) => bus::open_data(fetcher, input).await,
        };
        data.map_or(Step::FallThrough(Fallthrough::NoMatches), Step::Served)
    }

    async fn try_local(&self, params: &ToolParams) -> Result<Step, SourceError> {
        let Some(store) = self.local.as_deref() else {
            return Ok(Step::FallThrough(Fallthrough::NotConfigured));
        };
        let result = match params {
            ToolParams::GarbageSchedule(input) => garbage::local(store, input).await,
            ToolParams::TouristSpots(input) => tourist::local(store, input).await,
            ToolParams::Transportation(input) => transportation::local(store, input).await,
            ToolParams::BusSchedule(input) => bus::local(store, input).await,
        };
        match result {
            Ok(Some(data)) => Ok(Step::Served(data)),
            Ok(None) => Ok(Step::FallThrough(Fallthrough::NoMatches)),
            Err(err) if err.is_unavailable() => {
                Ok(Step::FallThrough(Fallthrough::Unavailable(err.to_string())))
            }
            Err(err) => Err(SourceError::Store(err)),
        }
    }
}

#[async_trait]
impl ToolBackend for DataSourceChain {
    async fn run(&self, params: &ToolParams) -> Result<ToolResult, SourceError> {
        self.resolve(params).await
    }
}

fn serve_fallback(params: &ToolParams) -> ToolData {
    match params {
        ToolParams::GarbageSchedule(input) => garbage::fallback(input),
        ToolParams::TouristSpots(_) => tourist::fallback(),
        ToolParams::Transportation(_) => transportation::fallback(),
        ToolParams::BusSchedule(input) => bus::fallback(input),
    }
}

/// Decodes portal rows, skipping rows that do not fit the record shape.
fn decode_rows<T>(
    dataset: Dataset,
    rows: Vec<OpenDataRow>,
    decode: fn(&OpenDataRow) -> Result<T, RowError>,
) -> Vec<T> {
    let mut skipped = 0_usize;
    let records: Vec<T> = rows
        .iter()
        .filter_map(|row| {
            decode(row)
                .map_err(|err| {
                    skipped += 1;
                    debug!(%dataset, error = %err, "skipping open data row");
                })
                .ok()
        })
        .collect();
    if skipped > 0 {
        debug!(%dataset, skipped, kept = records.len(), "decoded open data rows");
    }
    records
}

fn non_empty<T>(records: Vec<T>, build: impl FnOnce(Vec<T>) -> ToolData) -> Option<ToolData> {
    if records.is_empty() {
        None
    } else {
        Some(build(records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};

    use crate::filter::BusFilter;
    use crate::store::StoreResult;
    use crate::tools::params::{
        BusScheduleInput,
        GarbageScheduleInput,
        TouristSpotInput,
        TransportationInput,
    };

    struct CsvFetcher {
        rows: HashMap<Dataset, Vec<OpenDataRow>>,
        calls: AtomicUsize,
    }

    impl CsvFetcher {
        fn new(dataset: Dataset, csv: &str) -> Self {
            let rows = crate::opendata::parse_delimited(csv).expect("fixture csv parses");
            Self {
                rows: HashMap::from([(dataset, rows)]),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl OpenDataFetcher for CsvFetcher {
        async fn fetch(&self, dataset: Dataset) -> Vec<OpenDataRow> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.rows.get(&dataset).cloned().unwrap_or_default()
        }
    }

    /// Store whose every query fails with the configured error kind.
    struct BrokenStore {
        unreachable: bool,
    }

    impl BrokenStore {
        fn error(&self) -> StoreError {
            if self.unreachable {
                StoreError::Unavailable("connection refused".to_string())
            } else {
                StoreError::InvalidInput("limit exceeds supported range".to_string())
            }
        }
    }

    #[async_trait]
    impl LocalStore for BrokenStore {
        async fn garbage_schedules(&self, _: &str, _: &str) -> StoreResult<Vec<GarbageSchedule>> {
            Err(self.error())
        }

        async fn tourist_spots(&self, _: &str, _: usize) -> StoreResult<Vec<TouristSpot>> {
            Err(self.error())
        }

        async fn transportation_stops(&self, _: &str) -> StoreResult<Vec<TransportationStop>> {
            Err(self.error())
        }

        async fn bus_schedules(&self, _: &BusFilter) -> StoreResult<Vec<BusScheduleEntry>> {
            Err(self.error())
        }
    }

    fn tourist(keyword: &str, limit: usize) -> ToolParams {
        ToolParams::TouristSpots(TouristSpotInput {
            keyword: keyword.to_string(),
            limit,
        })
    }

    #[test]
    fn tiers_advance_in_order() {
        assert_eq!(Tier::OpenData.next(), Tier::LocalDb);
        assert_eq!(Tier::LocalDb.next(), Tier::Static);
        assert_eq!(Tier::Static.next(), Tier::Static);
        assert_eq!(Tier::LocalDb.index(), 1);
    }

    #[tokio::test]
    async fn open_data_tier_filters_case_insensitively_and_truncates() {
        let fetcher = Arc::new(CsvFetcher::new(
            Dataset::TouristSpots,
            "name,description,latitude,longitude\n\
             Kenroku-en,Garden,36.56,136.66\n\
             Castle Park,Near the GARDEN,36.56,136.65\n\
             Broken,garden,not-a-number,136.0\n\
             Station,Gate,36.57,136.64\n",
        ));
        let chain = DataSourceChain::new().with_open_data(fetcher.clone());

        let result = chain.resolve(&tourist("garden", 1)).await.unwrap();

        assert_eq!(result.data_source, DataSource::OpenData);
        let ToolData::TouristSpots(data) = result.data else {
            panic!("expected tourist payload");
        };
        assert_eq!(data.spots.len(), 1);
        assert_eq!(data.spots[0].name, "Kenroku-en");
        assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn open_data_garbage_requires_exact_area_and_date() {
        let fetcher = Arc::new(CsvFetcher::new(
            Dataset::GarbageSchedule,
            "area_code,date,garbage_type,description\n\
             01,2024-01-15,燃やすごみ,朝8時30分までに\n\
             01,2024-01-16,資源ごみ,\n\
             011,2024-01-15,埋立ごみ,\n\
             01,2024-01-15,びん,\n",
        ));
        let chain = DataSourceChain::new().with_open_data(fetcher);
        let params = ToolParams::GarbageSchedule(GarbageScheduleInput {
            area_code: "01".to_string(),
            date: "2024-01-15".to_string(),
        });

        let result = chain.resolve(&params).await.unwrap();

        assert_eq!(result.data_source, DataSource::OpenData);
        let ToolData::GarbageSchedule(data) = result.data else {
            panic!("expected garbage payload");
        };
        assert_eq!(data.area_code, "01");
        assert_eq!(data.date, "2024-01-15");
        assert_eq!(data.garbage_types, vec!["燃やすごみ", "びん"]);
    }

    #[tokio::test]
    async fn open_data_bus_rows_are_filtered_then_truncated() {
        let fetcher = Arc::new(CsvFetcher::new(
            Dataset::BusSchedule,
            "route_name,stop_name,departure_time,destination,bus_number\n\
             材木ルート,武蔵ヶ辻,14:50,材木町,Z-1\n\
             材木ルート,武蔵ヶ辻,15:05,材木町,Z-2\n\
             此花ルート,武蔵ヶ辻,15:10,此花町,K-1\n\
             材木ルート,東山,15:25,武蔵ヶ辻,Z-3\n\
             材木ルート,武蔵ヶ辻,15:45,材木町,Z-4\n\
             材木ルート,武蔵ヶ辻,16:05,材木町,Z-5\n",
        ));
        let chain = DataSourceChain::new().with_open_data(fetcher);
        let bus = |stop_name: Option<&str>, limit| {
            ToolParams::BusSchedule(BusScheduleInput {
                time_range: Some("15:30".to_string()),
                route_name: Some("材木".to_string()),
                stop_name: stop_name.map(str::to_string),
                limit,
            })
        };

        let result = chain.resolve(&bus(None, 2)).await.unwrap();
        assert_eq!(result.data_source, DataSource::OpenData);
        let ToolData::BusSchedule(data) = result.data else {
            panic!("expected bus payload");
        };
        let numbers: Vec<_> = data.departures.iter().map(|entry| entry.bus_number.as_str()).collect();
        assert_eq!(numbers, vec!["Z-2", "Z-3"]);

        let result = chain.resolve(&bus(Some("武蔵"), 10)).await.unwrap();
        let ToolData::BusSchedule(data) = result.data else {
            panic!("expected bus payload");
        };
        let numbers: Vec<_> = data.departures.iter().map(|entry| entry.bus_number.as_str()).collect();
        assert_eq!(numbers, vec!["Z-2", "Z-4"]);
    }

    #[tokio::test]
    async fn empty_open_data_falls_through_to_static() {
        let fetcher = Arc::new(CsvFetcher::new(
            Dataset::TransportationStops,
            "name,type,latitude,longitude\nA,bus_stop,36.5,136.6\n",
        ));
        let chain = DataSourceChain::new().with_open_data(fetcher);

        let params = ToolParams::Transportation(TransportationInput {
            kind: "ferry_terminal".to_string(),
            filter: None,
        });
        let step = chain.attempt(Tier::OpenData, &params).await.unwrap();
        assert!(matches!(step, Step::FallThrough(Fallthrough::NoMatches)));

        let result = chain.resolve(&params).await.unwrap();
        assert_eq!(result.data_source, DataSource::Static);
    }

    #[tokio::test]
    async fn unreachable_store_falls_through() {
        let chain = DataSourceChain::new().with_local_store(Arc::new(BrokenStore {
            unreachable: true,
        }));

        let step = chain.attempt(Tier::LocalDb, &tourist("兼六園", 5)).await.unwrap();
        assert!(matches!(step, Step::FallThrough(Fallthrough::Unavailable(_))));

        let result = chain.resolve(&tourist("兼六園", 5)).await.unwrap();
        assert_eq!(result.data_source, DataSource::Static);
    }

    #[tokio::test]
    async fn non_recoverable_store_error_propagates() {
        let chain = DataSourceChain::new().with_local_store(Arc::new(BrokenStore {
            unreachable: false,
        }));

        let err = chain
            .resolve(&tourist("兼六園", 5))
            .await
            .expect_err("invalid input should not be swallowed");
        assert!(matches!(err, SourceError::Store(StoreError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn disabled_chain_serves_static_bus_schedule_filtered() {
        let chain = DataSourceChain::new();
        let params = ToolParams::BusSchedule(BusScheduleInput {
            time_range: Some("15:00".to_string()),
            route_name: Some("此花".to_string()),
            stop_name: None,
            limit: 10,
        });

        let result = chain.resolve(&params).await.unwrap();

        assert_eq!(result.data_source, DataSource::Static);
        let ToolData::BusSchedule(data) = result.data else {
            panic!("expected bus payload");
        };
        assert_eq!(data.departures.len(), 1);
        assert_eq!(data.departures[0].departure_time, "15:10");
    }
}
