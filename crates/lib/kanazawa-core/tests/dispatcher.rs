use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use kanazawa_core::cache::{CacheResult, CacheStore, ManualClock, MemoryCacheStore};
use kanazawa_core::filter::BusFilter;
use kanazawa_core::opendata::{Dataset, OpenDataFetcher, OpenDataRow};
use kanazawa_core::sources::{DataSourceChain, SourceError, ToolBackend};
use kanazawa_core::store::{LocalStore, StoreError, StoreResult};
use kanazawa_core::tools::{DEFAULT_CACHE_TTL, ToolDispatcher, ToolError, ToolParams, ToolRegistry};
use kanazawa_store::models::{
    BusScheduleEntry,
    DataSource,
    GarbageSchedule,
    ToolData,
    ToolResult,
    TouristSpot,
    TransportationStop,
};
use serde_json::{Map, Value, json};

/// Backend that counts invocations before delegating to a chain.
struct CountingBackend {
    chain: DataSourceChain,
    runs: AtomicUsize,
}

impl CountingBackend {
    fn new(chain: DataSourceChain) -> Arc<Self> {
        Arc::new(Self {
            chain,
            runs: AtomicUsize::new(0),
        })
    }

    fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ToolBackend for CountingBackend {
    async fn run(&self, params: &ToolParams) -> Result<ToolResult, SourceError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        self.chain.resolve(params).await
    }
}

/// Backend whose every call fails with a non-recoverable error.
struct FailingBackend {
    runs: AtomicUsize,
}

#[async_trait]
impl ToolBackend for FailingBackend {
    async fn run(&self, _: &ToolParams) -> Result<ToolResult, SourceError> {
        self.runs.fetch_add(1, Ordering::SeqCst);
        Err(SourceError::Store(StoreError::InvalidInput(
            "filter produced an impossible query".to_string(),
        )))
    }
}

/// Cache that counts reads and writes.
struct CountingCache {
    inner: MemoryCacheStore,
    gets: AtomicUsize,
    sets: AtomicUsize,
}

impl CountingCache {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryCacheStore::new(),
            gets: AtomicUsize::new(0),
            sets: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl CacheStore for CountingCache {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> CacheResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, ttl).await
    }
}

/// Portal that is always down.
struct DownFetcher {
    calls: AtomicUsize,
}

#[async_trait]
impl OpenDataFetcher for DownFetcher {
    async fn fetch(&self, _: Dataset) -> Vec<OpenDataRow> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Vec::new()
    }
}

/// Portal that always publishes the same rows.
struct FixedFetcher {
    rows: Vec<OpenDataRow>,
}

#[async_trait]
impl OpenDataFetcher for FixedFetcher {
    async fn fetch(&self, _: Dataset) -> Vec<OpenDataRow> {
        self.rows.clone()
    }
}

fn row(pairs: &[(&str, &str)]) -> OpenDataRow {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

/// Reachable store with no rows.
struct EmptyStore;

#[async_trait]
impl LocalStore for EmptyStore {
    async fn garbage_schedules(&self, _: &str, _: &str) -> StoreResult<Vec<GarbageSchedule>> {
        Ok(Vec::new())
    }

    async fn tourist_spots(&self, _: &str, _: usize) -> StoreResult<Vec<TouristSpot>> {
        Ok(Vec::new())
    }

    async fn transportation_stops(&self, _: &str) -> StoreResult<Vec<TransportationStop>> {
        Ok(Vec::new())
    }

    async fn bus_schedules(&self, _: &BusFilter) -> StoreResult<Vec<BusScheduleEntry>> {
        Ok(Vec::new())
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {other}"),
    }
}

fn dispatcher(cache: Arc<dyn CacheStore>, backend: Arc<dyn ToolBackend>) -> ToolDispatcher {
    ToolDispatcher::new(Arc::new(ToolRegistry::new()), cache, backend)
}

#[tokio::test]
async fn repeated_call_is_served_from_cache() {
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(Arc::new(MemoryCacheStore::new()), backend.clone());
    let request = params(json!({"keyword": "兼六園", "limit": 5}));

    let first = dispatcher
        .execute("search_tourist_spots", &request)
        .await
        .expect("first call");
    let second = dispatcher
        .execute("search_tourist_spots", &request)
        .await
        .expect("second call");

    assert_eq!(backend.runs(), 1);
    assert_eq!(
        first.to_json().expect("serialize"),
        second.to_json().expect("serialize")
    );
}

#[tokio::test]
async fn key_order_does_not_defeat_the_cache() {
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(Arc::new(MemoryCacheStore::new()), backend.clone());

    let mut first = Map::new();
    first.insert("area_code".to_string(), json!("01"));
    first.insert("date".to_string(), json!("2024-01-15"));
    let mut second = Map::new();
    second.insert("date".to_string(), json!("2024-01-15"));
    second.insert("area_code".to_string(), json!("01"));

    dispatcher.execute("get_garbage_schedule", &first).await.expect("first");
    dispatcher.execute("get_garbage_schedule", &second).await.expect("second");

    assert_eq!(backend.runs(), 1);
}

#[tokio::test]
async fn failing_tiers_fall_back_to_static_stops() {
    let fetcher = Arc::new(DownFetcher {
        calls: AtomicUsize::new(0),
    });
    let chain = DataSourceChain::new()
        .with_open_data(fetcher.clone())
        .with_local_store(Arc::new(EmptyStore));
    let dispatcher = dispatcher(Arc::new(MemoryCacheStore::new()), Arc::new(chain));

    let result = dispatcher
        .execute("get_transportation_info", &params(json!({"type": "train_station"})))
        .await
        .expect("static tier answers");

    assert_eq!(fetcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(result.data_source, DataSource::Static);
    let ToolData::Transportation(data) = result.data else {
        panic!("expected transportation payload");
    };
    assert!(data.stops.iter().any(|stop| stop.name == "金沢駅"));
}

#[tokio::test]
async fn invalid_parameters_touch_neither_cache_nor_backend() {
    let cache = CountingCache::new();
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(cache.clone(), backend.clone());

    let err = dispatcher
        .execute("get_garbage_schedule", &params(json!({"area_code": "A1"})))
        .await
        .expect_err("date is required");

    assert!(matches!(err, ToolError::InvalidParameter { .. }));
    assert!(err.is_client_error());
    assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
    assert_eq!(backend.runs(), 0);
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let cache = CountingCache::new();
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(cache.clone(), backend.clone());

    let err = dispatcher
        .execute("delete_everything", &Map::new())
        .await
        .expect_err("not registered");

    assert!(matches!(err, ToolError::UnknownTool(ref name) if name == "delete_everything"));
    assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
    assert_eq!(backend.runs(), 0);
}

#[tokio::test]
async fn bus_schedule_filters_static_timetable_in_order() {
    let dispatcher = dispatcher(
        Arc::new(MemoryCacheStore::new()),
        Arc::new(DataSourceChain::new()),
    );

    let result = dispatcher
        .execute(
            "get_bus_schedule",
            &params(json!({"time_range": "15:00", "route_name": "材木", "limit": 10})),
        )
        .await
        .expect("static timetable");

    assert_eq!(result.data_source, DataSource::Static);
    let ToolData::BusSchedule(data) = result.data else {
        panic!("expected bus payload");
    };
    let times: Vec<_> = data
        .departures
        .iter()
        .map(|entry| entry.departure_time.as_str())
        .collect();
    assert_eq!(times, vec!["15:00", "15:20", "15:40"]);
    assert!(data.departures.iter().all(|entry| entry.route_name.contains("材木")));
}

#[tokio::test]
async fn bus_schedule_limit_truncates_after_filtering() {
    let dispatcher = dispatcher(
        Arc::new(MemoryCacheStore::new()),
        Arc::new(DataSourceChain::new()),
    );

    let result = dispatcher
        .execute(
            "get_bus_schedule",
            &params(json!({"time_range": "15:00", "route_name": "材木", "limit": "2"})),
        )
        .await
        .expect("static timetable");

    let ToolData::BusSchedule(data) = result.data else {
        panic!("expected bus payload");
    };
    let times: Vec<_> = data
        .departures
        .iter()
        .map(|entry| entry.departure_time.as_str())
        .collect();
    assert_eq!(times, vec!["15:00", "15:20"]);
}

#[tokio::test]
async fn cached_result_expires_after_ttl() {
    let clock = Arc::new(ManualClock::new(0));
    let cache = Arc::new(MemoryCacheStore::with_clock(clock.clone()));
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(cache, backend.clone());
    let request = params(json!({"type": "bus_stop"}));

    assert_eq!(dispatcher.ttl(), DEFAULT_CACHE_TTL);

    dispatcher
        .execute("get_transportation_info", &request)
        .await
        .expect("first call");
    clock.advance(DEFAULT_CACHE_TTL - Duration::from_secs(1));
    dispatcher
        .execute("get_transportation_info", &request)
        .await
        .expect("within ttl");
    assert_eq!(backend.runs(), 1);

    clock.advance(Duration::from_secs(1));
    dispatcher
        .execute("get_transportation_info", &request)
        .await
        .expect("after ttl");
    assert_eq!(backend.runs(), 2);
}

#[tokio::test]
async fn execution_errors_propagate_and_are_not_cached() {
    let cache = CountingCache::new();
    let backend = Arc::new(FailingBackend {
        runs: AtomicUsize::new(0),
    });
    let dispatcher = dispatcher(cache.clone(), backend.clone());
    let request = params(json!({"keyword": "兼六園"}));

    for _ in 0..2 {
        let err = dispatcher
            .execute("search_tourist_spots", &request)
            .await
            .expect_err("backend fails");
        assert!(matches!(
            err,
            ToolError::Execution {
                tool: "search_tourist_spots",
                ..
            }
        ));
        assert!(!err.is_client_error());
    }

    assert_eq!(backend.runs.load(Ordering::SeqCst), 2);
    assert_eq!(cache.sets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn undecodable_cache_entry_is_treated_as_miss() {
    let cache = Arc::new(MemoryCacheStore::new());
    let backend = CountingBackend::new(DataSourceChain::new());
    let dispatcher = dispatcher(cache.clone(), backend.clone());
    let request = params(json!({"type": "bus_stop"}));

    cache
        .set(
            &kanazawa_core::tools::cache_key("get_transportation_info", &request),
            "not json".to_string(),
            DEFAULT_CACHE_TTL,
        )
        .await
        .expect("seed cache");

    let result = dispatcher
        .execute("get_transportation_info", &request)
        .await
        .expect("backend answers");
    assert_eq!(result.data_source, DataSource::Static);
    assert_eq!(backend.runs(), 1);
}

#[tokio::test]
async fn limit_beyond_store_range_is_a_client_error() {
    let cache = CountingCache::new();
    let backend = CountingBackend::new(DataSourceChain::new().with_local_store(Arc::new(EmptyStore)));
    let dispatcher = dispatcher(cache.clone(), backend.clone());

    let err = dispatcher
        .execute(
            "search_tourist_spots",
            &params(json!({"keyword": "x", "limit": 9_223_372_036_854_775_808_u64})),
        )
        .await
        .expect_err("limit out of range");

    assert!(matches!(err, ToolError::InvalidParameter { .. }));
    assert!(err.is_client_error());
    assert_eq!(backend.runs(), 0);
    assert_eq!(cache.gets.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_finite_portal_coordinates_are_skipped_and_result_stays_cacheable() {
    let fetcher = Arc::new(FixedFetcher {
        rows: vec![
            row(&[("name", "兼六園 (NaN)"), ("latitude", "NaN"), ("longitude", "136.66")]),
            row(&[("name", "兼六園"), ("latitude", "36.5621"), ("longitude", "136.6625")]),
        ],
    });
    let backend = CountingBackend::new(DataSourceChain::new().with_open_data(fetcher));
    let dispatcher = dispatcher(Arc::new(MemoryCacheStore::new()), backend.clone());
    let request = params(json!({"keyword": "兼六園"}));

    let first = dispatcher
        .execute("search_tourist_spots", &request)
        .await
        .expect("first call");
    dispatcher
        .execute("search_tourist_spots", &request)
        .await
        .expect("second call");

    assert_eq!(backend.runs(), 1);
    assert_eq!(first.data_source, DataSource::OpenData);
    assert!(!first.to_json().expect("serialize").contains("null"));
    let ToolData::TouristSpots(data) = first.data else {
        panic!("expected tourist payload");
    };
    let names: Vec<_> = data.spots.iter().map(|spot| spot.name.as_str()).collect();
    assert_eq!(names, vec!["兼六園"]);
}
