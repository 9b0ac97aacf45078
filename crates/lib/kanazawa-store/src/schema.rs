pub const TABLE_GARBAGE_SCHEDULE: &str = "garbage_schedule";
pub const TABLE_TOURIST_SPOT: &str = "tourist_spot";
pub const TABLE_TRANSPORTATION_STOP: &str = "transportation_stop";
pub const TABLE_BUS_SCHEDULE: &str = "bus_schedule";
pub const TABLE_TOOL_CACHE: &str = "tool_cache";

pub const DATASET_GARBAGE_SCHEDULE: &str = "dataset/gomi-schedule/resource/garbage-schedule.csv";
pub const DATASET_TOURIST_SPOTS: &str = "dataset/tourist-spots/resource/spots.csv";
pub const DATASET_TRANSPORTATION_STOPS: &str = "dataset/bus-info/resource/bus-stops.csv";
pub const DATASET_BUS_SCHEDULE: &str = "dataset/bus-info/resource/bus-timetable.csv";

pub const DEFAULT_OPEN_DATA_BASE_URL: &str = "https://catalog-data.city.kanazawa.ishikawa.jp";

pub const CACHE_KEY_PREFIX: &str = "mcp";

pub const TOOL_GARBAGE_SCHEDULE: &str = "get_garbage_schedule";
pub const TOOL_TOURIST_SPOTS: &str = "search_tourist_spots";
pub const TOOL_TRANSPORTATION: &str = "get_transportation_info";
pub const TOOL_BUS_SCHEDULE: &str = "get_bus_schedule";

/// Joins a portal base URL and a dataset path without doubling slashes.
#[must_use]
pub fn dataset_url(base_url: &str, dataset_path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        dataset_path.trim_start_matches('/')
    )
}
