use kanazawa_store::models::{BusScheduleData, BusScheduleEntry, ToolData};

use super::{decode_rows, non_empty};
use crate::fallback;
use crate::opendata::{Dataset, OpenDataFetcher, rows};
use crate::store::{LocalStore, StoreResult};
use crate::tools::params::BusScheduleInput;

pub(super) async fn open_data(
    fetcher: &dyn OpenDataFetcher,
    input: &BusScheduleInput,
) -> Option<ToolData> {
    let dataset = Dataset::BusSchedule;
    let entries = decode_rows(dataset, fetcher.fetch(dataset).await, rows::bus_schedule_entry);
    non_empty(input.filter().apply(entries), payload)
}

pub(super) async fn local(
    store: &dyn LocalStore,
    input: &BusScheduleInput,
) -> StoreResult<Option<ToolData>> {
    let departures = store.bus_schedules(&input.filter()).await?;
    Ok(non_empty(departures, payload))
}

/// Unlike the other domains, the fallback timetable is filtered too.
pub(super) fn fallback(input: &BusScheduleInput) -> ToolData {
    payload(input.filter().apply(fallback::bus_schedule()))
}

fn payload(departures: Vec<BusScheduleEntry>) -> ToolData {
    ToolData::BusSchedule(BusScheduleData { departures })
}
