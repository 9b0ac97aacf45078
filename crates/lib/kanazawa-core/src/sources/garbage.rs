use kanazawa_store::models::{GarbageSchedule, GarbageScheduleData, ToolData};

use super::{decode_rows, non_empty};
use crate::fallback;
use crate::filter::garbage_matches;
use crate::opendata::{Dataset, OpenDataFetcher, rows};
use crate::store::{LocalStore, StoreResult};
use crate::tools::params::GarbageScheduleInput;

pub(super) async fn open_data(
    fetcher: &dyn OpenDataFetcher,
    input: &GarbageScheduleInput,
) -> Option<ToolData> {
    let dataset = Dataset::GarbageSchedule;
    let schedules: Vec<GarbageSchedule> =
        decode_rows(dataset, fetcher.fetch(dataset).await, rows::garbage_schedule)
            .into_iter()
            .filter(|schedule| garbage_matches(&input.area_code, &input.date, schedule))
            .collect();
    non_empty(schedules, |schedules| payload(input, schedules))
}

pub(super) async fn local(
    store: &dyn LocalStore,
    input: &GarbageScheduleInput,
) -> StoreResult<Option<ToolData>> {
    let schedules = store.garbage_schedules(&input.area_code, &input.date).await?;
    Ok(non_empty(schedules, |schedules| payload(input, schedules)))
}

/// The fallback set is served whole, echoing the requested area and day.
pub(super) fn fallback(input: &GarbageScheduleInput) -> ToolData {
    payload(input, fallback::garbage_schedules())
}

fn payload(input: &GarbageScheduleInput, schedules: Vec<GarbageSchedule>) -> ToolData {
    ToolData::GarbageSchedule(GarbageScheduleData::new(
        &input.area_code,
        &input.date,
        schedules,
    ))
}
