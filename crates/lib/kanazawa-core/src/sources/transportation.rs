use kanazawa_store::models::{StopSummary, ToolData, TransportationData};

use super::{decode_rows, non_empty};
use crate::fallback;
use crate::filter::stop_matches;
use crate::opendata::{Dataset, OpenDataFetcher, rows};
use crate::store::{LocalStore, StoreResult};
use crate::tools::params::TransportationInput;

pub(super) async fn open_data(
    fetcher: &dyn OpenDataFetcher,
    input: &TransportationInput,
) -> Option<ToolData> {
    let dataset = Dataset::TransportationStops;
    let stops: Vec<StopSummary> =
        decode_rows(dataset, fetcher.fetch(dataset).await, rows::transportation_stop)
            .into_iter()
            .filter(|stop| stop_matches(&input.kind, stop))
            .map(Into::into)
            .collect();
    non_empty(stops, payload)
}

pub(super) async fn local(
    store: &dyn LocalStore,
    input: &TransportationInput,
) -> StoreResult<Option<ToolData>> {
    let stops: Vec<StopSummary> = store
        .transportation_stops(&input.kind)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(non_empty(stops, payload))
}

pub(super) fn fallback() -> ToolData {
    payload(
        fallback::transportation_stops()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

fn payload(stops: Vec<StopSummary>) -> ToolData {
    ToolData::Transportation(TransportationData { stops })
}
