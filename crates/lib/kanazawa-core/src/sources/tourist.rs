use kanazawa_store::models::{TouristSpotSummary, TouristSpotsData, ToolData};

use super::{decode_rows, non_empty};
use crate::fallback;
use crate::filter::tourist_matches;
use crate::opendata::{Dataset, OpenDataFetcher, rows};
use crate::store::{LocalStore, StoreResult};
use crate::tools::params::TouristSpotInput;

pub(super) async fn open_data(
    fetcher: &dyn OpenDataFetcher,
    input: &TouristSpotInput,
) -> Option<ToolData> {
    let dataset = Dataset::TouristSpots;
    let keyword = input.keyword.trim().to_lowercase();
    let spots: Vec<TouristSpotSummary> =
        decode_rows(dataset, fetcher.fetch(dataset).await, rows::tourist_spot)
            .into_iter()
            .filter(|spot| tourist_matches(&keyword, spot))
            .take(input.limit)
            .map(Into::into)
            .collect();
    non_empty(spots, payload)
}

pub(super) async fn local(
    store: &dyn LocalStore,
    input: &TouristSpotInput,
) -> StoreResult<Option<ToolData>> {
    let spots: Vec<TouristSpotSummary> = store
        .tourist_spots(&input.keyword, input.limit)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    Ok(non_empty(spots, payload))
}

pub(super) fn fallback() -> ToolData {
    payload(
        fallback::tourist_spots()
            .into_iter()
            .map(Into::into)
            .collect(),
    )
}

fn payload(spots: Vec<TouristSpotSummary>) -> ToolData {
    ToolData::TouristSpots(TouristSpotsData { spots })
}
