//! Local structured store interfaces and `SurrealDB` implementation.
//!
//! The store holds the durable copies of every domain record and answers the
//! same filters the open-data tier applies in memory.

pub mod surreal;

use std::error::Error;
use std::fmt;

use async_trait::async_trait;
use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};

use crate::filter::BusFilter;

pub use surreal::SurrealTownStore;

/// Failures of the local store.
///
/// `Connection` covers requests that never reached the database. Errors the
/// database reports for a statement, and rows that do not decode into a
/// record, are `Surreal`.
#[derive(Debug)]
pub enum StoreError {
    Connection(Box<surrealdb::Error>),
    Surreal(Box<surrealdb::Error>),
    Unavailable(String),
    InvalidInput(String),
}

impl StoreError {
    pub(crate) fn connection(err: surrealdb::Error) -> Self {
        Self::Connection(Box::new(err))
    }

    /// Connectivity failures the data-source chain recovers from.
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Unavailable(_))
    }
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "SurrealDB connection error: {err}"),
            Self::Surreal(err) => write!(f, "SurrealDB error: {err}"),
            Self::Unavailable(message) => write!(f, "Store unavailable: {message}"),
            Self::InvalidInput(message) => write!(f, "Invalid input: {message}"),
        }
    }
}

impl Error for StoreError {}

impl From<surrealdb::Error> for StoreError {
    fn from(err: surrealdb::Error) -> Self {
        Self::Surreal(Box::new(err))
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Query surface of the local tier.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn garbage_schedules(&self, area_code: &str, date: &str)
    -> StoreResult<Vec<GarbageSchedule>>;

    /// `keyword` matches name or description, ignoring case.
    async fn tourist_spots(&self, keyword: &str, limit: usize) -> StoreResult<Vec<TouristSpot>>;

    async fn transportation_stops(&self, kind: &str) -> StoreResult<Vec<TransportationStop>>;

    async fn bus_schedules(&self, filter: &BusFilter) -> StoreResult<Vec<BusScheduleEntry>>;
}
