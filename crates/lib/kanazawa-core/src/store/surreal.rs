use std::sync::Arc;

use async_trait::async_trait;
use kanazawa_store::models::{BusScheduleEntry, GarbageSchedule, TouristSpot, TransportationStop};
use kanazawa_store::schema::{
    TABLE_BUS_SCHEDULE,
    TABLE_GARBAGE_SCHEDULE,
    TABLE_TOURIST_SPOT,
    TABLE_TRANSPORTATION_STOP,
};
use serde::{Deserialize, Serialize};
use serde::de::DeserializeOwned;
use surrealdb::{Connection, Surreal};
use tokio::sync::Mutex;

use super::{LocalStore, StoreError, StoreResult};
use crate::filter::BusFilter;

// `seq` is selected because SurrealDB only orders by selected fields.
const GARBAGE_FIELDS: &str = "area_code, date, garbage_type, description, seq";
const TOURIST_FIELDS: &str =
    "name, description, latitude, longitude, category, address, opening_hours, contact, seq";
const STOP_FIELDS: &str = "name, `type`, latitude, longitude, address, routes, seq";
const BUS_FIELDS: &str = "route_name, stop_name, departure_time, destination, bus_number, seq";

/// Record plus its insertion sequence number. Queries order by `seq`.
#[derive(Serialize)]
struct Sequenced<T> {
    #[serde(flatten)]
    record: T,
    seq: i64,
}

#[derive(Deserialize)]
struct SeqRow {
    seq: Option<i64>,
}

pub struct SurrealTownStore<C: Connection> {
    db: Arc<Surreal<C>>,
    insert_lock: Arc<Mutex<()>>,
}

impl<C: Connection> Clone for SurrealTownStore<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            insert_lock: self.insert_lock.clone(),
        }
    }
}

impl<C: Connection> SurrealTownStore<C> {
    #[must_use]
    pub fn new(db: Surreal<C>) -> Self {
        Self::from_arc(Arc::new(db))
    }

    #[must_use]
    pub fn from_arc(db: Arc<Surreal<C>>) -> Self {
        Self {
            db,
            insert_lock: Arc::new(Mutex::new(())),
        }
    }

    #[must_use]
    pub fn db(&self) -> &Surreal<C> {
        &self.db
    }

    /// Inserts garbage collection records.
    ///
    /// # Errors
    /// Returns `StoreError` if validation fails or the database write fails.
    pub async fn insert_garbage_schedules(
        &self,
        schedules: Vec<GarbageSchedule>,
    ) -> StoreResult<usize> {
        for schedule in &schedules {
            ensure_non_empty(&schedule.area_code, "area_code")?;
        }
        self.insert_all(TABLE_GARBAGE_SCHEDULE, schedules).await
    }

    /// Inserts tourist spot records.
    ///
    /// # Errors
    /// Returns `StoreError` if validation fails or the database write fails.
    pub async fn insert_tourist_spots(&self, spots: Vec<TouristSpot>) -> StoreResult<usize> {
        for spot in &spots {
            ensure_non_empty(&spot.name, "name")?;
        }
        self.insert_all(TABLE_TOURIST_SPOT, spots).await
    }

    /// Inserts station and bus stop records.
    ///
    /// # Errors
    /// Returns `StoreError` if validation fails or the database write fails.
    pub async fn insert_transportation_stops(
        &self,
        stops: Vec<TransportationStop>,
    ) -> StoreResult<usize> {
        for stop in &stops {
            ensure_non_empty(&stop.name, "name")?;
            ensure_non_empty(&stop.kind, "type")?;
        }
        self.insert_all(TABLE_TRANSPORTATION_STOP, stops).await
    }

    /// Inserts timetable entries.
    ///
    /// # Errors
    /// Returns `StoreError` if validation fails or the database write fails.
    pub async fn insert_bus_schedules(&self, entries: Vec<BusScheduleEntry>) -> StoreResult<usize> {
        for entry in &entries {
            ensure_non_empty(&entry.route_name, "route_name")?;
            ensure_non_empty(&entry.departure_time, "departure_time")?;
        }
        self.insert_all(TABLE_BUS_SCHEDULE, entries).await
    }

    /// Appends records after the highest existing `seq` of `table`.
    async fn insert_all<T>(&self, table: &str, records: Vec<T>) -> StoreResult<usize>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
    {
        let guard = self.insert_lock.lock().await;
        let mut seq = self.next_seq(table).await?;
        let mut inserted = 0;
        for record in records {
            let created: Option<T> = self
                .db
                .create(table)
                .content(Sequenced { record, seq })
                .await?;
            require_record(created, table)?;
            seq += 1;
            inserted += 1;
        }
        drop(guard);
        Ok(inserted)
    }

    async fn next_seq(&self, table: &str) -> StoreResult<i64> {
        let query = format!("SELECT seq FROM {table} ORDER BY seq DESC LIMIT 1;");
        let mut response = self.db.query(query).await.map_err(StoreError::connection)?;
        let last: Vec<SeqRow> = response.take(0)?;
        Ok(last
            .into_iter()
            .find_map(|row| row.seq)
            .map_or(0, |seq| seq + 1))
    }
}

#[async_trait]
impl<C: Connection> LocalStore for SurrealTownStore<C> {
    async fn garbage_schedules(
        &self,
        area_code: &str,
        date: &str,
    ) -> StoreResult<Vec<GarbageSchedule>> {
        let area_code = area_code.to_string();
        let date = date.to_string();
        let query = format!(
            "SELECT {GARBAGE_FIELDS} FROM {TABLE_GARBAGE_SCHEDULE} WHERE area_code = $area_code AND date = $date ORDER BY seq;"
        );
        let mut response = self
            .db
            .query(query)
            .bind(("area_code", area_code))
            .bind(("date", date))
            .await
            .map_err(StoreError::connection)?;
        let records: Vec<GarbageSchedule> = response.take(0)?;
        Ok(records)
    }

    async fn tourist_spots(&self, keyword: &str, limit: usize) -> StoreResult<Vec<TouristSpot>> {
        let keyword = keyword.trim().to_lowercase();
        let limit = limit_to_i64(limit)?;
        let query = format!(
            "SELECT {TOURIST_FIELDS} FROM {TABLE_TOURIST_SPOT} WHERE string::contains(string::lowercase(name), $keyword) OR string::contains(string::lowercase(description ?? ''), $keyword) ORDER BY seq LIMIT $limit;"
        );
        let mut response = self
            .db
            .query(query)
            .bind(("keyword", keyword))
            .bind(("limit", limit))
            .await
            .map_err(StoreError::connection)?;
        let records: Vec<TouristSpot> = response.take(0)?;
        Ok(records)
    }

    async fn transportation_stops(&self, kind: &str) -> StoreResult<Vec<TransportationStop>> {
        let kind = kind.to_string();
        let query = format!(
            "SELECT {STOP_FIELDS} FROM {TABLE_TRANSPORTATION_STOP} WHERE `type` = $kind ORDER BY seq;"
        );
        let mut response = self
            .db
            .query(query)
            .bind(("kind", kind))
            .await
            .map_err(StoreError::connection)?;
        let records: Vec<TransportationStop> = response.take(0)?;
        Ok(records)
    }

    async fn bus_schedules(&self, filter: &BusFilter) -> StoreResult<Vec<BusScheduleEntry>> {
        let limit = limit_to_i64(filter.limit)?;
        let hour_prefix = filter.hour_prefix();
        let route_name = filter.route_name.clone();
        let stop_name = filter.stop_name.clone();

        let mut conditions = Vec::new();
        if hour_prefix.is_some() {
            conditions.push("string::starts_with(departure_time, $hour_prefix)");
        }
        if route_name.is_some() {
            conditions.push("string::contains(route_name, $route_name)");
        }
        if stop_name.is_some() {
            conditions.push("string::contains(stop_name, $stop_name)");
        }
        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let query = format!(
            "SELECT {BUS_FIELDS} FROM {TABLE_BUS_SCHEDULE}{where_clause} ORDER BY seq LIMIT $limit;"
        );

        let mut request = self.db.query(query).bind(("limit", limit));
        if let Some(hour_prefix) = hour_prefix {
            request = request.bind(("hour_prefix", hour_prefix));
        }
        if let Some(route_name) = route_name {
            request = request.bind(("route_name", route_name));
        }
        if let Some(stop_name) = stop_name {
            request = request.bind(("stop_name", stop_name));
        }
        let mut response = request.await.map_err(StoreError::connection)?;
        let records: Vec<BusScheduleEntry> = response.take(0)?;
        Ok(records)
    }
}

fn ensure_non_empty(value: &str, field: &str) -> StoreResult<()> {
    if value.trim().is_empty() {
        return Err(StoreError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn require_record<T>(record: Option<T>, table: &str) -> StoreResult<T> {
    record.ok_or_else(|| {
        StoreError::InvalidInput(format!("No record returned when creating {table}"))
    })
}

fn limit_to_i64(limit: usize) -> StoreResult<i64> {
    i64::try_from(limit)
        .map_err(|_| StoreError::InvalidInput("limit exceeds supported range".to_string()))
}
