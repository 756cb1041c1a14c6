//! Database functionality.
//!
//! Trips live in the `taxi_trip_by_hour` table, denormalized by the year,
//! month, day, and hour of the trip start so that an hour bucket is a single
//! indexed lookup. The polyline is stored as a JSON CLOB in the same
//! `[[lon, lat], ...]` shape the CSV export uses. Records flagged as having
//! missing location data are dropped at ingestion and never stored, so
//! selects do not need to re-check the flag; single-point traces are filtered
//! again on the way out in case older data predates the ingestion filter.

pub mod oracle_impls;

use std::env;

use chrono::{Datelike, Duration, NaiveDate, Timelike};
use oracle::{
    pool::{Pool, PoolBuilder},
    Connection, Error as OracleError, Statement,
};

use crate::regression::TripSource;
use crate::{Trip, TripError};

/// Get database credentials from environment variable.
pub fn get_creds() -> (String, String) {
    dotenvy::dotenv().expect("Unable to load .env file.");

    (
        env::var("DB_USERNAME").unwrap(),
        env::var("DB_PASSWORD").unwrap(),
    )
}

/// Create a connection pool.
pub fn create_pool(username: String, password: String) -> Result<Pool, OracleError> {
    PoolBuilder::new(username, password, "taxidb_tp")
        .max_connections(5)
        .build()
}

/// A trait for basic db operations on trip record tables.
pub trait Crud {
    /// The name of the table in the database that this type corresponds to.
    const TABLE: &'static str;

    /// Create prepared statement to use for insert.
    fn prepare_insert(conn: &Connection) -> Result<Statement, oracle::Error>;

    /// Insert a record into the table using prepared statement.
    fn insert(&self, stmt: &mut Statement) -> Result<(), oracle::Error>;
}

impl Crud for Trip {
    const TABLE: &'static str = "taxi_trip_by_hour";

    fn prepare_insert(conn: &Connection) -> Result<Statement, oracle::Error> {
        let sql = &format!(
            "insert into {}
            (trip_id, starttime_year, starttime_month, starttime_day, \
            starttime_hour, starttime, polyline)
            VALUES (:1, :2, :3, :4, :5, :6, :7)",
            &Self::TABLE,
        );
        conn.statement(sql).build()
    }

    fn insert(&self, stmt: &mut Statement) -> Result<(), oracle::Error> {
        // (f64, f64) pairs always serialize.
        let polyline = serde_json::to_string(&self.polyline).unwrap();
        stmt.execute(&[
            &self.id,
            &self.start_time.year(),
            &self.start_time.month(),
            &self.start_time.day(),
            &self.start_time.hour(),
            &self.start_time,
            &polyline,
        ])
    }
}

/// Insert trips using a prepared statement, returning how many went in.
pub fn insert_trips(conn: &Connection, trips: &[Trip]) -> Result<usize, TripError> {
    let mut stmt = Trip::prepare_insert(conn)?;
    for trip in trips {
        trip.insert(&mut stmt)?;
    }
    conn.commit()?;
    Ok(trips.len())
}

/// Get the trips of a given hour of one calendar day.
pub fn get_trips_one_day_hour(
    conn: &Connection,
    day: NaiveDate,
    hour: u32,
) -> Result<Vec<Trip>, TripError> {
    let sql = &format!(
        "select trip_id, starttime, polyline from {} \
        where starttime_year = :1 and starttime_month = :2 \
        and starttime_day = :3 and starttime_hour = :4",
        &<Trip as Crud>::TABLE,
    );
    let results = conn.query_as::<Trip>(sql, &[&day.year(), &day.month(), &day.day(), &hour])?;

    let mut trips = vec![];
    for row in results {
        let trip = row?;
        if trip.polyline.len() < 2 {
            continue;
        }
        trips.push(trip);
    }
    Ok(trips)
}

impl TripSource for Connection {
    /// Collect the given hour's trips for every day in `[start, end)`.
    fn hour_trips_between_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hour: u32,
    ) -> Result<Vec<Trip>, TripError> {
        let mut trips = vec![];
        for offset in 0..(end - start).num_days() {
            let day = start + Duration::days(offset);
            trips.extend(get_trips_one_day_hour(self, day, hour)?);
        }
        Ok(trips)
    }
}
