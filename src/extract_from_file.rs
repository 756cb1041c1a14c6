//! Extract trips from CSV exports.
//!
//! The expected format is the taxi dispatch export: one row per trip, with at
//! least the columns `TRIP_ID`, `TIMESTAMP` (Unix epoch seconds),
//! `MISSING_DATA` ("True"/"False"), and `POLYLINE` (a JSON array of
//! `[longitude, latitude]` pairs in chronological order, one per 15-second
//! sampling interval). Any other columns are ignored.

use std::fs::File;
use std::path::Path;

use chrono::DateTime;
use csv::{Reader, ReaderBuilder};
use log::error;
use serde::Deserialize;

use crate::{GpsPoint, Trip, TripError};

/// A trait for extracting records from a file.
pub trait Extract {
    type Item;
    fn extract(path: &Path) -> Result<Vec<Self::Item>, TripError>;
}

/// The CSV columns we consume, by header name.
#[derive(Debug, Deserialize)]
struct TripRow {
    #[serde(rename = "TRIP_ID")]
    trip_id: String,
    #[serde(rename = "TIMESTAMP")]
    timestamp: i64,
    #[serde(rename = "MISSING_DATA")]
    missing_data: String,
    #[serde(rename = "POLYLINE")]
    polyline: String,
}

/// Extract Trip records from a file.
impl Extract for Trip {
    type Item = Trip;

    /// Rows flagged as missing location data and trips with fewer than 2
    /// polyline points are dropped; such trips carry no usable distance or
    /// duration. Rows whose polyline or timestamp cannot be decoded are
    /// logged and skipped so one bad row does not lose the whole file.
    fn extract(path: &Path) -> Result<Vec<Self::Item>, TripError> {
        let data_file = File::open(path)?;
        let mut rdr = create_reader(&data_file);

        let mut trips = vec![];
        for row in rdr.deserialize() {
            let row: TripRow = row?;

            if row.missing_data != "False" {
                continue;
            }
            let polyline: Vec<GpsPoint> = match serde_json::from_str(&row.polyline) {
                Ok(v) => v,
                Err(e) => {
                    error!("Bad polyline in trip `{}`: {e}.", row.trip_id);
                    continue;
                }
            };
            if polyline.len() < 2 {
                continue;
            }
            let start_time = match DateTime::from_timestamp(row.timestamp, 0) {
                Some(v) => v.naive_utc(),
                None => {
                    error!("Bad timestamp {} in trip `{}`.", row.timestamp, row.trip_id);
                    continue;
                }
            };

            trips.push(Trip {
                id: row.trip_id,
                start_time,
                polyline,
            });
        }
        Ok(trips)
    }
}

/// Create CSV reader from file.
pub fn create_reader(file: &File) -> Reader<&File> {
    ReaderBuilder::new().trim(csv::Trim::All).from_reader(file)
}
