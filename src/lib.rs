//! Estimate hourly pickup parameters from taxi GPS trip records.
//!
//! Trip records come in from the taxi dispatch CSV export
//! ([`extract_from_file`]), are persisted to an hour-bucketed database table
//! ([`db`]), and are reduced per hour of day into two parameters — a pickup
//! time offset ("tau", in minutes) and an effective speed (in km/h) — by a
//! closed-form regression over trip distance and duration ([`regression`]).
//! [`plot`] renders the resulting 24-hour curves to an image.

use std::io;

use chrono::NaiveDateTime;
use thiserror::Error;

pub mod db;
pub mod extract_from_file;
pub mod geo;
pub mod plot;
pub mod regression;

/// A (longitude, latitude) pair in decimal degrees.
pub type GpsPoint = (f64, f64);

/// One taxi journey: identifier, start of trip, and its GPS trace.
///
/// The polyline is ordered chronologically, one point per 15-second sampling
/// interval. Trips reaching the regression always have at least 2 points;
/// ingestion and storage filter shorter ones out.
#[derive(Debug, Clone, PartialEq)]
pub struct Trip {
    pub id: String,
    pub start_time: NaiveDateTime,
    pub polyline: Vec<GpsPoint>,
}

#[derive(Debug, Error)]
pub enum TripError {
    #[error("unable to open file `{0}`")]
    CannotOpenFile(#[from] io::Error),
    #[error("error reading CSV data")]
    CsvError(#[from] csv::Error),
    #[error("database error `{0}`")]
    DbError(#[from] oracle::Error),
    #[error("trip `{0}` has a polyline with fewer than 2 points")]
    InvalidTrip(String),
    #[error("no qualifying trips in hour bucket")]
    EmptyStream,
    #[error("zero distance variance in hour bucket; regression is undefined")]
    DegenerateRegression,
    #[error("hour {hour} could not be estimated")]
    UndeterminableHour {
        hour: u32,
        #[source]
        source: Box<TripError>,
    },
    #[error("start date must be strictly before end date")]
    InvalidDateRange,
    #[error("unable to render chart: {0}")]
    Render(String),
}
