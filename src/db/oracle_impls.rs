//! Various implementations for use with an Oracle database.
use chrono::NaiveDateTime;
use oracle::{Error as OracleError, RowValue};

use crate::{GpsPoint, Trip};

impl RowValue for Trip {
    fn get(row: &oracle::Row) -> oracle::Result<Self> {
        let id: String = row.get("trip_id")?;
        let start_time: NaiveDateTime = row.get("starttime")?;
        let polyline: String = row.get("polyline")?;
        let polyline: Vec<GpsPoint> = serde_json::from_str(&polyline)
            .map_err(|e| OracleError::ParseError(Box::new(e)))?;
        Ok(Trip {
            id,
            start_time,
            polyline,
        })
    }
}
