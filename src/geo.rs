//! Geographic helpers for GPS polylines.

use std::f64::consts::PI;

use crate::GpsPoint;

/// Mean Earth radius, in meters.
pub const EARTH_RADIUS: f64 = 6_371_000.0;

/// Surface distance in meters between two (longitude, latitude) points.
///
/// This is not the haversine formula: angular separations are taken as linear
/// fractions of a full 360° circle, with the longitude difference weighted by
/// the cosine of the mean latitude. The hourly estimates downstream depend on
/// this exact geometry, so it must not be swapped for a true great-circle
/// formula.
pub fn surface_distance(p1: GpsPoint, p2: GpsPoint) -> f64 {
    let (lon1, lat1) = p1;
    let (lon2, lat2) = p2;
    let dlat = (lat1 - lat2) / 360.0;
    let dlon = (lon1 - lon2) / 360.0 * ((lat1 + lat2) / 360.0 * PI).cos();
    2.0 * PI * EARTH_RADIUS * (dlat.powi(2) + dlon.powi(2)).sqrt()
}

/// Total length in meters of a polyline, summed over consecutive points.
pub fn polyline_length(polyline: &[GpsPoint]) -> f64 {
    polyline
        .windows(2)
        .map(|pair| surface_distance(pair[0], pair[1]))
        .sum()
}
