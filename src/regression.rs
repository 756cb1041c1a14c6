//! Closed-form hourly regression over trip streams.
//!
//! Each trip contributes a five-component moment vector; summing those
//! vectors over all trips that started in a given hour of day yields the
//! sufficient statistics for a one-shot least-squares fit of trip duration
//! against trip distance. The fitted intercept is the pickup time offset
//! ("tau") and the inverse of the fitted slope is the effective speed.

use std::ops::Add;

use chrono::NaiveDate;
use log::warn;

use crate::{geo, Trip, TripError};

/// Seconds represented by each polyline segment (fixed GPS sampling rate).
pub const SAMPLE_INTERVAL: f64 = 15.0;

/// Per-trip regression moments: `(1, d, d², T, d·T)`.
///
/// Summing these element-wise over a bucket of trips gives the aggregate the
/// estimator works from; the `trips` component then holds the bucket size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TripFeatures {
    pub trips: f64,
    pub distance: f64,
    pub distance_squared: f64,
    pub duration: f64,
    pub distance_duration: f64,
}

impl TripFeatures {
    /// Derive the moment vector for one trip.
    ///
    /// Duration is not measured: each of the `n - 1` polyline segments stands
    /// for one fixed sampling interval.
    pub fn from_trip(trip: &Trip) -> Result<Self, TripError> {
        if trip.polyline.len() < 2 {
            return Err(TripError::InvalidTrip(trip.id.clone()));
        }
        let distance = geo::polyline_length(&trip.polyline);
        let duration = (trip.polyline.len() - 1) as f64 * SAMPLE_INTERVAL;
        Ok(Self {
            trips: 1.0,
            distance,
            distance_squared: distance * distance,
            duration,
            distance_duration: distance * duration,
        })
    }
}

impl Add for TripFeatures {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self {
            trips: self.trips + other.trips,
            distance: self.distance + other.distance,
            distance_squared: self.distance_squared + other.distance_squared,
            duration: self.duration + other.duration,
            distance_duration: self.distance_duration + other.distance_duration,
        }
    }
}

/// Estimated parameters for one hour of day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HourlyParams {
    /// Pickup time offset, in minutes.
    pub tau: f64,
    /// Effective speed, in km/h.
    pub speed: f64,
}

/// Tau and speed for every hour of day, indexed by hour (0–23).
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyCurves {
    pub tau: [f64; 24],
    pub speed: [f64; 24],
}

/// A source of trips bucketed by calendar day and hour of day.
///
/// Implementations must cover every day `d` with `start <= d < end`
/// (half-open interval), returning the trips whose recorded start falls in
/// that day's given hour, and must exclude records flagged as having missing
/// location data as well as trips with fewer than 2 polyline points.
pub trait TripSource {
    fn hour_trips_between_dates(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        hour: u32,
    ) -> Result<Vec<Trip>, TripError>;
}

/// What the date-range driver does with a bucket that cannot be estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketPolicy {
    /// Fail the whole computation, naming the offending hour.
    Abort,
    /// Record `f64::NAN` for that hour, log a warning, and continue.
    Sentinel,
}

/// Estimate tau and speed from the trips of one hour bucket.
///
/// The stream is consumed exactly once; the reduction is commutative, so the
/// order trips arrive in does not affect the result.
pub fn estimate_hour<I>(trips: I) -> Result<HourlyParams, TripError>
where
    I: IntoIterator<Item = Trip>,
{
    let mut aggregate = TripFeatures::default();
    for trip in trips {
        aggregate = aggregate + TripFeatures::from_trip(&trip)?;
    }
    params_from_aggregate(aggregate)
}

/// The closed-form fit over a bucket aggregate.
fn params_from_aggregate(aggregate: TripFeatures) -> Result<HourlyParams, TripError> {
    if aggregate.trips == 0.0 {
        return Err(TripError::EmptyStream);
    }
    let d_mean = aggregate.distance / aggregate.trips;
    let t_mean = aggregate.duration / aggregate.trips;

    // Centered cross-moment and variance.
    let cov_dt = aggregate.distance_duration / aggregate.trips - d_mean * t_mean;
    let var_d = aggregate.distance_squared / aggregate.trips - d_mean * d_mean;
    if var_d == 0.0 {
        return Err(TripError::DegenerateRegression);
    }

    let tau = t_mean - cov_dt / var_d * d_mean;
    // Inverse-slope estimator: distance variance over distance-duration
    // covariance, in m/s. Not a plain distance-over-duration average.
    let speed = var_d / cov_dt;

    // Native units are meters and seconds; report minutes and km/h.
    Ok(HourlyParams {
        tau: tau / 60.0,
        speed: speed * 3.6,
    })
}

/// Estimate tau and speed for every hour of day over `[start, end)`.
///
/// Each hour's bucket is fetched from `source` and reduced independently.
/// Buckets that are empty or have zero distance variance are handled
/// according to `policy`; any other error aborts the computation.
pub fn estimate_between_dates<S>(
    source: &S,
    start: NaiveDate,
    end: NaiveDate,
    policy: BucketPolicy,
) -> Result<HourlyCurves, TripError>
where
    S: TripSource,
{
    if start >= end {
        return Err(TripError::InvalidDateRange);
    }

    let mut tau = [f64::NAN; 24];
    let mut speed = [f64::NAN; 24];
    for hour in 0..24u32 {
        let trips = source.hour_trips_between_dates(start, end, hour)?;
        match estimate_hour(trips) {
            Ok(params) => {
                tau[hour as usize] = params.tau;
                speed[hour as usize] = params.speed;
            }
            Err(e @ (TripError::EmptyStream | TripError::DegenerateRegression)) => match policy {
                BucketPolicy::Abort => {
                    return Err(TripError::UndeterminableHour {
                        hour,
                        source: Box::new(e),
                    })
                }
                BucketPolicy::Sentinel => {
                    warn!("Hour {hour} could not be estimated ({e}); recording NaN.");
                }
            },
            Err(e) => return Err(e),
        }
    }

    Ok(HourlyCurves { tau, speed })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_trip(id: &str, polyline: Vec<(f64, f64)>) -> Trip {
        Trip {
            id: id.to_string(),
            start_time: NaiveDate::from_ymd_opt(2013, 7, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
            polyline,
        }
    }

    #[test]
    fn features_for_two_identical_points() {
        let trip = test_trip("a", vec![(0.0, 0.0), (0.0, 0.0)]);
        let features = TripFeatures::from_trip(&trip).unwrap();
        assert_eq!(
            features,
            TripFeatures {
                trips: 1.0,
                distance: 0.0,
                distance_squared: 0.0,
                duration: 15.0,
                distance_duration: 0.0,
            }
        );
    }

    #[test]
    fn features_duration_counts_segments_not_points() {
        let trip = test_trip("a", vec![(1.5, -2.0); 5]);
        let features = TripFeatures::from_trip(&trip).unwrap();
        assert_eq!(features.distance, 0.0);
        assert_eq!(features.duration, 60.0);
        assert_eq!(features.distance_duration, 0.0);
    }

    #[test]
    fn features_fail_on_empty_polyline() {
        let trip = test_trip("a", vec![]);
        assert!(matches!(
            TripFeatures::from_trip(&trip),
            Err(TripError::InvalidTrip(_))
        ));
    }

    #[test]
    fn features_fail_on_single_point_polyline() {
        let trip = test_trip("a", vec![(-8.6, 41.1)]);
        assert!(matches!(
            TripFeatures::from_trip(&trip),
            Err(TripError::InvalidTrip(_))
        ));
    }

    #[test]
    fn features_sum_element_wise() {
        let a = TripFeatures::from_trip(&test_trip("a", vec![(0.0, 0.0), (0.0, 0.0)])).unwrap();
        let b = TripFeatures::from_trip(&test_trip("b", vec![(0.0, 0.0); 3])).unwrap();
        let sum = a + b;
        assert_eq!(sum.trips, 2.0);
        assert_eq!(sum.duration, 45.0);
    }

    #[test]
    fn estimate_fails_on_empty_stream() {
        assert!(matches!(
            estimate_hour(vec![]),
            Err(TripError::EmptyStream)
        ));
    }

    #[test]
    fn estimate_fails_when_distance_variance_is_zero() {
        // Identical (zero) distances with differing durations.
        let trips = vec![
            test_trip("a", vec![(0.0, 0.0), (0.0, 0.0)]),
            test_trip("b", vec![(0.0, 0.0), (0.0, 0.0), (0.0, 0.0)]),
        ];
        assert!(matches!(
            estimate_hour(trips),
            Err(TripError::DegenerateRegression)
        ));
    }

    #[test]
    fn estimate_is_invariant_under_trip_reordering() {
        let trips = vec![
            test_trip("a", vec![(-8.61, 41.14), (-8.62, 41.15)]),
            test_trip("b", vec![(-8.61, 41.14), (-8.63, 41.16), (-8.65, 41.17)]),
            test_trip(
                "c",
                vec![(-8.60, 41.14), (-8.60, 41.15), (-8.60, 41.16), (-8.61, 41.17)],
            ),
        ];
        let forward = estimate_hour(trips.clone()).unwrap();
        let mut reordered = trips;
        reordered.reverse();
        let backward = estimate_hour(reordered).unwrap();
        assert!((forward.tau - backward.tau).abs() < 1e-9);
        assert!((forward.speed - backward.speed).abs() < 1e-9);
    }

    #[test]
    fn estimate_matches_hand_computed_aggregate() {
        // d_mean = 100, T_mean = 30, cov = 500/3, var = 10000/3, so
        // tau_raw = 30 - 0.05 * 100 = 25 s and speed_raw = 20 m/s.
        let aggregate = TripFeatures {
            trips: 3.0,
            distance: 300.0,
            distance_squared: 40_000.0,
            duration: 90.0,
            distance_duration: 9_500.0,
        };
        let params = params_from_aggregate(aggregate).unwrap();
        assert!((params.tau - 25.0 / 60.0).abs() < 1e-9);
        assert!((params.speed - 72.0).abs() < 1e-9);
    }
}
