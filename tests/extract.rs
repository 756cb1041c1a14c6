use std::path::Path;

use chrono::NaiveDate;

use taxi_trips::extract_from_file::Extract;
use taxi_trips::Trip;

#[test]
fn extract_keeps_only_complete_trips() {
    let path = Path::new("test_files/trips.csv");
    let trips = Trip::extract(path).unwrap();

    // Of the five rows, one is flagged MISSING_DATA and two have polylines
    // too short to carry a duration.
    assert_eq!(trips.len(), 2);
    assert_eq!(trips[0].id, "1372636858620000589");
    assert_eq!(trips[1].id, "1372637303620000596");
}

#[test]
fn extract_parses_start_time_from_epoch_seconds() {
    let path = Path::new("test_files/trips.csv");
    let trips = Trip::extract(path).unwrap();

    let expected = NaiveDate::from_ymd_opt(2013, 7, 1)
        .unwrap()
        .and_hms_opt(0, 0, 58)
        .unwrap();
    assert_eq!(trips[0].start_time, expected);
}

#[test]
fn extract_parses_polyline_points_in_order() {
    let path = Path::new("test_files/trips.csv");
    let trips = Trip::extract(path).unwrap();

    assert_eq!(trips[0].polyline.len(), 4);
    assert_eq!(trips[0].polyline[0], (-8.618643, 41.141412));
    assert_eq!(trips[0].polyline[3], (-8.622153, 41.143536));
}

#[test]
fn extract_errs_on_missing_file() {
    let path = Path::new("test_files/no_such_file.csv");
    assert!(Trip::extract(path).is_err());
}
