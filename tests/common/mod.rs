#![allow(dead_code)]

use approx::assert_relative_eq;
use geo::Point;
use hifitime::{Epoch, Unit};

use flightframe::frame::{Column, Frame, RowIndex};
use flightframe::roles::RoleOverrides;
use flightframe::trajectory::Trajectory;

pub fn t0() -> Epoch {
    Epoch::from_gregorian_tai_at_midnight(2024, 3, 1)
}

/// Raw table with lat/lon/alt/gs/callsign columns and a time index at `secs`.
pub fn raw_track(secs: &[i64], callsigns: &[&str]) -> Frame {
    let n = secs.len();
    let lat: Vec<f64> = (0..n).map(|i| 43.0 + 0.01 * i as f64).collect();
    let lon: Vec<f64> = (0..n).map(|i| 1.0 + 0.02 * i as f64).collect();
    let alt: Vec<f64> = (0..n).map(|i| 1000.0 + 100.0 * i as f64).collect();
    let gs: Vec<f64> = vec![250.0; n];

    Frame::from_columns([
        ("callsign", Column::from(callsigns.to_vec())),
        ("lat", Column::from(lat)),
        ("lon", Column::from(lon)),
        ("alt", Column::from(alt)),
        ("gs", Column::from(gs)),
    ])
    .unwrap()
    .with_index(RowIndex::time(
        "time",
        secs.iter().map(|&s| t0() + Unit::Second * s).collect(),
    ))
    .unwrap()
}

pub fn track(secs: &[i64], callsigns: &[&str]) -> Trajectory {
    Trajectory::new(raw_track(secs, callsigns), &RoleOverrides::default()).unwrap()
}

pub fn assert_points_close(actual: &[Point<f64>], expected: &[Point<f64>], epsilon: f64) {
    assert_eq!(actual.len(), expected.len());
    for (a, e) in actual.iter().zip(expected) {
        assert_relative_eq!(a.x(), e.x(), epsilon = epsilon);
        assert_relative_eq!(a.y(), e.y(), epsilon = epsilon);
    }
}
