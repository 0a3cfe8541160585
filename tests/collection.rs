mod common;

use approx::assert_relative_eq;
use geo::Point;
use nalgebra::DMatrix;

use flightframe::collection::{GroupKey, GroupOptions, GroupSpec};
use flightframe::crs::Crs;
use flightframe::{ErrorKind, FlightError};

use common::track;

/// Mean point-to-point distance over the shorter of the two sequences.
fn lockstep(a: &DMatrix<f64>, b: &DMatrix<f64>) -> f64 {
    let n = a.nrows().min(b.nrows());
    if n == 0 {
        return 0.0;
    }
    (0..n).map(|i| (a.row(i) - b.row(i)).norm()).sum::<f64>() / n as f64
}

fn shift(from: Crs, to: Crs, points: &[Point<f64>]) -> Result<Vec<Point<f64>>, FlightError> {
    let offset = match (from, to) {
        (Crs::Geographic, Crs::WebMercator) => 100.0,
        (Crs::WebMercator, Crs::Geographic) => -100.0,
        _ => return Err(FlightError::Reprojection(format!("{from} -> {to}"))),
    };
    Ok(points
        .iter()
        .map(|p| Point::new(p.x() + offset, p.y() + offset))
        .collect())
}

fn three_flights() -> flightframe::TrajectoryCollection {
    track(
        &[0, 1, 2, 3, 4, 5, 6, 7],
        &["C", "A", "C", "B", "A", "B", "C", "A"],
    )
    .group_by(GroupSpec::keys(["callsign"]), GroupOptions::default())
    .unwrap()
}

#[test]
fn test_ordinal_access_is_stable() {
    let c = three_flights();
    let keys: Vec<GroupKey> = c.keys().cloned().collect();
    assert_eq!(
        keys,
        vec![GroupKey::from("C"), GroupKey::from("A"), GroupKey::from("B")]
    );
    for (i, (key, flight)) in c.iter().enumerate() {
        assert_eq!(c.nth(i).unwrap(), flight);
        assert_eq!(c.flight(key.clone()).unwrap(), flight);
    }
    assert_eq!(c.nth(0).unwrap(), c.nth(0).unwrap());

    let err = c.nth(3).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Usage);
}

#[test]
fn test_sorted_groups() {
    let c = track(&[0, 1, 2], &["C", "A", "B"])
        .group_by(GroupSpec::keys(["callsign"]), GroupOptions::default().sort(true))
        .unwrap();
    let keys: Vec<String> = c.keys().map(|k| k.to_string()).collect();
    assert_eq!(keys, vec!["A", "B", "C"]);
}

#[test]
fn test_distance_matrix_is_symmetric() {
    let c = three_flights();
    let m = c.distance_matrix(false, &lockstep).unwrap();
    assert_eq!(m.shape(), (3, 3));
    for i in 0..3 {
        assert_eq!(m[(i, i)], 0.0);
        for j in 0..3 {
            assert_relative_eq!(m[(i, j)], m[(j, i)]);
        }
    }
    assert!(m[(0, 1)] > 0.0);

    let with_alt = c.distance_matrix(true, &lockstep).unwrap();
    assert!(with_alt[(0, 1)] > m[(0, 1)]);

    let a = c.flight("A").unwrap();
    let b = c.flight("B").unwrap();
    assert_relative_eq!(a.distance(&b, &lockstep).unwrap(), m[(1, 2)]);
}

#[test]
fn test_distance_with_altitude_requires_role() {
    let c = track(&[0, 1], &["A", "B"])
        .drop_columns(&["alt"])
        .into_trajectory()
        .unwrap()
        .group_by(GroupSpec::keys(["callsign"]), GroupOptions::default())
        .unwrap();
    let err = c.distance_matrix(true, &lockstep).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnboundRole);
    assert!(c.distance_matrix(false, &lockstep).is_ok());
}

#[test]
fn test_linestrings_in_group_order() {
    let c = three_flights();
    let lines = c.as_linestrings();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].0, GroupKey::from("C"));
    assert_eq!(lines[1].1.as_ref().map(|l| l.0.len()), Some(3));
    assert_eq!(lines[2].1.as_ref().map(|l| l.0.len()), Some(2));
}

#[test]
fn test_reprojection_round_trip() {
    let c = three_flights();
    let xy = c.to_xy(&shift).unwrap();
    assert_eq!(xy.data().crs(), Crs::WebMercator);
    assert_eq!(xy.len(), c.len());
    assert_relative_eq!(
        xy.nth(0).unwrap().points()[0].x(),
        c.nth(0).unwrap().points()[0].x() + 100.0
    );

    let back = xy.to_latlon(&shift).unwrap();
    assert_eq!(back.data().crs(), Crs::Geographic);
    for i in 0..c.len() {
        common::assert_points_close(back.nth(i).unwrap().points(), c.nth(i).unwrap().points(), 1e-9);
    }

    // a no-op reprojection never calls the transformation
    let failing = |_: Crs, _: Crs, _: &[Point<f64>]| -> Result<Vec<Point<f64>>, FlightError> {
        Err(FlightError::Reprojection("unexpected call".into()))
    };
    assert!(c.to_latlon(&failing).is_ok());
    assert!(c.to_xy(&failing).is_err());
}

#[test]
fn test_set_precision_keeps_groups() {
    let c = three_flights();
    let snapped = c.set_precision(0.1).unwrap();
    assert_eq!(snapped.group_sizes(), c.group_sizes());
    for p in snapped.data().points() {
        assert_relative_eq!(p.x(), (p.x() * 10.0).round() / 10.0, epsilon = 1e-9);
        assert_relative_eq!(p.y(), (p.y() * 10.0).round() / 10.0, epsilon = 1e-9);
    }
}
