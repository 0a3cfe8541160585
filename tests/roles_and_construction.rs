mod common;

use flightframe::frame::csv_reader::CsvOptions;
use flightframe::frame::{Column, Frame};
use flightframe::roles::{Role, RoleOverrides};
use flightframe::trajectory::Trajectory;
use flightframe::{ErrorKind, FlightError};

use common::{raw_track, track};

#[test]
fn test_projection_revalidates_altitude() {
    let t = track(&[0, 1, 2], &["AFR1"; 3]);
    assert_eq!(t.roles().altitude.as_deref(), Some("alt"));

    let without = t
        .select(&["geometry", "gs"])
        .unwrap()
        .into_trajectory()
        .unwrap();
    assert_eq!(
        without.altitude().unwrap_err(),
        FlightError::RoleNotConfigured(Role::Altitude)
    );
    assert_eq!(without.velocity().unwrap(), t.velocity().unwrap());

    let with = t
        .select(&["geometry", "alt"])
        .unwrap()
        .into_trajectory()
        .unwrap();
    assert_eq!(with.altitude().unwrap(), t.altitude().unwrap());

    // re-including the column and rebuilding binds it again
    let restored = without
        .hconcat(&t.frame().select(&["alt"]).unwrap())
        .unwrap()
        .into_trajectory()
        .unwrap();
    let restored = Trajectory::new(restored, &RoleOverrides::default()).unwrap();
    assert_eq!(restored.roles().altitude.as_deref(), Some("alt"));
}

#[test]
fn test_row_filters_keep_bindings() {
    let t = track(&[0, 1, 2, 3], &["AFR1"; 4]);
    let filtered = t.filter(&[true, false, true, false]).unwrap();
    assert_eq!(filtered.len(), 2);
    assert_eq!(filtered.roles(), t.roles());
    assert_eq!(t.slice(1, 3).heading().unwrap_err().kind(), ErrorKind::UnboundRole);
}

#[test]
fn test_construction_requires_latitude_and_longitude() {
    let frame = raw_track(&[0, 1], &["AFR1"; 2]).drop_columns(&["lon"]);
    let err = Trajectory::new(frame, &RoleOverrides::default()).unwrap_err();
    assert_eq!(err, FlightError::MissingRequiredRole(Role::Longitude));
    assert_eq!(err.kind(), ErrorKind::Configuration);

    let frame = Frame::from_columns([
        ("lat", Column::from(vec![10.0, 20.0, 30.0])),
        ("lon", Column::from(vec![100.0, 110.0, 120.0])),
    ])
    .unwrap();
    let t = Trajectory::new(frame, &RoleOverrides::default()).unwrap();
    let names: Vec<&str> = t.frame().column_names().collect();
    assert_eq!(names, vec!["geometry"]);
    assert_eq!(t.len(), 3);
}

#[test]
fn test_explicit_overrides() {
    let frame = Frame::from_columns([
        ("y_deg", Column::from(vec![10.0, 20.0])),
        ("x_deg", Column::from(vec![100.0, 110.0])),
        ("fl", Column::from(vec![300.0, 310.0])),
    ])
    .unwrap();
    let overrides = RoleOverrides::default()
        .latitude("y_deg")
        .longitude("x_deg")
        .altitude("fl")
        .heading("missing");
    let t = Trajectory::new(frame, &overrides).unwrap();
    assert_eq!(t.points()[1].x(), 110.0);
    assert_eq!(t.roles().altitude.as_deref(), Some("fl"));
    assert_eq!(t.roles().heading, None);
}

#[test]
fn test_ambiguous_latitude_is_rejected() {
    let mut frame = raw_track(&[0, 1], &["AFR1"; 2]);
    frame.push_column("lat", Column::from(vec![0.0, 0.0])).unwrap();
    let err = Trajectory::new(frame, &RoleOverrides::default()).unwrap_err();
    assert_eq!(
        err,
        FlightError::AmbiguousRole {
            role: Role::Latitude,
            column: "lat".into(),
            count: 2
        }
    );
}

#[test]
fn test_from_csv() {
    let data = "\
timestamp,icao24,latitude,longitude,geoaltitude,heading
1700000000,abc123,48.0,2.0,1000,90
1700000010,abc123,48.1,2.1,1100,91
";
    let options = CsvOptions::default().index_column("timestamp").time_index(true);
    let frame = Frame::from_csv_reader(data.as_bytes(), &options).unwrap();
    let t = Trajectory::new(frame, &RoleOverrides::default()).unwrap();

    assert!(t.index().is_time());
    assert_eq!(t.roles().altitude.as_deref(), Some("geoaltitude"));
    assert_eq!(t.roles().heading.as_deref(), Some("heading"));
    assert_eq!(t.altitude().unwrap(), &Column::Int(vec![1000, 1100]));
    assert!(t.to_string().contains("abc123"));
}
