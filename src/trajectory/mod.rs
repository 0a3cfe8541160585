//! # Trajectory
//!
//! A [`Trajectory`] is one time-ordered sequence of positioned samples: a
//! [`Frame`] holding exactly one geometry column of 2D points, the reference
//! system of those points ([`Crs`]) and the optional role bindings
//! ([`RoleBinding`]) of its attribute columns.
//!
//! Construction
//! -----------------
//! Three input shapes are accepted (see [`Trajectory::new`]):
//!
//! 1. **Raw table** ([`Trajectory::from_table`]): latitude and longitude are
//!    required (explicit override or synonym auto-detection). Both columns are
//!    consumed into a `"geometry"` point column tagged [`Crs::Geographic`].
//! 2. **Geometric table** ([`Trajectory::from_geometric`]): the table must hold
//!    exactly one geometry column; latitude/longitude are not touched.
//! 3. **Another trajectory** ([`Trajectory::from_trajectory`]): each optional
//!    role defaults to the source binding unless overridden.
//!
//! In every case the optional roles (altitude, altitude rate, velocity,
//! heading) are resolved with [`resolve_role`] and never required.
//!
//! Finalize
//! -----------------
//! Every operation that yields a new trajectory goes through one routine which
//! re-validates the role bindings against the new column set: a binding
//! survives only if its column is present **exactly once**. A dropped,
//! duplicated or renamed column therefore leaves its role unbound, and the
//! matching accessor (e.g. [`Trajectory::altitude`]) fails with
//! [`FlightError::RoleNotConfigured`].
//!
//! Column projections ([`Trajectory::select`], [`Trajectory::drop_columns`], …)
//! return a [`Selection`]: the richer trajectory type is kept only when the
//! geometry column survives exactly once, otherwise the plain [`Frame`] is
//! returned.
//!
//! Example
//! -----------------
//! ```rust
//! use flightframe::frame::{Column, Frame};
//! use flightframe::roles::RoleOverrides;
//! use flightframe::trajectory::Trajectory;
//!
//! let frame = Frame::from_columns([
//!     ("lat", Column::from(vec![10.0, 20.0, 30.0])),
//!     ("lon", Column::from(vec![100.0, 110.0, 120.0])),
//!     ("alt", Column::from(vec![1000.0, 2000.0, 3000.0])),
//! ])?;
//! let trajectory = Trajectory::new(frame, &RoleOverrides::default())?;
//!
//! assert!(!trajectory.frame().contains("lat"));
//! assert_eq!(trajectory.roles().altitude.as_deref(), Some("alt"));
//! assert_eq!(trajectory.coordinates(true)?.shape(), (3, 3));
//! # Ok::<(), flightframe::FlightError>(())
//! ```
use std::fmt;

use geo::{Coord, LineString, Point};
use log::debug;
use nalgebra::DMatrix;

use crate::collection::{GroupOptions, GroupSpec, TrajectoryCollection};
use crate::constants::GEOMETRY_COLUMN;
use crate::crs::{Crs, Reproject};
use crate::distance::SequenceDistance;
use crate::flight_errors::FlightError;
use crate::frame::{Column, DType, Frame, RowIndex};
use crate::roles::{resolve_role, Role, RoleBinding, RoleOverrides};

pub mod resample;

pub use resample::Interpolation;

/// Input accepted by [`Trajectory::new`].
#[derive(Debug, Clone)]
pub enum TrajectoryInput {
    Table(Frame),
    Trajectory(Trajectory),
}

impl From<Frame> for TrajectoryInput {
    fn from(frame: Frame) -> Self {
        TrajectoryInput::Table(frame)
    }
}

impl From<Trajectory> for TrajectoryInput {
    fn from(trajectory: Trajectory) -> Self {
        TrajectoryInput::Trajectory(trajectory)
    }
}

/// Result of a column projection.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// The geometry column survived exactly once.
    Trajectory(Trajectory),
    /// Anything else.
    Frame(Frame),
}

impl Selection {
    pub fn is_trajectory(&self) -> bool {
        matches!(self, Selection::Trajectory(_))
    }

    pub fn into_trajectory(self) -> Option<Trajectory> {
        match self {
            Selection::Trajectory(t) => Some(t),
            Selection::Frame(_) => None,
        }
    }

    pub fn into_frame(self) -> Frame {
        match self {
            Selection::Trajectory(t) => t.frame,
            Selection::Frame(f) => f,
        }
    }

    pub fn frame(&self) -> &Frame {
        match self {
            Selection::Trajectory(t) => &t.frame,
            Selection::Frame(f) => f,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    frame: Frame,
    geometry: String,
    crs: Crs,
    roles: RoleBinding,
}

/// Name of the single geometry column of `frame`.
fn single_geometry(frame: &Frame) -> Result<String, FlightError> {
    match frame.geometry_columns().as_slice() {
        [] => Err(FlightError::MissingGeometry),
        [name] => Ok(name.to_string()),
        many => Err(FlightError::AmbiguousGeometry(many.len())),
    }
}

impl Trajectory {
    /// Build a trajectory from a table or from another trajectory.
    ///
    /// A table without any geometry column goes through [`Trajectory::from_table`],
    /// a table with geometry through [`Trajectory::from_geometric`], and a
    /// trajectory through [`Trajectory::from_trajectory`].
    pub fn new(input: impl Into<TrajectoryInput>, overrides: &RoleOverrides) -> Result<Self, FlightError> {
        match input.into() {
            TrajectoryInput::Table(frame) if frame.geometry_columns().is_empty() => {
                Self::from_table(frame, overrides)
            }
            TrajectoryInput::Table(frame) => Self::from_geometric(frame, overrides),
            TrajectoryInput::Trajectory(source) => Self::from_trajectory(&source, overrides),
        }
    }

    /// Build a trajectory from raw tabular data.
    ///
    /// Arguments
    /// -----------------
    /// * `frame` – Table holding latitude and longitude columns in degrees.
    /// * `overrides` – Explicit column names; unset roles are auto-detected.
    ///
    /// Return
    /// ----------
    /// * A trajectory whose latitude/longitude columns are replaced by a
    ///   `"geometry"` point column (x = longitude, y = latitude) in
    ///   [`Crs::Geographic`].
    /// * [`FlightError::MissingRequiredRole`] or [`FlightError::AmbiguousRole`]
    ///   if latitude or longitude cannot be bound.
    pub fn from_table(frame: Frame, overrides: &RoleOverrides) -> Result<Self, FlightError> {
        let lat_name = Self::required_column(&frame, Role::Latitude, overrides)?;
        let lon_name = Self::required_column(&frame, Role::Longitude, overrides)?;
        let lat = frame.column(&lat_name)?.to_f64(&lat_name)?;
        let lon = frame.column(&lon_name)?.to_f64(&lon_name)?;

        let points: Vec<Point<f64>> = lon
            .iter()
            .zip(&lat)
            .map(|(&x, &y)| Point::new(x, y))
            .collect();

        let mut frame = frame.drop_columns(&[lat_name.as_str(), lon_name.as_str()]);
        frame.insert_column(GEOMETRY_COLUMN, Column::Geometry(points))?;
        Self::assemble(frame, Crs::Geographic, overrides, &RoleBinding::default())
    }

    fn required_column(frame: &Frame, role: Role, overrides: &RoleOverrides) -> Result<String, FlightError> {
        resolve_role(frame.column_names(), role, overrides.get(role), None, true)?
            .ok_or(FlightError::MissingRequiredRole(role))
    }

    /// Build a trajectory from a table that already holds one geometry column,
    /// assumed to be in [`Crs::Geographic`] (see [`Trajectory::with_crs`]).
    pub fn from_geometric(frame: Frame, overrides: &RoleOverrides) -> Result<Self, FlightError> {
        Self::assemble(frame, Crs::Geographic, overrides, &RoleBinding::default())
    }

    /// Build a trajectory from another one, inheriting its role bindings
    /// unless `overrides` names another column.
    pub fn from_trajectory(source: &Trajectory, overrides: &RoleOverrides) -> Result<Self, FlightError> {
        Self::assemble(source.frame.clone(), source.crs, overrides, &source.roles)
    }

    fn assemble(
        frame: Frame,
        crs: Crs,
        overrides: &RoleOverrides,
        prior: &RoleBinding,
    ) -> Result<Self, FlightError> {
        let geometry = single_geometry(&frame)?;
        let mut roles = RoleBinding::default();
        for role in Role::OPTIONAL {
            let bound = resolve_role(frame.column_names(), role, overrides.get(role), prior.get(role), false)?;
            roles.set(role, bound);
        }
        debug!("Trajectory built with {} rows, roles {:?}", frame.len(), roles);
        Ok(Trajectory {
            frame,
            geometry,
            crs,
            roles,
        }
        .finalize())
    }

    /// Re-validate role bindings against the current column set.
    fn finalize(mut self) -> Self {
        self.roles.revalidate(self.frame.column_names());
        self
    }

    /// Wrap a frame with the same row structure (geometry untouched).
    fn with_frame(&self, frame: Frame) -> Trajectory {
        Trajectory {
            frame,
            geometry: self.geometry.clone(),
            crs: self.crs,
            roles: self.roles.clone(),
        }
        .finalize()
    }

    /// Wrap a frame whose columns may differ from ours.
    fn derive(&self, frame: Frame, geometry: &str) -> Selection {
        let is_point = frame
            .column(geometry)
            .map(|c| c.dtype() == DType::Geometry)
            .unwrap_or(false);
        if !is_point || frame.geometry_columns().len() != 1 {
            return Selection::Frame(frame);
        }
        Selection::Trajectory(
            Trajectory {
                frame,
                geometry: geometry.to_string(),
                crs: self.crs,
                roles: self.roles.clone(),
            }
            .finalize(),
        )
    }

    /// Tag the geometry with another reference system without transforming it.
    pub fn with_crs(mut self, crs: Crs) -> Self {
        self.crs = crs;
        self
    }

    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    pub fn into_frame(self) -> Frame {
        self.frame
    }

    pub fn index(&self) -> &RowIndex {
        self.frame.index()
    }

    pub fn crs(&self) -> Crs {
        self.crs
    }

    pub fn roles(&self) -> &RoleBinding {
        &self.roles
    }

    /// Name of the geometry column.
    pub fn geometry_column(&self) -> &str {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.frame.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }

    pub fn column(&self, name: &str) -> Result<&Column, FlightError> {
        self.frame.column(name)
    }

    /// Sample positions, in row order.
    pub fn points(&self) -> &[Point<f64>] {
        self.frame
            .column(&self.geometry)
            .ok()
            .and_then(Column::as_points)
            .unwrap_or(&[])
    }

    fn role_column(&self, role: Role) -> Result<&Column, FlightError> {
        let name = self
            .roles
            .get(role)
            .ok_or(FlightError::RoleNotConfigured(role))?;
        self.frame.column(name)
    }

    pub fn altitude(&self) -> Result<&Column, FlightError> {
        self.role_column(Role::Altitude)
    }

    pub fn altitude_rate(&self) -> Result<&Column, FlightError> {
        self.role_column(Role::AltitudeRate)
    }

    pub fn velocity(&self) -> Result<&Column, FlightError> {
        self.role_column(Role::Velocity)
    }

    pub fn heading(&self) -> Result<&Column, FlightError> {
        self.role_column(Role::Heading)
    }

    /// Coordinates as an `N × 2` matrix of `(x, y)`, or `N × 3` with the bound
    /// altitude column as `z`.
    ///
    /// Return
    /// ----------
    /// * The matrix, or [`FlightError::RoleNotConfigured`] when altitude is
    ///   requested but unbound.
    pub fn coordinates(&self, include_altitude: bool) -> Result<DMatrix<f64>, FlightError> {
        let points = self.points();
        if !include_altitude {
            return Ok(DMatrix::from_fn(points.len(), 2, |i, j| match j {
                0 => points[i].x(),
                _ => points[i].y(),
            }));
        }

        let name = self
            .roles
            .get(Role::Altitude)
            .ok_or(FlightError::RoleNotConfigured(Role::Altitude))?;
        let z = self.frame.column(name)?.to_f64(name)?;
        Ok(DMatrix::from_fn(points.len(), 3, |i, j| match j {
            0 => points[i].x(),
            1 => points[i].y(),
            _ => z[i],
        }))
    }

    /// Path through every sample in row order; `None` below two samples.
    pub fn as_linestring(&self) -> Option<LineString<f64>> {
        self.as_linestring_segment(0, self.len())
    }

    /// Path through the rows `[start, end)` (clamped); `None` below two samples.
    pub fn as_linestring_segment(&self, start: usize, end: usize) -> Option<LineString<f64>> {
        let points = self.points();
        let end = end.min(points.len());
        let start = start.min(end);
        if end - start < 2 {
            return None;
        }
        Some(LineString::from(
            points[start..end]
                .iter()
                .map(|p| Coord { x: p.x(), y: p.y() })
                .collect::<Vec<_>>(),
        ))
    }

    /// Snap every coordinate to a grid of size `grid`, in place.
    ///
    /// A non-positive grid leaves the coordinates untouched. Storage shared
    /// with other frames is copied first.
    pub fn set_precision(&mut self, grid: f64) -> &mut Self {
        if grid <= 0.0 || !grid.is_finite() {
            return self;
        }
        let snap = |v: f64| (v / grid).round() * grid;
        if let Some(points) = self
            .frame
            .column_mut(&self.geometry)
            .ok()
            .and_then(Column::as_points_mut)
        {
            for p in points.iter_mut() {
                *p = Point::new(snap(p.x()), snap(p.y()));
            }
        }
        self
    }

    /// Keep the listed columns (see [`Frame::select`]).
    pub fn select(&self, names: &[&str]) -> Result<Selection, FlightError> {
        Ok(self.derive(self.frame.select(names)?, &self.geometry))
    }

    pub fn drop_columns(&self, names: &[&str]) -> Selection {
        self.derive(self.frame.drop_columns(names), &self.geometry)
    }

    /// Rename every column called `from`; renaming the geometry column moves it.
    pub fn rename_column(&self, from: &str, to: &str) -> Result<Selection, FlightError> {
        let frame = self.frame.rename_column(from, to)?;
        let geometry = if from == self.geometry { to } else { self.geometry.as_str() };
        Ok(self.derive(frame, geometry))
    }

    /// Append the columns of `other` (duplicates allowed).
    pub fn hconcat(&self, other: &Frame) -> Result<Selection, FlightError> {
        Ok(self.derive(self.frame.hconcat(other)?, &self.geometry))
    }

    /// Assign a column in place and re-validate the role bindings.
    ///
    /// The geometry column can only be replaced by another geometry column.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), FlightError> {
        let name = name.into();
        if name == self.geometry && column.dtype() != DType::Geometry {
            return Err(FlightError::ColumnTypeMismatch {
                column: name,
                expected: "geometry",
                found: column.dtype().name(),
            });
        }
        self.frame.insert_column(name, column)?;
        self.roles.revalidate(self.frame.column_names());
        Ok(())
    }

    pub fn take(&self, rows: &[usize]) -> Trajectory {
        self.with_frame(self.frame.take(rows))
    }

    pub fn slice(&self, start: usize, end: usize) -> Trajectory {
        self.with_frame(self.frame.slice(start, end))
    }

    pub fn head(&self, n: usize) -> Trajectory {
        self.with_frame(self.frame.head(n))
    }

    pub fn filter(&self, mask: &[bool]) -> Result<Trajectory, FlightError> {
        Ok(self.with_frame(self.frame.filter(mask)?))
    }

    pub fn sort_by_index(&self) -> Trajectory {
        self.with_frame(self.frame.sort_by_index())
    }

    /// Move a column into the row index as epochs (see [`Frame::set_time_index`]).
    pub fn set_time_index(&self, name: &str) -> Result<Trajectory, FlightError> {
        Ok(self.with_frame(self.frame.set_time_index(name)?))
    }

    /// Stack trajectories vertically.
    ///
    /// All parts must share the geometry column name, the reference system and
    /// the column layout. Role bindings come from the first part.
    pub fn concat(parts: &[&Trajectory]) -> Result<Trajectory, FlightError> {
        let Some(first) = parts.first() else {
            return Err(FlightError::IncompatibleFrames(
                "cannot concatenate zero trajectories".into(),
            ));
        };
        if let Some(other) = parts.iter().find(|p| p.crs != first.crs || p.geometry != first.geometry) {
            return Err(FlightError::IncompatibleFrames(format!(
                "geometry '{}' in {} vs '{}' in {}",
                first.geometry, first.crs, other.geometry, other.crs
            )));
        }
        let frames: Vec<&Frame> = parts.iter().map(|p| &p.frame).collect();
        Ok(first.with_frame(Frame::concat(&frames)?))
    }

    /// Group the rows into a [`TrajectoryCollection`].
    pub fn group_by(&self, spec: GroupSpec, options: GroupOptions) -> Result<TrajectoryCollection, FlightError> {
        TrajectoryCollection::new(self.clone(), spec, options)
    }

    /// Transform the geometry into another reference system.
    ///
    /// Arguments
    /// -----------------
    /// * `target` – Reference system of the result.
    /// * `projection` – Point transformation; not called when `target` is the
    ///   current system.
    pub fn to_crs(&self, target: Crs, projection: &impl Reproject) -> Result<Trajectory, FlightError> {
        if target == self.crs {
            return Ok(self.clone());
        }
        let projected = projection.reproject(self.crs, target, self.points())?;
        if projected.len() != self.len() {
            return Err(FlightError::Reprojection(format!(
                "expected {} points from {} to {target}, got {}",
                self.len(),
                self.crs,
                projected.len()
            )));
        }
        let mut out = self.clone();
        out.frame.insert_column(self.geometry.clone(), Column::Geometry(projected))?;
        out.crs = target;
        Ok(out)
    }

    /// [`Trajectory::to_crs`] to geographic degrees (EPSG:4326).
    pub fn to_latlon(&self, projection: &impl Reproject) -> Result<Trajectory, FlightError> {
        self.to_crs(Crs::Geographic, projection)
    }

    /// [`Trajectory::to_crs`] to Web Mercator metres (EPSG:3857).
    pub fn to_xy(&self, projection: &impl Reproject) -> Result<Trajectory, FlightError> {
        self.to_crs(Crs::WebMercator, projection)
    }

    /// Distance between the x/y coordinate sequences of two trajectories.
    pub fn distance(&self, other: &Trajectory, engine: &impl SequenceDistance) -> Result<f64, FlightError> {
        Ok(engine.distance(&self.coordinates(false)?, &other.coordinates(false)?))
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Trajectory ({}, geometry '{}')", self.crs, self.geometry)?;
        write!(f, "{}", self.frame)
    }
}
