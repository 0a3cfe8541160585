//! # Trajectory collections
//!
//! A [`TrajectoryCollection`] partitions the rows of one backing
//! [`Trajectory`] into groups identified by a [`GroupKey`]. It is a partition
//! descriptor: the groups store row positions, and each member trajectory is
//! materialized on access with [`Trajectory::take`] (sharing nothing mutable
//! with the backing data).
//!
//! Grouping
//! -----------------
//! A [`GroupSpec`] names what the key is made of:
//!
//! * `Keys(names)` – one or more columns. A name that is both a data column and
//!   the row-index name is read from the column; a name that is only the index
//!   name is read from the index. An empty list is a usage error.
//! * `Level` – the row index itself.
//! * `Series { name, values }` – a precomputed per-row key, stored as a column
//!   called `name` and then treated as `Keys([name])`.
//!
//! With [`GroupOptions::dropna`] (default) rows with a missing key value are
//! left out of every group; otherwise they form groups keyed by
//! [`KeyValue::Null`].
//!
//! Order
//! -----------------
//! Groups are kept in **discovery order** (first row of each group) unless
//! [`GroupOptions::sort`] is set, in which case they are sorted by key.
//! Iteration and ordinal access ([`TrajectoryCollection::nth`]) use the same
//! order, and it never changes for a given collection value.
//!
//! Per-group transformations
//! -----------------
//! [`resample`](TrajectoryCollection::resample),
//! [`set_precision`](TrajectoryCollection::set_precision) and
//! [`to_crs`](TrajectoryCollection::to_crs) apply the trajectory-level
//! operation to every group, concatenate the results and regroup them with the
//! same keys.
//!
//! ```rust
//! use flightframe::collection::{GroupOptions, GroupSpec};
//! use flightframe::frame::{Column, Frame};
//! use flightframe::roles::RoleOverrides;
//! use flightframe::trajectory::Trajectory;
//!
//! let frame = Frame::from_columns([
//!     ("icao24", Column::from(vec!["a", "b", "a"])),
//!     ("lat", Column::from(vec![1.0, 2.0, 3.0])),
//!     ("lon", Column::from(vec![1.0, 2.0, 3.0])),
//! ])?;
//! let flights = Trajectory::new(frame, &RoleOverrides::default())?
//!     .group_by(GroupSpec::keys(["icao24"]), GroupOptions::default())?;
//!
//! assert_eq!(flights.len(), 2);
//! assert_eq!(flights.flight("a")?.len(), 2);
//! assert_eq!(flights.nth(1)?.len(), 1);
//! # Ok::<(), flightframe::FlightError>(())
//! ```
use std::collections::HashMap;

use ahash::RandomState;
use geo::LineString;
use hifitime::Duration;
use log::debug;
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::crs::{Crs, Reproject};
use crate::distance::SequenceDistance;
use crate::flight_errors::FlightError;
use crate::frame::Column;
use crate::trajectory::{Interpolation, Trajectory};

pub mod key;

pub use key::{GroupKey, KeyValue};

/// What a collection is grouped by.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupSpec {
    Keys(Vec<String>),
    Level,
    Series { name: String, values: Column },
}

impl GroupSpec {
    /// `Keys` from any list of names.
    pub fn keys<S: Into<String>>(names: impl IntoIterator<Item = S>) -> Self {
        GroupSpec::Keys(names.into_iter().map(Into::into).collect())
    }

    /// Names of the key columns, `None` when grouping by the index.
    pub fn key_names(&self) -> Option<&[String]> {
        match self {
            GroupSpec::Keys(names) => Some(names),
            GroupSpec::Level | GroupSpec::Series { .. } => None,
        }
    }
}

/// Grouping options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupOptions {
    /// Sort groups by key instead of keeping discovery order.
    pub sort: bool,
    /// Leave out rows whose key has a missing value.
    pub dropna: bool,
}

impl Default for GroupOptions {
    fn default() -> Self {
        GroupOptions {
            sort: false,
            dropna: true,
        }
    }
}

impl GroupOptions {
    pub fn sort(mut self, v: bool) -> Self {
        self.sort = v;
        self
    }
    pub fn dropna(mut self, v: bool) -> Self {
        self.dropna = v;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Group {
    key: GroupKey,
    rows: Vec<usize>,
}

/// Where one component of a key is read from.
enum KeySource<'a> {
    Column(&'a Column),
    Index,
}

#[derive(Debug, Clone)]
pub struct TrajectoryCollection {
    data: Trajectory,
    spec: GroupSpec,
    options: GroupOptions,
    groups: Vec<Group>,
    lookup: HashMap<GroupKey, usize, RandomState>,
}

impl PartialEq for TrajectoryCollection {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
            && self.spec == other.spec
            && self.options == other.options
            && self.groups == other.groups
    }
}

impl TrajectoryCollection {
    /// Group the rows of `data`.
    ///
    /// Arguments
    /// -----------------
    /// * `data` – Backing trajectory.
    /// * `spec` – Key columns, the index level, or a per-row key series.
    /// * `options` – Ordering and missing-key policy.
    ///
    /// Return
    /// ----------
    /// * The collection, or
    ///   - [`FlightError::MissingGroupKeys`] for an empty key list,
    ///   - [`FlightError::ColumnNotFound`] for a key that is neither a column nor
    ///     the index name,
    ///   - [`FlightError::LengthMismatch`] for a key series of the wrong length.
    pub fn new(mut data: Trajectory, spec: GroupSpec, options: GroupOptions) -> Result<Self, FlightError> {
        let spec = match spec {
            GroupSpec::Keys(names) if names.is_empty() => return Err(FlightError::MissingGroupKeys),
            GroupSpec::Series { name, values } => {
                data.insert_column(name.clone(), values)?;
                GroupSpec::Keys(vec![name])
            }
            other => other,
        };

        let groups = Self::partition(&data, &spec, options)?;
        let lookup = groups
            .iter()
            .enumerate()
            .map(|(i, g)| (g.key.clone(), i))
            .collect();
        debug!("Grouped {} rows into {} groups", data.len(), groups.len());

        Ok(TrajectoryCollection {
            data,
            spec,
            options,
            groups,
            lookup,
        })
    }

    fn key_sources<'a>(data: &'a Trajectory, spec: &GroupSpec) -> Result<Vec<KeySource<'a>>, FlightError> {
        let Some(names) = spec.key_names() else {
            return Ok(vec![KeySource::Index]);
        };
        names
            .iter()
            .map(|name| {
                if data.frame().contains(name) {
                    let column = data.column(name)?;
                    if column.as_points().is_some() {
                        return Err(FlightError::ColumnTypeMismatch {
                            column: name.clone(),
                            expected: "int, float or text",
                            found: "geometry",
                        });
                    }
                    Ok(KeySource::Column(column))
                } else if data.index().name() == Some(name.as_str()) {
                    Ok(KeySource::Index)
                } else {
                    Err(FlightError::ColumnNotFound(name.clone()))
                }
            })
            .collect()
    }

    fn partition(data: &Trajectory, spec: &GroupSpec, options: GroupOptions) -> Result<Vec<Group>, FlightError> {
        let sources = Self::key_sources(data, spec)?;
        let mut slots: HashMap<GroupKey, usize, RandomState> = HashMap::default();
        let mut groups: Vec<Group> = Vec::new();

        'rows: for row in 0..data.len() {
            let mut values: SmallVec<[KeyValue; 2]> = SmallVec::with_capacity(sources.len());
            for source in &sources {
                let value = match source {
                    KeySource::Column(column) => column.key_at(row),
                    KeySource::Index => Some(data.index().key_at(row)),
                };
                match value {
                    Some(v) => values.push(v),
                    None if options.dropna => continue 'rows,
                    None => values.push(KeyValue::Null),
                }
            }

            let key = GroupKey(values);
            match slots.get(&key) {
                Some(&slot) => groups[slot].rows.push(row),
                None => {
                    slots.insert(key.clone(), groups.len());
                    groups.push(Group {
                        key,
                        rows: vec![row],
                    });
                }
            }
        }

        if options.sort {
            groups.sort_by(|a, b| a.key.cmp(&b.key));
        }
        Ok(groups)
    }

    /// Backing trajectory.
    pub fn data(&self) -> &Trajectory {
        &self.data
    }

    pub fn spec(&self) -> &GroupSpec {
        &self.spec
    }

    pub fn options(&self) -> GroupOptions {
        self.options
    }

    /// Number of groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &GroupKey> + '_ {
        self.groups.iter().map(|g| &g.key)
    }

    /// Row count of every group, in group order.
    pub fn group_sizes(&self) -> Vec<(GroupKey, usize)> {
        self.groups
            .iter()
            .map(|g| (g.key.clone(), g.rows.len()))
            .collect()
    }

    /// Rows of the backing trajectory belonging to `key`.
    pub fn rows(&self, key: &GroupKey) -> Option<&[usize]> {
        self.lookup.get(key).map(|&i| self.groups[i].rows.as_slice())
    }

    /// `(key, trajectory)` pairs in group order. Can be called any number of times.
    pub fn iter(&self) -> impl Iterator<Item = (&GroupKey, Trajectory)> + '_ {
        self.groups
            .iter()
            .map(|g| (&g.key, self.data.take(&g.rows)))
    }

    /// The trajectory of the group with exactly this key.
    pub fn flight(&self, key: impl Into<GroupKey>) -> Result<Trajectory, FlightError> {
        let key = key.into();
        let rows = self
            .rows(&key)
            .ok_or_else(|| FlightError::GroupNotFound(key.to_string()))?;
        Ok(self.data.take(rows))
    }

    /// The trajectory of the `index`-th group in group order.
    pub fn nth(&self, index: usize) -> Result<Trajectory, FlightError> {
        let group = self
            .groups
            .get(index)
            .ok_or(FlightError::GroupIndexOutOfRange {
                index,
                len: self.groups.len(),
            })?;
        Ok(self.data.take(&group.rows))
    }

    /// Pairwise distances between the groups, in group order.
    ///
    /// Return
    /// ----------
    /// * An `N × N` symmetric matrix with zero diagonal, or
    ///   [`FlightError::RoleNotConfigured`] if `include_altitude` is set and
    ///   altitude is unbound.
    pub fn distance_matrix(
        &self,
        include_altitude: bool,
        engine: &impl SequenceDistance,
    ) -> Result<DMatrix<f64>, FlightError> {
        let sequences = self
            .iter()
            .map(|(_, t)| t.coordinates(include_altitude))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(engine.distance_matrix(&sequences))
    }

    /// Path of every group; `None` for groups with fewer than two rows.
    pub fn as_linestrings(&self) -> Vec<(GroupKey, Option<LineString<f64>>)> {
        self.iter()
            .map(|(key, t)| (key.clone(), t.as_linestring()))
            .collect()
    }

    /// Apply `f` to every group, concatenate the results and regroup them with
    /// the same keys and options.
    pub fn map_groups<F>(&self, mut f: F) -> Result<TrajectoryCollection, FlightError>
    where
        F: FnMut(&GroupKey, Trajectory) -> Result<Trajectory, FlightError>,
    {
        let parts = self
            .iter()
            .map(|(key, t)| f(key, t))
            .collect::<Result<Vec<_>, _>>()?;
        if parts.is_empty() {
            return Ok(self.clone());
        }
        let refs: Vec<&Trajectory> = parts.iter().collect();
        let data = Trajectory::concat(&refs)?;
        TrajectoryCollection::new(data, self.spec.clone(), self.options)
    }

    /// Resample every group (see [`Trajectory::resample`]).
    ///
    /// Key columns are excluded from aggregation and restored with the group key
    /// value. Grouping by the index level is not supported since the index is
    /// the time axis being resampled.
    pub fn resample(&self, freq: Duration, method: Interpolation) -> Result<TrajectoryCollection, FlightError> {
        let Some(names) = self.spec.key_names() else {
            return Err(FlightError::Unsupported(
                "resampling a collection grouped by its time index".into(),
            ));
        };
        if !self.data.index().is_time() {
            return Err(FlightError::NonTimeIndex("resample"));
        }

        self.map_groups(|key, trajectory| {
            let mut resampled = trajectory.resample(freq, method)?;
            for (name, value) in names.iter().zip(key.values()) {
                if resampled.frame().contains(name) {
                    let column = Column::repeat_key(value, resampled.len())?;
                    resampled.insert_column(name.clone(), column)?;
                }
            }
            Ok(resampled)
        })
    }

    /// Snap the coordinates of every group to a grid of size `grid`.
    pub fn set_precision(&self, grid: f64) -> Result<TrajectoryCollection, FlightError> {
        self.map_groups(|_, mut trajectory| {
            trajectory.set_precision(grid);
            Ok(trajectory)
        })
    }

    pub fn to_crs(&self, target: Crs, projection: &impl Reproject) -> Result<TrajectoryCollection, FlightError> {
        self.map_groups(|_, trajectory| trajectory.to_crs(target, projection))
    }

    pub fn to_latlon(&self, projection: &impl Reproject) -> Result<TrajectoryCollection, FlightError> {
        self.to_crs(Crs::Geographic, projection)
    }

    pub fn to_xy(&self, projection: &impl Reproject) -> Result<TrajectoryCollection, FlightError> {
        self.to_crs(Crs::WebMercator, projection)
    }
}
