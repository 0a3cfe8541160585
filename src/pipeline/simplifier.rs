//! # Path simplification with row recovery
//!
//! [`RdpSimplifier`] reduces the path of a trajectory to fewer vertices with
//! Ramer–Douglas–Peucker ([`geo::SimplifyIdx`]); `tolerance` is a distance in
//! coordinate units.
//!
//! With `preserve_topology`, the simplified path is checked for crossings
//! between non-adjacent segments. Every crossing segment that replaced
//! original vertices gets them back, and the check is repeated until no such
//! crossing is left. A path that already crosses itself keeps its original
//! crossings.
//!
//! Output modes
//! -----------------
//! * **Rows** (default): each simplified vertex is mapped back to the nearest
//!   original sample (R-tree search, `nearest` feature) and that row is kept.
//!   The result has one row per vertex, in vertex order; a row selected twice
//!   is kept twice. A trajectory with fewer than two samples is returned
//!   unchanged.
//! * **Geometry**: the simplified path itself (`None` below two samples). This
//!   step is terminal in a [`Pipeline`](super::Pipeline).
//!
//! Row recovery needs the nearest-neighbour capability; [`RdpSimplifier::new`]
//! fails with [`FlightError::MissingCapability`] when it is not available.
use geo::{Coord, Intersects, Line, LineString, SimplifyIdx};
use log::debug;
use serde::{Deserialize, Serialize};

use super::{PipelineData, Step};
use crate::capabilities::Capabilities;
use crate::collection::{GroupKey, TrajectoryCollection};
use crate::flight_errors::FlightError;
use crate::trajectory::Trajectory;

/// What the simplifier returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimplifyOutput {
    /// Original rows nearest to the simplified vertices.
    #[default]
    Rows,
    /// The simplified path only.
    Geometry,
}

/// Parameters of [`RdpSimplifier`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimplifyParams {
    /// Distance threshold, in coordinate units.
    pub tolerance: f64,
    /// Never introduce self-intersections.
    pub preserve_topology: bool,
    pub output: SimplifyOutput,
}

impl Default for SimplifyParams {
    fn default() -> Self {
        SimplifyParams {
            tolerance: 0.0,
            preserve_topology: true,
            output: SimplifyOutput::Rows,
        }
    }
}

impl SimplifyParams {
    pub fn builder() -> SimplifyParamsBuilder {
        SimplifyParamsBuilder::new()
    }
}

/// Builder for [`SimplifyParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct SimplifyParamsBuilder {
    params: SimplifyParams,
}

impl SimplifyParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: SimplifyParams::default(),
        }
    }

    pub fn tolerance(mut self, v: f64) -> Self {
        self.params.tolerance = v;
        self
    }
    pub fn preserve_topology(mut self, v: bool) -> Self {
        self.params.preserve_topology = v;
        self
    }
    pub fn output(mut self, v: SimplifyOutput) -> Self {
        self.params.output = v;
        self
    }
    /// Shorthand for `output(SimplifyOutput::Geometry)` when `v` is true.
    pub fn output_geometry(self, v: bool) -> Self {
        self.output(if v {
            SimplifyOutput::Geometry
        } else {
            SimplifyOutput::Rows
        })
    }

    /// Validate and return the parameters.
    ///
    /// Return
    /// ----------
    /// * The parameters, or [`FlightError::InvalidParameter`] if the tolerance is
    ///   negative or not finite.
    pub fn build(self) -> Result<SimplifyParams, FlightError> {
        let p = self.params;
        if !p.tolerance.is_finite() || p.tolerance < 0.0 {
            return Err(FlightError::InvalidParameter(format!(
                "tolerance must be finite and >= 0, got {}",
                p.tolerance
            )));
        }
        Ok(p)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RdpSimplifier {
    params: SimplifyParams,
}

impl RdpSimplifier {
    /// Create a simplifier.
    ///
    /// Arguments
    /// -----------------
    /// * `params` – Tolerance, topology flag and output mode.
    /// * `capabilities` – Available optional capabilities, usually
    ///   [`Capabilities::detect`].
    ///
    /// Return
    /// ----------
    /// * The simplifier, or [`FlightError::MissingCapability`] when row output
    ///   is requested without nearest-neighbour support.
    pub fn new(params: SimplifyParams, capabilities: &Capabilities) -> Result<Self, FlightError> {
        let nearest = capabilities.nearest_neighbor && cfg!(feature = "nearest");
        if params.output == SimplifyOutput::Rows && !nearest {
            return Err(FlightError::MissingCapability(
                "nearest-neighbour search is required to recover rows; enable the `nearest` feature or request geometry output",
            ));
        }
        Ok(RdpSimplifier { params })
    }

    pub fn params(&self) -> &SimplifyParams {
        &self.params
    }

    fn simplify_line(&self, line: &LineString<f64>) -> LineString<f64> {
        let mut kept = line.simplify_idx(&self.params.tolerance);
        if self.params.preserve_topology {
            kept = restore_crossings(&line.0, kept);
        }
        LineString::from(kept.into_iter().map(|i| line.0[i]).collect::<Vec<_>>())
    }

    /// Simplified path of a trajectory; `None` below two samples.
    pub fn simplify_path(&self, trajectory: &Trajectory) -> Option<LineString<f64>> {
        trajectory.as_linestring().map(|line| self.simplify_line(&line))
    }

    /// Simplified path of every group.
    pub fn simplify_paths(&self, collection: &TrajectoryCollection) -> Vec<(GroupKey, Option<LineString<f64>>)> {
        collection
            .iter()
            .map(|(key, t)| (key.clone(), self.simplify_path(&t)))
            .collect()
    }

    /// Rows of `trajectory` nearest to the vertices of its simplified path.
    pub fn simplify(&self, trajectory: &Trajectory) -> Result<Trajectory, FlightError> {
        let Some(path) = self.simplify_path(trajectory) else {
            return Ok(trajectory.clone());
        };
        let rows = nearest_rows(trajectory, &path.0)?;
        debug!(
            "Simplified {} samples to {} vertices",
            trajectory.len(),
            rows.len()
        );
        Ok(trajectory.take(&rows))
    }

    /// [`RdpSimplifier::simplify`] per group, regrouped with the same keys.
    pub fn simplify_collection(&self, collection: &TrajectoryCollection) -> Result<TrajectoryCollection, FlightError> {
        collection.map_groups(|_, t| self.simplify(&t))
    }
}

/// Positions `s` of the kept segments `kept[s] -> kept[s + 1]` that cross a
/// non-adjacent kept segment and replaced at least one original vertex.
fn crossing_spans(coords: &[Coord<f64>], kept: &[usize]) -> Vec<usize> {
    let n = kept.len().saturating_sub(1);
    let segment = |s: usize| Line::new(coords[kept[s]], coords[kept[s + 1]]);
    let closed = n > 1 && coords[kept[0]] == coords[kept[n]];

    let mut spans = Vec::new();
    for i in 0..n {
        for j in (i + 2)..n {
            if closed && i == 0 && j == n - 1 {
                continue;
            }
            if segment(i).intersects(&segment(j)) {
                spans.extend([i, j].into_iter().filter(|&s| kept[s + 1] - kept[s] > 1));
            }
        }
    }
    spans.sort_unstable();
    spans.dedup();
    spans
}

/// Put back the original vertices of every crossing span until none is left.
fn restore_crossings(coords: &[Coord<f64>], mut kept: Vec<usize>) -> Vec<usize> {
    loop {
        let spans = crossing_spans(coords, &kept);
        if spans.is_empty() {
            return kept;
        }
        debug!("Restoring {} simplified spans that cross the path", spans.len());
        let mut restored = Vec::with_capacity(kept.len());
        for (s, &start) in kept.iter().enumerate() {
            restored.push(start);
            if spans.binary_search(&s).is_ok() {
                restored.extend(start + 1..kept[s + 1]);
            }
        }
        kept = restored;
    }
}

#[cfg(feature = "nearest")]
fn nearest_rows(trajectory: &Trajectory, vertices: &[Coord<f64>]) -> Result<Vec<usize>, FlightError> {
    use rstar::{PointDistance, RTree, RTreeObject, AABB};

    #[derive(Debug, Clone, Copy)]
    struct IndexedPoint {
        idx: usize,
        x: f64,
        y: f64,
    }

    impl RTreeObject for IndexedPoint {
        type Envelope = AABB<[f64; 2]>;

        fn envelope(&self) -> Self::Envelope {
            AABB::from_point([self.x, self.y])
        }
    }

    impl PointDistance for IndexedPoint {
        fn distance_2(&self, point: &[f64; 2]) -> f64 {
            let dx = self.x - point[0];
            let dy = self.y - point[1];
            dx * dx + dy * dy
        }
    }

    let indexed: Vec<IndexedPoint> = trajectory
        .points()
        .iter()
        .enumerate()
        .map(|(idx, p)| IndexedPoint {
            idx,
            x: p.x(),
            y: p.y(),
        })
        .collect();
    let tree = RTree::bulk_load(indexed);

    vertices
        .iter()
        .map(|c| {
            tree.nearest_neighbor(&[c.x, c.y])
                .map(|p| p.idx)
                .ok_or(FlightError::MissingGeometry)
        })
        .collect()
}

#[cfg(not(feature = "nearest"))]
fn nearest_rows(_trajectory: &Trajectory, _vertices: &[Coord<f64>]) -> Result<Vec<usize>, FlightError> {
    Err(FlightError::MissingCapability(
        "nearest-neighbour search requires the `nearest` feature",
    ))
}

impl Step for RdpSimplifier {
    fn eval_trajectory(&self, trajectory: &Trajectory) -> Result<PipelineData, FlightError> {
        match self.params.output {
            SimplifyOutput::Geometry => Ok(PipelineData::Path(self.simplify_path(trajectory))),
            SimplifyOutput::Rows => self.simplify(trajectory).map(PipelineData::Trajectory),
        }
    }

    fn eval_collection(&self, collection: &TrajectoryCollection) -> Result<PipelineData, FlightError> {
        match self.params.output {
            SimplifyOutput::Geometry => Ok(PipelineData::Paths(self.simplify_paths(collection))),
            SimplifyOutput::Rows => self
                .simplify_collection(collection)
                .map(PipelineData::Collection),
        }
    }

    fn is_terminal(&self) -> bool {
        self.params.output == SimplifyOutput::Geometry
    }
}

#[cfg(test)]
mod test_simplifier {
    use super::*;
    use crate::frame::{Column, Frame};
    use crate::roles::RoleOverrides;

    fn zigzag() -> Trajectory {
        let frame = Frame::from_columns([
            ("lat", Column::from(vec![0.0, 0.001, 0.0, 1.0, 0.0])),
            ("lon", Column::from(vec![0.0, 1.0, 2.0, 3.0, 4.0])),
            ("seq", Column::Int(vec![0, 1, 2, 3, 4])),
        ])
        .unwrap();
        Trajectory::new(frame, &RoleOverrides::default()).unwrap()
    }

    fn rdp(tolerance: f64) -> RdpSimplifier {
        let params = SimplifyParams::builder()
            .tolerance(tolerance)
            .preserve_topology(false)
            .build()
            .unwrap();
        RdpSimplifier::new(params, &Capabilities::detect()).unwrap()
    }

    #[test]
    fn test_invalid_tolerance() {
        assert!(SimplifyParams::builder().tolerance(-1.0).build().is_err());
        assert!(SimplifyParams::builder().tolerance(f64::NAN).build().is_err());
    }

    #[test]
    fn test_missing_capability_fails_fast() {
        let params = SimplifyParams::default();
        assert_eq!(
            RdpSimplifier::new(params, &Capabilities::none()).unwrap_err().kind(),
            crate::flight_errors::ErrorKind::Configuration
        );
        let geometry = SimplifyParams::builder().output_geometry(true).build().unwrap();
        assert!(RdpSimplifier::new(geometry, &Capabilities::none()).is_ok());
    }

    #[test]
    fn test_path_drops_flat_vertex() {
        let path = rdp(0.01).simplify_path(&zigzag()).unwrap();
        assert_eq!(path.0.len(), 4);
    }

    fn path(coords: &[(f64, f64)]) -> LineString<f64> {
        LineString::from(coords.to_vec())
    }

    fn simplifier(tolerance: f64, preserve_topology: bool) -> RdpSimplifier {
        let params = SimplifyParams::builder()
            .tolerance(tolerance)
            .preserve_topology(preserve_topology)
            .output_geometry(true)
            .build()
            .unwrap();
        RdpSimplifier::new(params, &Capabilities::none()).unwrap()
    }

    #[test]
    fn test_tolerance_is_a_distance_in_both_modes() {
        let line = path(&[(0.0, 0.0), (10.0, 0.5), (20.0, 0.0)]);
        assert_eq!(simplifier(1.0, false).simplify_line(&line).0.len(), 2);
        assert_eq!(simplifier(1.0, true).simplify_line(&line).0.len(), 2);
        assert_eq!(simplifier(0.4, true).simplify_line(&line).0.len(), 3);
    }

    #[test]
    fn test_topology_restores_crossed_span() {
        // dropping (5, 0.8) makes the first segment cut the last one
        let line = path(&[(0.0, 0.0), (5.0, 0.8), (20.0, 0.0), (5.0, 0.3), (5.0, -2.0)]);
        let loose = simplifier(1.0, false).simplify_line(&line);
        assert_eq!(loose.0.len(), 4);

        let kept = simplifier(1.0, true).simplify_line(&line);
        assert_eq!(kept, line);
    }

    #[test]
    fn test_existing_crossing_is_left_alone() {
        let bowtie = path(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert_eq!(simplifier(0.1, true).simplify_line(&bowtie), bowtie);
    }

    #[cfg(feature = "nearest")]
    #[test]
    fn test_rows_follow_vertices() {
        let out = rdp(0.01).simplify(&zigzag()).unwrap();
        assert_eq!(out.column("seq").unwrap(), &Column::Int(vec![0, 2, 3, 4]));
    }

    #[cfg(feature = "nearest")]
    #[test]
    fn test_short_trajectory_is_unchanged() {
        let t = zigzag().head(1);
        assert_eq!(rdp(1.0).simplify(&t).unwrap(), t);
        assert!(rdp(1.0).simplify_path(&t).is_none());
    }
}
