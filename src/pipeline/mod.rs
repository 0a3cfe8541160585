//! # Processing pipelines
//!
//! A [`Pipeline`] chains [`Step`]s (the [`TimeGapSplitter`](splitter::TimeGapSplitter)
//! and the [`RdpSimplifier`](simplifier::RdpSimplifier)) over a trajectory or
//! a collection. Steps are recorded by [`Pipeline::pipe`] and run in order by
//! [`Pipeline::eval`]; each step receives the output of the previous one.
//!
//! Terminal steps
//! -----------------
//! A step whose output is geometry only (a path or per-key paths) is
//! *terminal*: piping anything after it fails with
//! [`FlightError::TerminalPipeline`], and so does evaluating a step on a
//! geometry-only value.
//!
//! ```rust
//! use flightframe::capabilities::Capabilities;
//! use flightframe::pipeline::simplifier::{RdpSimplifier, SimplifyParams};
//! use flightframe::pipeline::splitter::TimeGapSplitter;
//! use flightframe::pipeline::Pipeline;
//! # use flightframe::{frame::{Column, Frame, RowIndex}, roles::RoleOverrides, trajectory::Trajectory};
//! # use hifitime::{Epoch, Unit};
//! # let t0 = Epoch::from_gregorian_tai_at_midnight(2024, 1, 1);
//! # let frame = Frame::from_columns([
//! #     ("lat", Column::from(vec![0.0, 1.0, 2.0])),
//! #     ("lon", Column::from(vec![0.0, 1.0, 2.0])),
//! # ])?
//! # .with_index(RowIndex::time("time", vec![t0, t0 + Unit::Second * 1, t0 + Unit::Hour * 1]))?;
//! # let trajectory = Trajectory::new(frame, &RoleOverrides::default())?;
//!
//! let params = SimplifyParams::builder().tolerance(0.01).output_geometry(true).build()?;
//! let pipeline = Pipeline::new(trajectory)
//!     .pipe(TimeGapSplitter::default())?
//!     .pipe(RdpSimplifier::new(params, &Capabilities::detect())?)?;
//!
//! let paths = pipeline.eval()?.into_paths().unwrap_or_default();
//! assert_eq!(paths.len(), 2);
//!
//! // nothing can follow a geometry-only simplification
//! assert!(pipeline.pipe(TimeGapSplitter::default()).is_err());
//! # Ok::<(), flightframe::FlightError>(())
//! ```
use std::fmt;

use geo::LineString;

use crate::collection::{GroupKey, TrajectoryCollection};
use crate::flight_errors::FlightError;
use crate::trajectory::Trajectory;

pub mod simplifier;
pub mod splitter;

/// Value flowing through a [`Pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineData {
    Trajectory(Trajectory),
    Collection(TrajectoryCollection),
    /// Geometry-only output of a single trajectory (`None` below two samples).
    Path(Option<LineString<f64>>),
    /// Geometry-only output of a collection, one path per group.
    Paths(Vec<(GroupKey, Option<LineString<f64>>)>),
}

impl PipelineData {
    /// Whether no further step can consume this value.
    pub fn is_geometry(&self) -> bool {
        matches!(self, PipelineData::Path(_) | PipelineData::Paths(_))
    }

    pub fn into_trajectory(self) -> Option<Trajectory> {
        match self {
            PipelineData::Trajectory(t) => Some(t),
            _ => None,
        }
    }

    pub fn into_collection(self) -> Option<TrajectoryCollection> {
        match self {
            PipelineData::Collection(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_path(self) -> Option<LineString<f64>> {
        match self {
            PipelineData::Path(p) => p,
            _ => None,
        }
    }

    pub fn into_paths(self) -> Option<Vec<(GroupKey, Option<LineString<f64>>)>> {
        match self {
            PipelineData::Paths(p) => Some(p),
            _ => None,
        }
    }

    /// Backing trajectory of a trajectory or collection value.
    pub fn trajectory(&self) -> Option<&Trajectory> {
        match self {
            PipelineData::Trajectory(t) => Some(t),
            PipelineData::Collection(c) => Some(c.data()),
            _ => None,
        }
    }
}

impl From<Trajectory> for PipelineData {
    fn from(t: Trajectory) -> Self {
        PipelineData::Trajectory(t)
    }
}

impl From<TrajectoryCollection> for PipelineData {
    fn from(c: TrajectoryCollection) -> Self {
        PipelineData::Collection(c)
    }
}

/// One transformation of a pipeline.
pub trait Step: fmt::Debug {
    /// Validate the input before any computation.
    fn check(&self, _input: &PipelineData) -> Result<(), FlightError> {
        Ok(())
    }

    fn eval_trajectory(&self, trajectory: &Trajectory) -> Result<PipelineData, FlightError>;

    fn eval_collection(&self, collection: &TrajectoryCollection) -> Result<PipelineData, FlightError>;

    /// Whether the output of this step is geometry only.
    fn is_terminal(&self) -> bool {
        false
    }

    /// Run the step on any pipeline value.
    fn eval(&self, input: &PipelineData) -> Result<PipelineData, FlightError> {
        self.check(input)?;
        match input {
            PipelineData::Trajectory(t) => self.eval_trajectory(t),
            PipelineData::Collection(c) => self.eval_collection(c),
            PipelineData::Path(_) | PipelineData::Paths(_) => Err(FlightError::TerminalPipeline),
        }
    }
}

#[derive(Debug)]
pub struct Pipeline {
    input: PipelineData,
    steps: Vec<Box<dyn Step>>,
}

impl Pipeline {
    pub fn new(input: impl Into<PipelineData>) -> Self {
        Pipeline {
            input: input.into(),
            steps: Vec::new(),
        }
    }

    /// Append a step.
    ///
    /// Return
    /// ----------
    /// * The extended pipeline, or
    ///   - [`FlightError::TerminalPipeline`] if the last step is terminal,
    ///   - the error of [`Step::check`] when `step` rejects the pipeline input.
    ///     Non-terminal steps keep the kind of row index, so every step is
    ///     checked against the input, wherever it is appended.
    pub fn pipe(mut self, step: impl Step + 'static) -> Result<Self, FlightError> {
        if self.steps.last().is_some_and(|s| s.is_terminal()) {
            return Err(FlightError::TerminalPipeline);
        }
        step.check(&self.input)?;
        self.steps.push(Box::new(step));
        Ok(self)
    }

    pub fn input(&self) -> &PipelineData {
        &self.input
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step in order. The input is left untouched.
    pub fn eval(&self) -> Result<PipelineData, FlightError> {
        let mut steps = self.steps.iter();
        let Some(first) = steps.next() else {
            return Ok(self.input.clone());
        };
        let mut data = first.eval(&self.input)?;
        for step in steps {
            data = step.eval(&data)?;
        }
        Ok(data)
    }
}
