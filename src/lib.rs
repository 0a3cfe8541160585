//! # flightframe
//!
//! Geospatial trajectories (time-ordered, positioned samples such as aircraft
//! tracks) on top of a small column-oriented table engine.
//!
//! * [`trajectory::Trajectory`] binds semantic roles to columns and keeps them
//!   valid through slicing, projection and concatenation.
//! * [`collection::TrajectoryCollection`] groups the rows of one trajectory by
//!   key, the index level or a per-row series.
//! * [`pipeline::splitter::TimeGapSplitter`] cuts trajectories at time gaps.
//! * [`pipeline::simplifier::RdpSimplifier`] simplifies paths and recovers the
//!   original rows of the kept vertices.
//! * [`Trajectory::resample`](trajectory::Trajectory::resample) regularizes a
//!   trajectory onto a fixed time grid.
pub mod capabilities;
pub mod collection;
pub mod constants;
pub mod crs;
pub mod distance;
pub mod flight_errors;
pub mod frame;
pub mod pipeline;
pub mod roles;
pub mod time;
pub mod trajectory;

pub use capabilities::Capabilities;
pub use collection::{GroupKey, GroupOptions, GroupSpec, KeyValue, TrajectoryCollection};
pub use crs::{Crs, Reproject};
pub use distance::SequenceDistance;
pub use flight_errors::{ErrorKind, FlightError};
pub use frame::{Column, Frame, RowIndex};
pub use pipeline::simplifier::{RdpSimplifier, SimplifyOutput, SimplifyParams};
pub use pipeline::splitter::TimeGapSplitter;
pub use pipeline::{Pipeline, PipelineData, Step};
pub use roles::{Role, RoleBinding, RoleOverrides};
pub use trajectory::{Interpolation, Selection, Trajectory};
