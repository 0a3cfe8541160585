//! # Time-gap splitting
//!
//! [`TimeGapSplitter`] cuts trajectories wherever two consecutive samples are
//! more than `gap` apart and returns the segments as a
//! [`TrajectoryCollection`] keyed by an integer segment id, also written to a
//! column (default `"split"`, overwritten when present).
//!
//! Single trajectory
//! -----------------
//! Rows are stably sorted by time, the time difference to the previous row is
//! taken (zero for the first row), a row with a difference strictly above
//! `gap` starts a new segment, and the segment id is the running count of such
//! rows.
//!
//! Collection
//! -----------------
//! Rows are sorted by `(group key, time)` and one difference sequence is taken
//! over that whole order. The running count of gap crossings is paired with the
//! original group key and the distinct `(group key, count)` pairs are numbered
//! densely in sorted order. Two rows of different groups therefore never share
//! a segment, even when their times are close.
//!
//! Both variants require a time index and check it before any computation.
use std::cmp::Ordering;

use hifitime::{Duration, Epoch};
use log::debug;

use super::{PipelineData, Step};
use crate::collection::{GroupKey, GroupOptions, GroupSpec, TrajectoryCollection};
use crate::constants::{default_gap, SPLIT_COLUMN};
use crate::flight_errors::FlightError;
use crate::frame::Column;
use crate::trajectory::Trajectory;

#[derive(Debug, Clone, PartialEq)]
pub struct TimeGapSplitter {
    gap: Duration,
    column: String,
}

impl Default for TimeGapSplitter {
    fn default() -> Self {
        TimeGapSplitter {
            gap: default_gap(),
            column: SPLIT_COLUMN.to_string(),
        }
    }
}

fn cmp_epochs(a: &Epoch, b: &Epoch) -> Ordering {
    a.partial_cmp(b).unwrap_or(Ordering::Equal)
}

impl TimeGapSplitter {
    /// Splitter with threshold `gap` and the default output column.
    ///
    /// Return
    /// ----------
    /// * The splitter, or [`FlightError::InvalidParameter`] for a negative gap.
    pub fn new(gap: Duration) -> Result<Self, FlightError> {
        if gap.is_negative() {
            return Err(FlightError::InvalidParameter(format!(
                "gap must be non-negative, got {gap}"
            )));
        }
        Ok(TimeGapSplitter {
            gap,
            ..Default::default()
        })
    }

    /// Name of the output column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.column = name.into();
        self
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    pub fn column_name(&self) -> &str {
        &self.column
    }

    fn times(data: &Trajectory) -> Result<&[Epoch], FlightError> {
        data.index()
            .as_time()
            .ok_or(FlightError::NonTimeIndex("split on time gaps"))
    }

    /// Take `rows` of `data`, write `ids` into the output column and group by it.
    fn regroup(&self, data: &Trajectory, rows: &[usize], ids: Vec<i64>) -> Result<TrajectoryCollection, FlightError> {
        if self.column == data.geometry_column() {
            return Err(FlightError::InvalidParameter(format!(
                "split column '{}' would replace the geometry",
                self.column
            )));
        }
        let mut out = data
            .take(rows)
            .drop_columns(&[self.column.as_str()])
            .into_trajectory()
            .ok_or(FlightError::MissingGeometry)?;
        out.insert_column(self.column.clone(), Column::Int(ids))?;
        out.group_by(GroupSpec::keys([self.column.as_str()]), GroupOptions::default())
    }

    /// Split one trajectory.
    pub fn split(&self, trajectory: &Trajectory) -> Result<TrajectoryCollection, FlightError> {
        let times = Self::times(trajectory)?;
        let order = trajectory.index().argsort();

        let mut segment = 0_i64;
        let ids: Vec<i64> = order
            .iter()
            .enumerate()
            .map(|(pos, &row)| {
                if pos > 0 && times[row] - times[order[pos - 1]] > self.gap {
                    segment += 1;
                }
                segment
            })
            .collect();

        debug!("Split {} rows into {} segments", trajectory.len(), segment + 1);
        self.regroup(trajectory, &order, ids)
    }

    /// Split every group of a collection without merging across groups.
    pub fn split_collection(&self, collection: &TrajectoryCollection) -> Result<TrajectoryCollection, FlightError> {
        let data = collection.data();
        let times = Self::times(data)?;

        let mut entries: Vec<(&GroupKey, usize)> = collection
            .keys()
            .flat_map(|key| {
                collection
                    .rows(key)
                    .unwrap_or_default()
                    .iter()
                    .map(move |&row| (key, row))
            })
            .collect();
        entries.sort_by(|(ka, ra), (kb, rb)| ka.cmp(kb).then_with(|| cmp_epochs(&times[*ra], &times[*rb])));

        let mut crossings = 0_i64;
        let mut previous: Option<(&GroupKey, i64)> = None;
        let mut dense = -1_i64;
        let mut ids = Vec::with_capacity(entries.len());
        for (pos, &(key, row)) in entries.iter().enumerate() {
            if pos > 0 && times[row] - times[entries[pos - 1].1] > self.gap {
                crossings += 1;
            }
            if previous != Some((key, crossings)) {
                dense += 1;
                previous = Some((key, crossings));
            }
            ids.push(dense);
        }

        let rows: Vec<usize> = entries.iter().map(|&(_, row)| row).collect();
        debug!(
            "Split {} groups into {} segments",
            collection.len(),
            dense + 1
        );
        self.regroup(data, &rows, ids)
    }
}

impl Step for TimeGapSplitter {
    fn check(&self, input: &PipelineData) -> Result<(), FlightError> {
        match input.trajectory() {
            Some(t) => Self::times(t).map(|_| ()),
            None => Err(FlightError::TerminalPipeline),
        }
    }

    fn eval_trajectory(&self, trajectory: &Trajectory) -> Result<PipelineData, FlightError> {
        self.split(trajectory).map(PipelineData::Collection)
    }

    fn eval_collection(&self, collection: &TrajectoryCollection) -> Result<PipelineData, FlightError> {
        self.split_collection(collection).map(PipelineData::Collection)
    }
}
