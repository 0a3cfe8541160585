//! # Resampling onto a regular time grid
//!
//! [`Trajectory::resample`] regularizes an irregularly timed trajectory:
//!
//! 1. rows are assigned to the buckets of a [`TimeGrid`] starting at the first
//!    epoch floored to the frequency,
//! 2. positional values (x/y of the geometry) and every other numeric column
//!    are averaged per bucket (`NaN` skipped), then empty buckets are filled by
//!    [`Interpolation`],
//! 3. text columns take the first non-missing value of each bucket, then are
//!    back-filled and forward-filled,
//! 4. the geometry is rebuilt from the resampled x/y and the role bindings are
//!    inherited from the source.
//!
//! Numeric columns come out as `Float`. Bucket `k` is labelled by its left
//! edge, so a trajectory already sampled on the grid is reproduced unchanged.
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use geo::Point;
use hifitime::{Duration, Epoch};
use log::debug;
use serde::{Deserialize, Serialize};

use super::Trajectory;
use crate::flight_errors::FlightError;
use crate::frame::{Column, Frame, IndexValues, RowIndex};
use crate::time::TimeGrid;

/// Method used to fill empty buckets of numeric columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interpolation {
    /// Linear in bucket position; trailing gaps hold the last value, leading
    /// gaps stay `NaN`.
    #[default]
    Linear,
    /// Value of the nearest filled bucket (left on ties); edges stay `NaN`.
    Nearest,
    /// Last filled value carried forward.
    Pad,
}

impl FromStr for Interpolation {
    type Err = FlightError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "linear" => Ok(Interpolation::Linear),
            "nearest" => Ok(Interpolation::Nearest),
            "pad" | "ffill" => Ok(Interpolation::Pad),
            other => Err(FlightError::InvalidParameter(format!(
                "unknown interpolation method '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Interpolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Interpolation::Linear => "linear",
            Interpolation::Nearest => "nearest",
            Interpolation::Pad => "pad",
        };
        f.write_str(name)
    }
}

fn bucket_mean(values: &[f64], buckets: &[usize], n: usize) -> Vec<f64> {
    let mut sums = vec![0.0; n];
    let mut counts = vec![0usize; n];
    for (&v, &b) in values.iter().zip(buckets) {
        if !v.is_nan() {
            sums[b] += v;
            counts[b] += 1;
        }
    }
    sums.iter()
        .zip(&counts)
        .map(|(&s, &c)| if c == 0 { f64::NAN } else { s / c as f64 })
        .collect()
}

fn bucket_first(values: &[Option<String>], buckets: &[usize], n: usize) -> Vec<Option<String>> {
    let mut out: Vec<Option<String>> = vec![None; n];
    for (v, &b) in values.iter().zip(buckets) {
        if out[b].is_none() {
            out[b] = v.clone();
        }
    }
    out
}

/// Fill the `NaN` entries of `values` in place.
pub(crate) fn interpolate(values: &mut [f64], method: Interpolation) {
    let filled: Vec<usize> = (0..values.len()).filter(|&i| !values[i].is_nan()).collect();
    if filled.is_empty() {
        return;
    }

    for i in 0..values.len() {
        if !values[i].is_nan() {
            continue;
        }
        // first filled position after i
        let next_pos = filled.partition_point(|&j| j < i);
        let prev = next_pos.checked_sub(1).map(|p| filled[p]);
        let next = filled.get(next_pos).copied();

        values[i] = match (method, prev, next) {
            (Interpolation::Linear, Some(p), Some(q)) => {
                let w = (i - p) as f64 / (q - p) as f64;
                values[p] + w * (values[q] - values[p])
            }
            (Interpolation::Linear | Interpolation::Pad, Some(p), _) => values[p],
            (Interpolation::Nearest, Some(p), Some(q)) => {
                if i - p <= q - i {
                    values[p]
                } else {
                    values[q]
                }
            }
            _ => f64::NAN,
        };
    }
}

/// Back-fill then forward-fill missing text values.
fn fill_text(values: &mut [Option<String>]) {
    let mut next: Option<String> = None;
    for v in values.iter_mut().rev() {
        match v {
            Some(s) => next = Some(s.clone()),
            None => *v = next.clone(),
        }
    }
    let mut prev: Option<String> = None;
    for v in values.iter_mut() {
        match v {
            Some(s) => prev = Some(s.clone()),
            None => *v = prev.clone(),
        }
    }
}

impl Trajectory {
    /// Resample onto a regular grid of step `freq`.
    ///
    /// Arguments
    /// -----------------
    /// * `freq` – Grid step, e.g. `Unit::Second * 1` or
    ///   [`parse_frequency("1s")`](crate::time::parse_frequency).
    /// * `method` – How empty buckets of numeric columns are filled.
    ///
    /// Return
    /// ----------
    /// * A trajectory with one row per grid bucket between the first and the
    ///   last sample, or [`FlightError::NonTimeIndex`] if the row index does not
    ///   hold epochs.
    pub fn resample(&self, freq: Duration, method: Interpolation) -> Result<Trajectory, FlightError> {
        let times = self
            .index()
            .as_time()
            .ok_or(FlightError::NonTimeIndex("resample"))?;
        let Some(first) = times
            .iter()
            .copied()
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal))
        else {
            return Ok(self.clone());
        };

        let grid = TimeGrid::new(first, freq)?;
        let buckets: Vec<usize> = times.iter().map(|&t| grid.bucket(t) as usize).collect();
        let n = buckets.iter().max().map_or(0, |&b| b + 1);

        let epochs: Vec<Epoch> = (0..n as i64).map(|k| grid.epoch(k)).collect();
        let index = RowIndex::from_parts(
            self.index().name().map(str::to_string),
            IndexValues::Time(epochs),
        );
        let mut frame = Frame::new(index);

        let numeric = |values: &[f64]| {
            let mut out = bucket_mean(values, &buckets, n);
            interpolate(&mut out, method);
            out
        };

        for (name, column) in self.frame().columns() {
            let resampled = match column {
                Column::Geometry(points) if name == self.geometry_column() => {
                    let xs: Vec<f64> = points.iter().map(|p| p.x()).collect();
                    let ys: Vec<f64> = points.iter().map(|p| p.y()).collect();
                    let points = numeric(&xs)
                        .into_iter()
                        .zip(numeric(&ys))
                        .map(|(x, y)| Point::new(x, y))
                        .collect();
                    Column::Geometry(points)
                }
                Column::Float(_) | Column::Int(_) => Column::Float(numeric(&column.to_f64(name)?)),
                Column::Text(values) => {
                    let mut out = bucket_first(values, &buckets, n);
                    fill_text(&mut out);
                    Column::Text(out)
                }
                Column::Geometry(_) => {
                    return Err(FlightError::AmbiguousGeometry(self.frame().geometry_columns().len()))
                }
            };
            frame.push_column(name, resampled)?;
        }

        debug!("Resampled {} rows into {} buckets of {}", self.len(), n, freq);
        Ok(self.with_frame(frame))
    }
}

#[cfg(test)]
mod test_resample {
    use super::*;
    use crate::roles::RoleOverrides;
    use approx::assert_relative_eq;
    use hifitime::Unit;

    fn irregular() -> Trajectory {
        let t0 = Epoch::from_gregorian_tai_at_midnight(2024, 1, 1);
        let frame = Frame::from_columns([
            ("lat", Column::from(vec![0.0, 1.0, 3.0, 4.0])),
            ("lon", Column::from(vec![0.0, 2.0, 6.0, 8.0])),
            ("alt", Column::Int(vec![100, 200, 400, 500])),
            ("callsign", Column::Text(vec![None, Some("A".into()), None, Some("B".into())])),
        ])
        .unwrap()
        .with_index(RowIndex::time(
            "time",
            vec![
                t0,
                t0 + Unit::Second * 1,
                t0 + Unit::Second * 3,
                t0 + Unit::Second * 4,
            ],
        ))
        .unwrap();
        Trajectory::new(frame, &RoleOverrides::default()).unwrap()
    }

    #[test]
    fn test_linear_fill_of_missing_bucket() {
        let out = irregular().resample(Unit::Second * 1, Interpolation::Linear).unwrap();
        assert_eq!(out.len(), 5);
        assert_relative_eq!(out.points()[2].y(), 2.0);
        assert_relative_eq!(out.points()[2].x(), 4.0);
        assert_eq!(out.column("alt").unwrap(), &Column::Float(vec![100.0, 200.0, 300.0, 400.0, 500.0]));
        assert_eq!(out.roles().altitude.as_deref(), Some("alt"));
    }

    #[test]
    fn test_text_is_back_then_forward_filled() {
        let out = irregular().resample(Unit::Second * 1, Interpolation::Linear).unwrap();
        let expected: Vec<Option<String>> = ["A", "A", "B", "B", "B"]
            .iter()
            .map(|s| Some(s.to_string()))
            .collect();
        assert_eq!(out.column("callsign").unwrap(), &Column::Text(expected));
    }

    #[test]
    fn test_mean_per_bucket() {
        let out = irregular().resample(Unit::Second * 2, Interpolation::Linear).unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(out.column("alt").unwrap(), &Column::Float(vec![150.0, 400.0, 500.0]));
    }

    #[test]
    fn test_requires_time_index() {
        let frame = Frame::from_columns([
            ("lat", Column::from(vec![0.0, 1.0])),
            ("lon", Column::from(vec![0.0, 1.0])),
        ])
        .unwrap();
        let t = Trajectory::new(frame, &RoleOverrides::default()).unwrap();
        assert_eq!(
            t.resample(Unit::Second * 1, Interpolation::Linear),
            Err(FlightError::NonTimeIndex("resample"))
        );
    }

    #[test]
    fn test_interpolation_methods() {
        let nan = f64::NAN;
        let mut linear = vec![nan, 1.0, nan, nan, 4.0, nan];
        interpolate(&mut linear, Interpolation::Linear);
        assert!(linear[0].is_nan());
        assert_eq!(&linear[1..], &[1.0, 2.0, 3.0, 4.0, 4.0]);

        let mut nearest = vec![1.0, nan, nan, 4.0, nan];
        interpolate(&mut nearest, Interpolation::Nearest);
        assert_eq!(&nearest[..4], &[1.0, 1.0, 4.0, 4.0]);
        assert!(nearest[4].is_nan());

        let mut pad = vec![nan, 1.0, nan, 3.0, nan];
        interpolate(&mut pad, Interpolation::Pad);
        assert!(pad[0].is_nan());
        assert_eq!(&pad[1..], &[1.0, 1.0, 3.0, 3.0]);
    }

    #[test]
    fn test_parse_method() {
        assert_eq!("pad".parse::<Interpolation>().unwrap(), Interpolation::Pad);
        assert!("cubic".parse::<Interpolation>().is_err());
    }
}
