//! # Frame: the column-oriented table engine
//!
//! [`Frame`] is the minimal in-memory table the trajectory types are layered on.
//! It provides exactly the primitives the rest of the crate consumes:
//!
//! * named columns ([`Column`]) with **duplicate names allowed**, so that role
//!   re-validation can observe ambiguity instead of hiding it,
//! * a [`RowIndex`] (positional, integer, label or time),
//! * row gathering (`take`, `slice`, `filter`, `sort_by_index`),
//! * column projection, insertion, renaming and dropping,
//! * vertical (`concat`) and horizontal (`hconcat`) concatenation,
//! * CSV ingestion ([`csv_reader`]) and table display ([`display`]).
//!
//! Copy-on-write
//! -----------------
//! Columns are stored as `Arc<Column>`. Deriving a frame (projection, cloning)
//! shares storage; every in-place mutation goes through [`Arc::make_mut`], so
//! writing to a derived frame never changes the frame it came from.
use std::str::FromStr;
use std::sync::Arc;

use hifitime::Epoch;
use itertools::Itertools;

use crate::flight_errors::FlightError;

pub mod column;
pub mod csv_reader;
pub mod display;
pub mod index;

pub use column::{Column, DType};
pub use index::{IndexValues, RowIndex};

#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: RowIndex,
    columns: Vec<(String, Arc<Column>)>,
}

impl Frame {
    /// Empty frame (no columns) over the given index.
    pub fn new(index: RowIndex) -> Self {
        Frame {
            index,
            columns: Vec::new(),
        }
    }

    /// Build a frame with a positional index from `(name, column)` pairs.
    ///
    /// All columns must have the same length.
    pub fn from_columns<S: Into<String>>(
        columns: impl IntoIterator<Item = (S, Column)>,
    ) -> Result<Self, FlightError> {
        let columns: Vec<(String, Column)> =
            columns.into_iter().map(|(n, c)| (n.into(), c)).collect();
        let len = columns.first().map_or(0, |(_, c)| c.len());
        let mut frame = Frame::new(RowIndex::range(len));
        for (name, column) in columns {
            frame.push_column(name, column)?;
        }
        Ok(frame)
    }

    /// Builder form of [`Frame::insert_column`].
    pub fn with_column(mut self, name: impl Into<String>, column: Column) -> Result<Self, FlightError> {
        self.insert_column(name, column)?;
        Ok(self)
    }

    /// Replace the index. The new index must have one label per row.
    pub fn with_index(mut self, index: RowIndex) -> Result<Self, FlightError> {
        if !self.columns.is_empty() && index.len() != self.len() {
            return Err(FlightError::LengthMismatch {
                expected: self.len(),
                found: index.len(),
            });
        }
        self.index = index;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self) -> &RowIndex {
        &self.index
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Column names in order, duplicates included.
    pub fn column_names(&self) -> impl Iterator<Item = &str> + Clone + '_ {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> + '_ {
        self.columns.iter().map(|(name, c)| (name.as_str(), c.as_ref()))
    }

    /// Number of columns called `name`.
    pub fn occurrences(&self, name: &str) -> usize {
        self.column_names().filter(|n| *n == name).count()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.occurrences(name) > 0
    }

    fn position(&self, name: &str) -> Result<usize, FlightError> {
        let mut found = self
            .columns
            .iter()
            .enumerate()
            .filter(|(_, (n, _))| n.as_str() == name)
            .map(|(pos, _)| pos);
        match (found.next(), found.next()) {
            (None, _) => Err(FlightError::ColumnNotFound(name.to_string())),
            (Some(pos), None) => Ok(pos),
            _ => Err(FlightError::AmbiguousColumn(name.to_string())),
        }
    }

    /// The unique column called `name`.
    pub fn column(&self, name: &str) -> Result<&Column, FlightError> {
        let pos = self.position(name)?;
        Ok(self.columns[pos].1.as_ref())
    }

    /// Mutable access to the unique column called `name`, cloning shared storage first.
    pub fn column_mut(&mut self, name: &str) -> Result<&mut Column, FlightError> {
        let pos = self.position(name)?;
        Ok(Arc::make_mut(&mut self.columns[pos].1))
    }

    /// Names of the geometry-typed columns.
    pub fn geometry_columns(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|(_, c)| c.dtype() == DType::Geometry)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn check_len(&self, column: &Column) -> Result<(), FlightError> {
        if column.len() != self.len() {
            return Err(FlightError::LengthMismatch {
                expected: self.len(),
                found: column.len(),
            });
        }
        Ok(())
    }

    /// Assign a column: replaces the column called `name` if there is exactly one,
    /// appends it otherwise.
    pub fn insert_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), FlightError> {
        let name = name.into();
        self.check_len(&column)?;
        match self.occurrences(&name) {
            0 => self.columns.push((name, Arc::new(column))),
            1 => {
                let pos = self.position(&name)?;
                self.columns[pos].1 = Arc::new(column);
            }
            _ => return Err(FlightError::AmbiguousColumn(name)),
        }
        Ok(())
    }

    /// Append a column even if the name already exists.
    pub fn push_column(&mut self, name: impl Into<String>, column: Column) -> Result<(), FlightError> {
        self.check_len(&column)?;
        self.columns.push((name.into(), Arc::new(column)));
        Ok(())
    }

    /// Keep the listed columns, in the listed order.
    ///
    /// Every occurrence of a duplicated name is kept. An unknown name is an error.
    pub fn select(&self, names: &[&str]) -> Result<Frame, FlightError> {
        let mut columns = Vec::new();
        for name in names {
            let matching: Vec<_> = self.columns.iter().filter(|(n, _)| n == name).cloned().collect();
            if matching.is_empty() {
                return Err(FlightError::ColumnNotFound(name.to_string()));
            }
            columns.extend(matching);
        }
        Ok(Frame {
            index: self.index.clone(),
            columns,
        })
    }

    /// Remove every column whose name is listed. Unknown names are ignored.
    pub fn drop_columns(&self, names: &[&str]) -> Frame {
        Frame {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .filter(|(n, _)| !names.contains(&n.as_str()))
                .cloned()
                .collect(),
        }
    }

    /// Rename every column called `from`.
    pub fn rename_column(&self, from: &str, to: &str) -> Result<Frame, FlightError> {
        if !self.contains(from) {
            return Err(FlightError::ColumnNotFound(from.to_string()));
        }
        let mut out = self.clone();
        for (name, _) in out.columns.iter_mut().filter(|(n, _)| n == from) {
            *name = to.to_string();
        }
        Ok(out)
    }

    /// Gather rows by position (positions may repeat).
    pub fn take(&self, rows: &[usize]) -> Frame {
        Frame {
            index: self.index.take(rows),
            columns: self
                .columns
                .iter()
                .map(|(name, c)| (name.clone(), Arc::new(c.take(rows))))
                .collect(),
        }
    }

    /// Rows `[start, end)`, clamped to the frame length.
    pub fn slice(&self, start: usize, end: usize) -> Frame {
        let end = end.min(self.len());
        let start = start.min(end);
        let rows: Vec<usize> = (start..end).collect();
        self.take(&rows)
    }

    pub fn head(&self, n: usize) -> Frame {
        self.slice(0, n)
    }

    /// Keep rows where `mask` is true.
    pub fn filter(&self, mask: &[bool]) -> Result<Frame, FlightError> {
        if mask.len() != self.len() {
            return Err(FlightError::LengthMismatch {
                expected: self.len(),
                found: mask.len(),
            });
        }
        let rows: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, keep)| keep.then_some(i))
            .collect();
        Ok(self.take(&rows))
    }

    /// Stable sort of the rows by index label.
    pub fn sort_by_index(&self) -> Frame {
        self.take(&self.index.argsort())
    }

    /// Stack frames vertically.
    ///
    /// All parts must have the same column names in the same order and indexes of
    /// the same kind. `Int`/`Float` columns are promoted to `Float` when mixed.
    pub fn concat(parts: &[&Frame]) -> Result<Frame, FlightError> {
        let Some(first) = parts.first() else {
            return Ok(Frame::new(RowIndex::range(0)));
        };
        let names: Vec<&str> = first.column_names().collect();
        for part in &parts[1..] {
            if !part.column_names().eq(names.iter().copied()) {
                return Err(FlightError::IncompatibleFrames(format!(
                    "column sets differ: [{}] vs [{}]",
                    names.iter().join(", "),
                    part.column_names().join(", ")
                )));
            }
        }

        let index = RowIndex::concat(&parts.iter().map(|p| &p.index).collect::<Vec<_>>())?;
        let mut columns = Vec::with_capacity(names.len());
        for (pos, name) in names.iter().enumerate() {
            let pieces: Vec<&Column> = parts.iter().map(|p| p.columns[pos].1.as_ref()).collect();
            columns.push((name.to_string(), Arc::new(Column::concat(name, &pieces)?)));
        }
        Ok(Frame { index, columns })
    }

    /// Place the columns of `other` after those of `self` (duplicates allowed).
    pub fn hconcat(&self, other: &Frame) -> Result<Frame, FlightError> {
        if other.len() != self.len() {
            return Err(FlightError::LengthMismatch {
                expected: self.len(),
                found: other.len(),
            });
        }
        let mut out = self.clone();
        out.columns.extend(other.columns.iter().cloned());
        Ok(out)
    }

    /// Move an integer or text column into the row index.
    pub fn set_index(&self, name: &str) -> Result<Frame, FlightError> {
        let index = match self.column(name)? {
            Column::Int(v) => RowIndex::ints(name, v.clone()),
            Column::Text(v) => RowIndex::labels(
                name,
                v.iter().map(|s| s.clone().unwrap_or_default()).collect(),
            ),
            other => {
                return Err(FlightError::ColumnTypeMismatch {
                    column: name.to_string(),
                    expected: "int or text",
                    found: other.dtype().name(),
                })
            }
        };
        Ok(Frame {
            index,
            columns: self.drop_columns(&[name]).columns,
        })
    }

    /// Move a column into the row index as epochs.
    ///
    /// Text values are parsed as dates (`2024-01-01T00:00:00 UTC`, timescale
    /// defaults to UTC); numeric values are read as Unix seconds. A missing or
    /// non-finite numeric value is a [`FlightError::TimeParse`].
    pub fn set_time_index(&self, name: &str) -> Result<Frame, FlightError> {
        let epochs = match self.column(name)? {
            Column::Text(v) => v
                .iter()
                .map(|s| {
                    let s = s.as_deref().unwrap_or_default();
                    Epoch::from_str(s).map_err(|e| FlightError::TimeParse(format!("{s}: {e}")))
                })
                .collect::<Result<Vec<_>, _>>()?,
            Column::Int(v) => v.iter().map(|&s| Epoch::from_unix_seconds(s as f64)).collect(),
            Column::Float(v) => v
                .iter()
                .map(|&s| {
                    if s.is_finite() {
                        Ok(Epoch::from_unix_seconds(s))
                    } else {
                        Err(FlightError::TimeParse(format!("{name}: non-finite time {s}")))
                    }
                })
                .collect::<Result<Vec<_>, _>>()?,
            Column::Geometry(_) => {
                return Err(FlightError::ColumnTypeMismatch {
                    column: name.to_string(),
                    expected: "text or numeric",
                    found: "geometry",
                })
            }
        };
        Ok(Frame {
            index: RowIndex::time(name, epochs),
            columns: self.drop_columns(&[name]).columns,
        })
    }
}

#[cfg(test)]
mod test_frame {
    use super::*;

    fn sample() -> Frame {
        Frame::from_columns([
            ("id", Column::from(vec!["a", "b", "c"])),
            ("v", Column::from(vec![1.0, 2.0, 3.0])),
        ])
        .unwrap()
    }

    #[test]
    fn test_insert_replaces_unique_column() {
        let mut f = sample();
        f.insert_column("v", Column::from(vec![9.0, 9.0, 9.0])).unwrap();
        assert_eq!(f.width(), 2);
        assert_eq!(f.column("v").unwrap(), &Column::Float(vec![9.0; 3]));
    }

    #[test]
    fn test_duplicate_columns_are_ambiguous() {
        let mut f = sample();
        f.push_column("v", Column::from(vec![0.0; 3])).unwrap();
        assert_eq!(f.occurrences("v"), 2);
        assert_eq!(f.column("v"), Err(FlightError::AmbiguousColumn("v".into())));
    }

    #[test]
    fn test_length_is_checked() {
        let mut f = sample();
        assert_eq!(
            f.insert_column("w", Column::from(vec![1.0])),
            Err(FlightError::LengthMismatch {
                expected: 3,
                found: 1
            })
        );
    }

    #[test]
    fn test_copy_on_write() {
        let source = sample();
        let mut view = source.select(&["v"]).unwrap();
        if let Column::Float(v) = view.column_mut("v").unwrap() {
            v[0] = 100.0;
        }
        assert_eq!(source.column("v").unwrap(), &Column::Float(vec![1.0, 2.0, 3.0]));
        assert_eq!(view.column("v").unwrap(), &Column::Float(vec![100.0, 2.0, 3.0]));
    }

    #[test]
    fn test_concat_and_filter() {
        let f = sample();
        let both = Frame::concat(&[&f, &f]).unwrap();
        assert_eq!(both.len(), 6);
        let kept = both.filter(&[true, false, false, false, false, true]).unwrap();
        assert_eq!(kept.column("id").unwrap(), &Column::from(vec!["a", "c"]));
    }

    #[test]
    fn test_set_time_index_from_unix_seconds() {
        let f = Frame::from_columns([
            ("t", Column::Int(vec![0, 60])),
            ("v", Column::from(vec![1.0, 2.0])),
        ])
        .unwrap();
        let f = f.set_time_index("t").unwrap();
        assert!(f.index().is_time());
        assert!(!f.contains("t"));
        let times = f.index().as_time().unwrap();
        assert_eq!((times[1] - times[0]).to_seconds(), 60.0);
    }
}
