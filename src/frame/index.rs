use std::cmp::Ordering;

use hifitime::Epoch;

use crate::collection::key::KeyValue;
use crate::flight_errors::FlightError;

/// Values of a row index.
#[derive(Debug, Clone, PartialEq)]
pub enum IndexValues {
    Int(Vec<i64>),
    Label(Vec<String>),
    Time(Vec<Epoch>),
}

/// Row labels of a [`Frame`](crate::frame::Frame).
///
/// The index orders rows for sorting and, when it holds epochs, is the time
/// axis used by the splitter and the resampler.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIndex {
    name: Option<String>,
    values: IndexValues,
}

impl RowIndex {
    /// Positional index `0..n`.
    pub fn range(n: usize) -> Self {
        RowIndex {
            name: None,
            values: IndexValues::Int((0..n as i64).collect()),
        }
    }

    pub fn time(name: impl Into<String>, values: Vec<Epoch>) -> Self {
        RowIndex {
            name: Some(name.into()),
            values: IndexValues::Time(values),
        }
    }

    pub fn ints(name: impl Into<String>, values: Vec<i64>) -> Self {
        RowIndex {
            name: Some(name.into()),
            values: IndexValues::Int(values),
        }
    }

    pub fn labels(name: impl Into<String>, values: Vec<String>) -> Self {
        RowIndex {
            name: Some(name.into()),
            values: IndexValues::Label(values),
        }
    }

    pub fn from_parts(name: Option<String>, values: IndexValues) -> Self {
        RowIndex { name, values }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn values(&self) -> &IndexValues {
        &self.values
    }

    pub fn len(&self) -> usize {
        match &self.values {
            IndexValues::Int(v) => v.len(),
            IndexValues::Label(v) => v.len(),
            IndexValues::Time(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_time(&self) -> bool {
        matches!(self.values, IndexValues::Time(_))
    }

    pub fn as_time(&self) -> Option<&[Epoch]> {
        match &self.values {
            IndexValues::Time(v) => Some(v),
            _ => None,
        }
    }

    pub fn take(&self, rows: &[usize]) -> RowIndex {
        let values = match &self.values {
            IndexValues::Int(v) => IndexValues::Int(rows.iter().map(|&i| v[i]).collect()),
            IndexValues::Label(v) => {
                IndexValues::Label(rows.iter().map(|&i| v[i].clone()).collect())
            }
            IndexValues::Time(v) => IndexValues::Time(rows.iter().map(|&i| v[i]).collect()),
        };
        RowIndex {
            name: self.name.clone(),
            values,
        }
    }

    pub fn key_at(&self, i: usize) -> KeyValue {
        match &self.values {
            IndexValues::Int(v) => KeyValue::Int(v[i]),
            IndexValues::Label(v) => KeyValue::Text(v[i].clone()),
            IndexValues::Time(v) => KeyValue::Time(v[i]),
        }
    }

    /// Compare the labels of rows `a` and `b`.
    pub(crate) fn cmp_rows(&self, a: usize, b: usize) -> Ordering {
        match &self.values {
            IndexValues::Int(v) => v[a].cmp(&v[b]),
            IndexValues::Label(v) => v[a].cmp(&v[b]),
            IndexValues::Time(v) => v[a].partial_cmp(&v[b]).unwrap_or(Ordering::Equal),
        }
    }

    /// Row positions in ascending label order; ties keep their original order.
    pub fn argsort(&self) -> Vec<usize> {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.sort_by(|&a, &b| self.cmp_rows(a, b));
        order
    }

    pub(crate) fn label(&self, i: usize) -> String {
        self.key_at(i).to_string()
    }

    /// Concatenate indexes of the same kind. The name of the first part is kept.
    pub fn concat(parts: &[&RowIndex]) -> Result<RowIndex, FlightError> {
        let Some(first) = parts.first() else {
            return Ok(RowIndex::range(0));
        };
        let mut values = first.values.clone();
        for part in &parts[1..] {
            match (&mut values, &part.values) {
                (IndexValues::Int(a), IndexValues::Int(b)) => a.extend_from_slice(b),
                (IndexValues::Label(a), IndexValues::Label(b)) => a.extend_from_slice(b),
                (IndexValues::Time(a), IndexValues::Time(b)) => a.extend_from_slice(b),
                _ => {
                    return Err(FlightError::IncompatibleFrames(
                        "row indexes have different kinds".into(),
                    ))
                }
            }
        }
        Ok(RowIndex {
            name: first.name.clone(),
            values,
        })
    }
}

#[cfg(test)]
mod test_index {
    use super::*;
    use hifitime::Unit;

    #[test]
    fn test_argsort_is_stable() {
        let index = RowIndex::ints("t", vec![3, 1, 3, 0]);
        assert_eq!(index.argsort(), vec![3, 1, 0, 2]);
    }

    #[test]
    fn test_time_argsort() {
        let t0 = Epoch::from_gregorian_utc_at_midnight(2024, 1, 1);
        let index = RowIndex::time("time", vec![t0 + Unit::Second * 10, t0, t0 + Unit::Second * 5]);
        assert_eq!(index.argsort(), vec![1, 2, 0]);
        assert!(index.is_time());
    }

    #[test]
    fn test_concat_requires_same_kind() {
        let a = RowIndex::range(2);
        let b = RowIndex::labels("id", vec!["x".into()]);
        assert!(RowIndex::concat(&[&a, &b]).is_err());
        let c = RowIndex::concat(&[&a, &RowIndex::range(1)]).unwrap();
        assert_eq!(c.values(), &IndexValues::Int(vec![0, 1, 0]));
    }
}
