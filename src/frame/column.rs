use std::fmt;

use geo::Point;

use crate::collection::key::KeyValue;
use crate::flight_errors::FlightError;

/// Storage type of a [`Column`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DType {
    Float,
    Int,
    Text,
    Geometry,
}

impl DType {
    pub fn name(self) -> &'static str {
        match self {
            DType::Float => "float",
            DType::Int => "int",
            DType::Text => "text",
            DType::Geometry => "geometry",
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One column of a [`Frame`](crate::frame::Frame).
///
/// Missing values are `NaN` for `Float` and `None` for `Text`; `Int` and
/// `Geometry` columns have no missing marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Float(Vec<f64>),
    Int(Vec<i64>),
    Text(Vec<Option<String>>),
    Geometry(Vec<Point<f64>>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
            Column::Text(v) => v.len(),
            Column::Geometry(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dtype(&self) -> DType {
        match self {
            Column::Float(_) => DType::Float,
            Column::Int(_) => DType::Int,
            Column::Text(_) => DType::Text,
            Column::Geometry(_) => DType::Geometry,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Float(_) | Column::Int(_))
    }

    /// Gather rows by position. Positions may repeat.
    pub fn take(&self, rows: &[usize]) -> Column {
        match self {
            Column::Float(v) => Column::Float(rows.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(rows.iter().map(|&i| v[i]).collect()),
            Column::Text(v) => Column::Text(rows.iter().map(|&i| v[i].clone()).collect()),
            Column::Geometry(v) => Column::Geometry(rows.iter().map(|&i| v[i]).collect()),
        }
    }

    /// Numeric values as `f64`.
    ///
    /// Arguments
    /// -----------------
    /// * `name` – Column name, used in the error message only.
    ///
    /// Return
    /// ----------
    /// * The values, `Int` widened to `f64`, or
    ///   [`FlightError::ColumnTypeMismatch`] for text and geometry columns.
    pub fn to_f64(&self, name: &str) -> Result<Vec<f64>, FlightError> {
        match self {
            Column::Float(v) => Ok(v.clone()),
            Column::Int(v) => Ok(v.iter().map(|&x| x as f64).collect()),
            other => Err(FlightError::ColumnTypeMismatch {
                column: name.to_string(),
                expected: "numeric",
                found: other.dtype().name(),
            }),
        }
    }

    pub fn as_points(&self) -> Option<&[Point<f64>]> {
        match self {
            Column::Geometry(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_points_mut(&mut self) -> Option<&mut Vec<Point<f64>>> {
        match self {
            Column::Geometry(v) => Some(v),
            _ => None,
        }
    }

    /// Grouping key of row `i`; `None` for a missing value or a geometry column.
    pub fn key_at(&self, i: usize) -> Option<KeyValue> {
        match self {
            Column::Float(v) if v[i].is_nan() => None,
            Column::Float(v) => Some(KeyValue::Float(v[i].into())),
            Column::Int(v) => Some(KeyValue::Int(v[i])),
            Column::Text(v) => v[i].clone().map(KeyValue::Text),
            Column::Geometry(_) => None,
        }
    }

    /// Column of `n` copies of a key value, used to restore key columns.
    pub fn repeat_key(key: &KeyValue, n: usize) -> Result<Column, FlightError> {
        match key {
            KeyValue::Int(v) => Ok(Column::Int(vec![*v; n])),
            KeyValue::Float(v) => Ok(Column::Float(vec![v.into_inner(); n])),
            KeyValue::Text(v) => Ok(Column::Text(vec![Some(v.clone()); n])),
            KeyValue::Null => Ok(Column::Float(vec![f64::NAN; n])),
            KeyValue::Time(_) => Err(FlightError::Unsupported(
                "time-valued keys cannot be stored as a data column".into(),
            )),
        }
    }

    /// Concatenate columns vertically. `Int` and `Float` parts promote to `Float`.
    pub fn concat(name: &str, parts: &[&Column]) -> Result<Column, FlightError> {
        let Some(first) = parts.first() else {
            return Ok(Column::Float(Vec::new()));
        };

        let all_numeric = parts.iter().all(|c| c.is_numeric());
        let same_type = parts.iter().all(|c| c.dtype() == first.dtype());

        if same_type {
            let mut out = first.take(&[]);
            for part in parts {
                out.extend_from(name, part)?;
            }
            return Ok(out);
        }

        if all_numeric {
            let mut out = Vec::with_capacity(parts.iter().map(|c| c.len()).sum());
            for part in parts {
                out.extend(part.to_f64(name)?);
            }
            return Ok(Column::Float(out));
        }

        Err(FlightError::IncompatibleFrames(format!(
            "column '{name}' mixes {} and incompatible types",
            first.dtype()
        )))
    }

    fn extend_from(&mut self, name: &str, other: &Column) -> Result<(), FlightError> {
        match (self, other) {
            (Column::Float(a), Column::Float(b)) => a.extend_from_slice(b),
            (Column::Int(a), Column::Int(b)) => a.extend_from_slice(b),
            (Column::Text(a), Column::Text(b)) => a.extend_from_slice(b),
            (Column::Geometry(a), Column::Geometry(b)) => a.extend_from_slice(b),
            (a, b) => {
                return Err(FlightError::IncompatibleFrames(format!(
                    "column '{name}' mixes {} and {}",
                    a.dtype(),
                    b.dtype()
                )))
            }
        }
        Ok(())
    }

    /// Render one cell for display.
    pub(crate) fn cell(&self, i: usize) -> String {
        match self {
            Column::Float(v) if v[i].is_nan() => "NaN".to_string(),
            Column::Float(v) => format!("{}", v[i]),
            Column::Int(v) => v[i].to_string(),
            Column::Text(v) => v[i].clone().unwrap_or_else(|| "None".to_string()),
            Column::Geometry(v) => format!("POINT ({} {})", v[i].x(), v[i].y()),
        }
    }
}

impl From<Vec<f64>> for Column {
    fn from(v: Vec<f64>) -> Self {
        Column::Float(v)
    }
}

impl From<Vec<i64>> for Column {
    fn from(v: Vec<i64>) -> Self {
        Column::Int(v)
    }
}

impl From<Vec<String>> for Column {
    fn from(v: Vec<String>) -> Self {
        Column::Text(v.into_iter().map(Some).collect())
    }
}

impl From<Vec<&str>> for Column {
    fn from(v: Vec<&str>) -> Self {
        Column::Text(v.into_iter().map(|s| Some(s.to_string())).collect())
    }
}

impl From<Vec<Point<f64>>> for Column {
    fn from(v: Vec<Point<f64>>) -> Self {
        Column::Geometry(v)
    }
}
