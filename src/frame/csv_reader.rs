//! # CSV ingestion
//!
//! Reads delimited text into a [`Frame`], inferring one [`Column`] type per
//! column:
//!
//! * every cell parses as an integer → `Int`,
//! * every non-empty cell parses as a float → `Float` (empty cells become `NaN`),
//! * otherwise → `Text` (empty cells become `None`).
//!
//! An optional column can be moved into the row index, either as labels or, with
//! `time_index`, as epochs (see [`Frame::set_time_index`]).
//!
//! ```rust,no_run
//! use camino::Utf8Path;
//! use flightframe::frame::{csv_reader::CsvOptions, Frame};
//!
//! # fn run() -> Result<(), flightframe::FlightError> {
//! let options = CsvOptions::default().index_column("time").time_index(true);
//! let frame = Frame::from_csv_path(Utf8Path::new("tracks.csv"), &options)?;
//! # Ok(()) }
//! ```
use std::fs::File;
use std::io;

use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use super::{Column, Frame, RowIndex};
use crate::flight_errors::FlightError;

/// Options for [`Frame::from_csv_reader`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvOptions {
    /// Field delimiter (default `,`).
    pub delimiter: u8,
    /// Column moved into the row index after reading.
    pub index_column: Option<String>,
    /// Parse the index column as epochs.
    pub time_index: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            delimiter: b',',
            index_column: None,
            time_index: false,
        }
    }
}

impl CsvOptions {
    pub fn delimiter(mut self, v: u8) -> Self {
        self.delimiter = v;
        self
    }
    pub fn index_column(mut self, v: impl Into<String>) -> Self {
        self.index_column = Some(v.into());
        self
    }
    pub fn time_index(mut self, v: bool) -> Self {
        self.time_index = v;
        self
    }
}

fn infer_column(cells: Vec<String>) -> Column {
    if !cells.is_empty() {
        if let Ok(ints) = cells
            .iter()
            .map(|c| c.trim().parse::<i64>())
            .collect::<Result<Vec<i64>, _>>()
        {
            return Column::Int(ints);
        }
    }

    let floats: Result<Vec<f64>, _> = cells
        .iter()
        .map(|c| match c.trim() {
            "" => Ok(f64::NAN),
            s => s.parse::<f64>(),
        })
        .collect();
    if let Ok(floats) = floats {
        return Column::Float(floats);
    }

    Column::Text(
        cells
            .into_iter()
            .map(|c| if c.is_empty() { None } else { Some(c) })
            .collect(),
    )
}

impl Frame {
    /// Read a frame from any CSV source with a header row.
    pub fn from_csv_reader<R: io::Read>(reader: R, options: &CsvOptions) -> Result<Frame, FlightError> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(options.delimiter)
            .has_headers(true)
            .from_reader(reader);

        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let mut cells: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
        for record in rdr.records() {
            let record = record?;
            for (col, value) in cells.iter_mut().zip(record.iter()) {
                col.push(value.to_string());
            }
        }

        let len = cells.first().map_or(0, Vec::len);
        let mut frame = Frame::new(RowIndex::range(len));
        for (name, values) in headers.into_iter().zip(cells) {
            frame.push_column(name, infer_column(values))?;
        }

        match (&options.index_column, options.time_index) {
            (Some(name), true) => frame.set_time_index(name),
            (Some(name), false) => frame.set_index(name),
            (None, _) => Ok(frame),
        }
    }

    /// Read a frame from a CSV file.
    pub fn from_csv_path(path: &Utf8Path, options: &CsvOptions) -> Result<Frame, FlightError> {
        let file = File::open(path)?;
        Frame::from_csv_reader(io::BufReader::new(file), options)
    }
}

#[cfg(test)]
mod test_csv_reader {
    use super::*;

    const DATA: &str = "\
time,callsign,lat,lon,alt
2024-01-01T00:00:00 UTC,AFR12,10.0,100.0,1000
2024-01-01T00:00:05 UTC,AFR12,10.5,100.5,
2024-01-01T00:00:10 UTC,,11.0,101.0,1200
";

    #[test]
    fn test_type_inference() {
        let frame = Frame::from_csv_reader(DATA.as_bytes(), &CsvOptions::default()).unwrap();
        assert_eq!(frame.len(), 3);
        assert!(matches!(frame.column("lat").unwrap(), Column::Float(_)));
        match frame.column("alt").unwrap() {
            Column::Float(v) => {
                assert_eq!(v[0], 1000.0);
                assert!(v[1].is_nan());
            }
            other => panic!("unexpected column {other:?}"),
        }
        assert_eq!(
            frame.column("callsign").unwrap(),
            &Column::Text(vec![Some("AFR12".into()), Some("AFR12".into()), None])
        );
    }

    #[test]
    fn test_time_index() {
        let options = CsvOptions::default().index_column("time").time_index(true);
        let frame = Frame::from_csv_reader(DATA.as_bytes(), &options).unwrap();
        let times = frame.index().as_time().unwrap();
        assert_eq!((times[2] - times[0]).to_seconds(), 10.0);
        assert_eq!(frame.index().name(), Some("time"));
    }

    #[test]
    fn test_missing_numeric_time_is_an_error() {
        let data = "t,lat,lon\n0,1.0,1.0\n,2.0,2.0\n20,3.0,3.0\n";
        let options = CsvOptions::default().index_column("t").time_index(true);
        assert!(matches!(
            Frame::from_csv_reader(data.as_bytes(), &options),
            Err(FlightError::TimeParse(_))
        ));
    }
}
