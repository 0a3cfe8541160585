//! Time helpers: frequency strings and grid buckets.
//!
//! Frequencies are written as an optional integer count followed by a unit
//! alias, e.g. `"250ms"`, `"1s"`, `"30min"`, `"5T"`, `"2h"`, `"1D"`. A missing
//! count means one unit (`"min"` is one minute).
use hifitime::{Duration, Epoch, Unit};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::flight_errors::FlightError;

const FREQUENCY_PATTERN: &str = r"^\s*(\d+)?\s*([A-Za-z]+)\s*$";

/// Compiled once on the first call to [`parse_frequency`].
static FREQUENCY_RE: OnceCell<Regex> = OnceCell::new();

fn unit_from_alias(alias: &str) -> Option<Unit> {
    let unit = match alias {
        "ns" | "N" => Unit::Nanosecond,
        "us" | "U" => Unit::Microsecond,
        "ms" | "L" => Unit::Millisecond,
        "s" | "S" | "sec" => Unit::Second,
        "min" | "T" => Unit::Minute,
        "h" | "H" => Unit::Hour,
        "d" | "D" => Unit::Day,
        _ => return None,
    };
    Some(unit)
}

/// Parse a frequency string into a [`Duration`].
///
/// Arguments
/// -----------------
/// * `freq` – Frequency such as `"1s"` or `"30min"`.
///
/// Return
/// ----------
/// * The strictly positive duration, or [`FlightError::InvalidFrequency`] if the
///   string does not match `<count><unit>` or the count is zero.
pub fn parse_frequency(freq: &str) -> Result<Duration, FlightError> {
    let re = FREQUENCY_RE
        .get_or_try_init(|| Regex::new(FREQUENCY_PATTERN))
        .map_err(|e| FlightError::InvalidFrequency(e.to_string()))?;
    let invalid = || FlightError::InvalidFrequency(freq.to_string());

    let caps = re.captures(freq).ok_or_else(invalid)?;
    let count = match caps.get(1) {
        Some(m) => m.as_str().parse::<i64>().map_err(|_| invalid())?,
        None => 1,
    };
    let unit = caps
        .get(2)
        .and_then(|m| unit_from_alias(m.as_str()))
        .ok_or_else(invalid)?;

    if count == 0 {
        return Err(invalid());
    }
    Ok(unit * count)
}

/// Assigns epochs to the buckets of a regular grid.
///
/// The grid starts at the first epoch floored to the frequency and steps by
/// `freq`; bucket `k` covers `[origin + k * freq, origin + (k + 1) * freq)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeGrid {
    origin: Epoch,
    step_ns: i128,
}

impl TimeGrid {
    pub fn new(first: Epoch, freq: Duration) -> Result<Self, FlightError> {
        let step_ns = freq.total_nanoseconds();
        if step_ns <= 0 {
            return Err(FlightError::InvalidParameter(format!(
                "resampling frequency must be positive, got {freq}"
            )));
        }
        Ok(TimeGrid {
            origin: first.floor(freq),
            step_ns,
        })
    }

    pub fn bucket(&self, epoch: Epoch) -> i64 {
        let offset = (epoch - self.origin).total_nanoseconds();
        offset.div_euclid(self.step_ns) as i64
    }

    pub fn epoch(&self, bucket: i64) -> Epoch {
        self.origin + Duration::from_total_nanoseconds(self.step_ns * bucket as i128)
    }
}
