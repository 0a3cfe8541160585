//! Coordinate reference systems and the reprojection seam.
//!
//! The crate tags every geometry column with a [`Crs`] but carries no
//! projection mathematics: converting between systems is delegated to a
//! [`Reproject`] implementation supplied by the caller (a PROJ binding, a
//! hand-written Web Mercator, ...).
use std::fmt;
use std::hash::{Hash, Hasher};

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::constants::{EPSG_GEOGRAPHIC, EPSG_WEB_MERCATOR};
use crate::flight_errors::FlightError;

/// A coordinate reference system.
///
/// Two values are equal when they name the same EPSG code, so
/// `Crs::Epsg(4326) == Crs::Geographic`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum Crs {
    /// Longitude/latitude in degrees, WGS 84 (EPSG:4326).
    Geographic,
    /// Spherical Web Mercator in metres (EPSG:3857).
    WebMercator,
    /// Any other system, by EPSG code.
    Epsg(u32),
}

impl Crs {
    pub fn from_epsg(code: u32) -> Self {
        match code {
            EPSG_GEOGRAPHIC => Crs::Geographic,
            EPSG_WEB_MERCATOR => Crs::WebMercator,
            other => Crs::Epsg(other),
        }
    }

    pub fn epsg(self) -> u32 {
        match self {
            Crs::Geographic => EPSG_GEOGRAPHIC,
            Crs::WebMercator => EPSG_WEB_MERCATOR,
            Crs::Epsg(code) => code,
        }
    }

    pub fn is_geographic(self) -> bool {
        self.epsg() == EPSG_GEOGRAPHIC
    }
}

impl PartialEq for Crs {
    fn eq(&self, other: &Self) -> bool {
        self.epsg() == other.epsg()
    }
}

impl Eq for Crs {}

impl Hash for Crs {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.epsg().hash(state);
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EPSG:{}", self.epsg())
    }
}

/// Point transformation between two reference systems.
///
/// Implementations must return one point per input point, in order. Failures
/// should be reported as [`FlightError::Reprojection`].
pub trait Reproject {
    fn reproject(&self, from: Crs, to: Crs, points: &[Point<f64>]) -> Result<Vec<Point<f64>>, FlightError>;
}

impl<F> Reproject for F
where
    F: Fn(Crs, Crs, &[Point<f64>]) -> Result<Vec<Point<f64>>, FlightError>,
{
    fn reproject(&self, from: Crs, to: Crs, points: &[Point<f64>]) -> Result<Vec<Point<f64>>, FlightError> {
        self(from, to, points)
    }
}

#[cfg(test)]
mod test_crs {
    use super::*;

    #[test]
    fn test_epsg_round_trip() {
        assert_eq!(Crs::from_epsg(4326), Crs::Geographic);
        assert_eq!(Crs::from_epsg(3857), Crs::WebMercator);
        assert_eq!(Crs::from_epsg(2154), Crs::Epsg(2154));
        assert_eq!(Crs::Epsg(4326).epsg(), 4326);
        assert!(Crs::Epsg(4326).is_geographic());
        assert_eq!(Crs::WebMercator.to_string(), "EPSG:3857");
    }

    #[test]
    fn test_same_code_is_same_system() {
        use std::collections::HashSet;

        assert_eq!(Crs::Epsg(4326), Crs::Geographic);
        assert_eq!(Crs::Epsg(3857), Crs::WebMercator);
        assert_ne!(Crs::Epsg(2154), Crs::Geographic);

        let systems: HashSet<Crs> = [Crs::Geographic, Crs::Epsg(4326), Crs::Epsg(3857)]
            .into_iter()
            .collect();
        assert_eq!(systems.len(), 2);
        assert!(systems.contains(&Crs::WebMercator));
    }
}
