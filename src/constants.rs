//! # Constants and type definitions for flightframe
//!
//! This module centralizes the **default names** and **default parameters**
//! shared across the crate.
//!
//! ## Overview
//!
//! - Default column names created by the crate (geometry, split id)
//! - Default gap threshold of the time-gap splitter
//! - EPSG codes of the two reference systems the crate names explicitly
//! - Column-name synonyms used by role auto-detection

use hifitime::{Duration, Unit};

// -------------------------------------------------------------------------------------------------
// Default names
// -------------------------------------------------------------------------------------------------

/// Name of the point column created from latitude/longitude.
pub const GEOMETRY_COLUMN: &str = "geometry";

/// Name of the column written by the time-gap splitter.
pub const SPLIT_COLUMN: &str = "split";

// -------------------------------------------------------------------------------------------------
// Default parameters
// -------------------------------------------------------------------------------------------------

/// Default gap threshold for the time-gap splitter (30 minutes).
pub fn default_gap() -> Duration {
    Unit::Minute * 30
}

// -------------------------------------------------------------------------------------------------
// Reference systems
// -------------------------------------------------------------------------------------------------

/// Geographic coordinates in degrees (WGS 84).
pub const EPSG_GEOGRAPHIC: u32 = 4326;

/// Spherical Web Mercator, metres.
pub const EPSG_WEB_MERCATOR: u32 = 3857;

// -------------------------------------------------------------------------------------------------
// Role synonyms
// -------------------------------------------------------------------------------------------------

/// Candidate column names, tried in order, for each role.
pub const LATITUDE_NAMES: &[&str] = &["lat", "latitude"];
pub const LONGITUDE_NAMES: &[&str] = &["lon", "long", "longitude"];
pub const ALTITUDE_NAMES: &[&str] = &[
    "alt",
    "altitude",
    "baroaltitude",
    "geoaltitude",
    "baroalt",
    "geoalt",
];
pub const ALTITUDE_RATE_NAMES: &[&str] = &["vertrate", "alt_rate", "baroalt_rate", "geoalt_rate"];
pub const VELOCITY_NAMES: &[&str] = &["velocity", "groundspeed", "spd", "gs", "speed"];
pub const HEADING_NAMES: &[&str] = &["heading", "track", "hdg", "trk"];
