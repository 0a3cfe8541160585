//! # Semantic roles
//!
//! A **role** gives a meaning (altitude, velocity, …) to a column of a
//! trajectory table. This module holds:
//!
//! * [`Role`] – the fixed set of recognized roles and their synonym lists,
//! * [`RoleBinding`] – the optional role → column bindings carried by a
//!   [`Trajectory`](crate::trajectory::Trajectory),
//! * [`RoleOverrides`] – explicit column names supplied by a caller,
//! * [`resolve_role`] – the pure resolver turning a column set, an override
//!   and a prior binding into a concrete column name.
//!
//! Binding rules
//! -----------------
//! 1. An explicit override always wins.
//! 2. Otherwise a prior binding (inherited from a source trajectory) is reused.
//! 3. Otherwise the role's synonyms are scanned in priority order and the first
//!    present column is taken (an `info` record is logged).
//! 4. The resolved name must appear **exactly once** among the columns; if not,
//!    a required role fails and an optional role is left unbound.
//!
//! Latitude and longitude are only ever resolved at construction time: they are
//! consumed into the geometry column and are never stored in a [`RoleBinding`].
use std::fmt;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ALTITUDE_NAMES, ALTITUDE_RATE_NAMES, HEADING_NAMES, LATITUDE_NAMES, LONGITUDE_NAMES,
    VELOCITY_NAMES,
};
use crate::flight_errors::FlightError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Latitude,
    Longitude,
    Altitude,
    AltitudeRate,
    Velocity,
    Heading,
}

impl Role {
    /// Roles that stay bound after construction.
    pub const OPTIONAL: [Role; 4] = [
        Role::Altitude,
        Role::AltitudeRate,
        Role::Velocity,
        Role::Heading,
    ];

    /// Column-name synonyms scanned during auto-detection, highest priority first.
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Role::Latitude => LATITUDE_NAMES,
            Role::Longitude => LONGITUDE_NAMES,
            Role::Altitude => ALTITUDE_NAMES,
            Role::AltitudeRate => ALTITUDE_RATE_NAMES,
            Role::Velocity => VELOCITY_NAMES,
            Role::Heading => HEADING_NAMES,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Latitude => "latitude",
            Role::Longitude => "longitude",
            Role::Altitude => "altitude",
            Role::AltitudeRate => "altitude rate",
            Role::Velocity => "velocity",
            Role::Heading => "heading",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Column names bound to the optional roles of a trajectory.
///
/// `None` means unbound. A binding is only meaningful relative to a column set:
/// call [`RoleBinding::revalidate`] whenever that set changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleBinding {
    pub altitude: Option<String>,
    pub altitude_rate: Option<String>,
    pub velocity: Option<String>,
    pub heading: Option<String>,
}

impl RoleBinding {
    /// Column bound to `role`, if any. Latitude/longitude are never bound.
    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Altitude => self.altitude.as_deref(),
            Role::AltitudeRate => self.altitude_rate.as_deref(),
            Role::Velocity => self.velocity.as_deref(),
            Role::Heading => self.heading.as_deref(),
            Role::Latitude | Role::Longitude => None,
        }
    }

    /// Bind (or unbind with `None`) an optional role. Latitude/longitude are ignored.
    pub fn set(&mut self, role: Role, column: Option<String>) {
        match role {
            Role::Altitude => self.altitude = column,
            Role::AltitudeRate => self.altitude_rate = column,
            Role::Velocity => self.velocity = column,
            Role::Heading => self.heading = column,
            Role::Latitude | Role::Longitude => {}
        }
    }

    /// Keep a binding only if its column occurs exactly once in `columns`.
    ///
    /// This is the single finalize routine run by every operation that produces a
    /// new trajectory value. It never guesses a replacement column.
    pub fn revalidate<'a, I>(&mut self, columns: I)
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        for role in Role::OPTIONAL {
            let keep = match self.get(role) {
                Some(name) => occurrences(columns.clone(), name) == 1,
                None => continue,
            };
            if !keep {
                self.set(role, None);
            }
        }
    }
}

/// Explicit column names supplied at construction.
///
/// Every field is optional; unset fields fall back to inherited bindings and
/// then to auto-detection.
///
/// ```rust
/// use flightframe::roles::RoleOverrides;
///
/// let overrides = RoleOverrides::default()
///     .latitude("lat_deg")
///     .longitude("lon_deg")
///     .altitude("baroalt");
/// assert_eq!(overrides.altitude.as_deref(), Some("baroalt"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverrides {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
    pub altitude: Option<String>,
    pub altitude_rate: Option<String>,
    pub velocity: Option<String>,
    pub heading: Option<String>,
}

impl RoleOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, role: Role) -> Option<&str> {
        match role {
            Role::Latitude => self.latitude.as_deref(),
            Role::Longitude => self.longitude.as_deref(),
            Role::Altitude => self.altitude.as_deref(),
            Role::AltitudeRate => self.altitude_rate.as_deref(),
            Role::Velocity => self.velocity.as_deref(),
            Role::Heading => self.heading.as_deref(),
        }
    }

    pub fn latitude(mut self, v: impl Into<String>) -> Self {
        self.latitude = Some(v.into());
        self
    }
    pub fn longitude(mut self, v: impl Into<String>) -> Self {
        self.longitude = Some(v.into());
        self
    }
    pub fn altitude(mut self, v: impl Into<String>) -> Self {
        self.altitude = Some(v.into());
        self
    }
    pub fn altitude_rate(mut self, v: impl Into<String>) -> Self {
        self.altitude_rate = Some(v.into());
        self
    }
    pub fn velocity(mut self, v: impl Into<String>) -> Self {
        self.velocity = Some(v.into());
        self
    }
    pub fn heading(mut self, v: impl Into<String>) -> Self {
        self.heading = Some(v.into());
        self
    }
}

fn occurrences<'a, I>(columns: I, name: &str) -> usize
where
    I: IntoIterator<Item = &'a str>,
{
    columns.into_iter().filter(|c| *c == name).count()
}

/// Resolve the column bound to `role`.
///
/// Arguments
/// -----------------
/// * `columns` – Column names of the table, in order (duplicates allowed).
/// * `role` – The role to resolve.
/// * `override_name` – Explicit column name; wins unconditionally.
/// * `prior` – Binding inherited from a source trajectory, used when no override is given.
/// * `required` – Whether an unresolved role is an error.
///
/// Return
/// ----------
/// * `Ok(Some(name))` – the role is bound to a column present exactly once.
/// * `Ok(None)` – optional role left unbound.
/// * `Err(FlightError::MissingRequiredRole)` – required role not found.
/// * `Err(FlightError::AmbiguousRole)` – required role names a duplicated column.
pub fn resolve_role<'a, I>(
    columns: I,
    role: Role,
    override_name: Option<&str>,
    prior: Option<&str>,
    required: bool,
) -> Result<Option<String>, FlightError>
where
    I: IntoIterator<Item = &'a str> + Clone,
{
    let resolved = match override_name.or(prior) {
        Some(name) => Some(name.to_string()),
        None => {
            let detected = role
                .candidates()
                .iter()
                .copied()
                .find(|candidate| occurrences(columns.clone(), candidate) > 0)
                .map(|candidate| candidate.to_string());
            if let Some(name) = &detected {
                info!("Found {role} column: {name}");
            }
            detected
        }
    };

    let Some(name) = resolved else {
        return if required {
            Err(FlightError::MissingRequiredRole(role))
        } else {
            Ok(None)
        };
    };

    match occurrences(columns, &name) {
        1 => Ok(Some(name)),
        0 if required => Err(FlightError::MissingRequiredRole(role)),
        0 => Ok(None),
        count if required => Err(FlightError::AmbiguousRole {
            role,
            column: name,
            count,
        }),
        count => {
            warn!("{role} column '{name}' appears {count} times, leaving it unbound");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod test_roles {
    use super::*;

    const COLUMNS: [&str; 5] = ["lat", "lon", "baroalt", "geoaltitude", "gs"];

    #[test]
    fn test_synonym_priority() {
        // "geoaltitude" precedes "baroalt" in the altitude list.
        let alt = resolve_role(COLUMNS, Role::Altitude, None, None, false).unwrap();
        assert_eq!(alt.as_deref(), Some("geoaltitude"));

        let vel = resolve_role(COLUMNS, Role::Velocity, None, None, false).unwrap();
        assert_eq!(vel.as_deref(), Some("gs"));
    }

    #[test]
    fn test_override_wins_over_prior_and_scan() {
        let alt = resolve_role(COLUMNS, Role::Altitude, Some("baroalt"), Some("geoaltitude"), false)
            .unwrap();
        assert_eq!(alt.as_deref(), Some("baroalt"));
    }

    #[test]
    fn test_prior_is_reused() {
        let alt = resolve_role(COLUMNS, Role::Altitude, None, Some("baroalt"), false).unwrap();
        assert_eq!(alt.as_deref(), Some("baroalt"));
    }

    #[test]
    fn test_missing_column() {
        assert_eq!(
            resolve_role(COLUMNS, Role::Heading, None, None, false).unwrap(),
            None
        );
        assert_eq!(
            resolve_role(COLUMNS, Role::Heading, Some("hdg"), None, true),
            Err(FlightError::MissingRequiredRole(Role::Heading))
        );
    }

    #[test]
    fn test_ambiguous_column() {
        let cols = ["lat", "lat", "lon"];
        assert_eq!(
            resolve_role(cols, Role::Latitude, None, None, true),
            Err(FlightError::AmbiguousRole {
                role: Role::Latitude,
                column: "lat".into(),
                count: 2
            })
        );
        let cols = ["alt", "alt"];
        assert_eq!(
            resolve_role(cols, Role::Altitude, None, None, false).unwrap(),
            None
        );
    }

    #[test]
    fn test_revalidate_clears_stale_bindings() {
        let mut binding = RoleBinding {
            altitude: Some("alt".into()),
            velocity: Some("gs".into()),
            heading: Some("trk".into()),
            ..Default::default()
        };
        binding.revalidate(["alt", "gs", "gs"]);
        assert_eq!(binding.altitude.as_deref(), Some("alt"));
        assert_eq!(binding.velocity, None);
        assert_eq!(binding.heading, None);
    }
}
