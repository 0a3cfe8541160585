//! # Optional capabilities
//!
//! Some operations depend on optional machinery compiled in through cargo
//! features. [`Capabilities`] records what is available; it is resolved once
//! (usually with [`Capabilities::detect`]) and passed explicitly to the
//! constructors that need it, which fail fast when a requested mode is not
//! supported.
//!
//! | Flag | Feature | Used by |
//! |---|---|---|
//! | `nearest_neighbor` | `nearest` (rstar) | row recovery in [`RdpSimplifier`](crate::pipeline::simplifier::RdpSimplifier) |
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub nearest_neighbor: bool,
}

impl Capabilities {
    /// Capabilities compiled into this build.
    pub fn detect() -> Self {
        Capabilities {
            nearest_neighbor: cfg!(feature = "nearest"),
        }
    }

    /// No optional capability at all.
    pub fn none() -> Self {
        Capabilities {
            nearest_neighbor: false,
        }
    }
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::detect()
    }
}
