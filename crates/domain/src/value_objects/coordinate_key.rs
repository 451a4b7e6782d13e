//! Rounded coordinate key used for cache lookups

use serde::{Deserialize, Serialize};
use std::fmt;

use super::GeoLocation;

/// Scale for four decimal places (about 11 m at the equator)
const SCALE: f64 = 10_000.0;

/// Coordinates rounded to four decimal places, stored as integers so the key
/// is `Eq + Hash`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinateKey {
    lat_e4: i32,
    lon_e4: i32,
}

impl CoordinateKey {
    /// Round a location to the cache grid
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_location(location: &GeoLocation) -> Self {
        // Valid WGS84 values scaled by 1e4 fit comfortably in i32
        Self {
            lat_e4: (location.latitude() * SCALE).round() as i32,
            lon_e4: (location.longitude() * SCALE).round() as i32,
        }
    }

    /// Rounded latitude in degrees
    #[must_use]
    pub fn latitude(&self) -> f64 {
        f64::from(self.lat_e4) / SCALE
    }

    /// Rounded longitude in degrees
    #[must_use]
    pub fn longitude(&self) -> f64 {
        f64::from(self.lon_e4) / SCALE
    }
}

impl From<&GeoLocation> for CoordinateKey {
    fn from(location: &GeoLocation) -> Self {
        Self::from_location(location)
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude(), self.longitude())
    }
}
