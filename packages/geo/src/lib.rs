#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Geospatial primitives for the safety map.
//!
//! Provides the geohash codec used to key reports in the document store,
//! prefix range bounds for radius searches, and haversine great-circle
//! distance for exact post-filtering. Everything here is pure and
//! synchronous; only [`GeoPoint`] construction can fail.

pub mod distance;
pub mod geohash;

pub use distance::{EARTH_RADIUS_KM, haversine_km};
pub use geohash::{
    GEOHASH_ALPHABET, GeohashCell, GeohashRange, STORAGE_PRECISION, bounds_for_radius, decode,
    encode,
};

use serde::{Deserialize, Serialize};

/// Errors that can occur in geospatial computations.
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    /// Latitude or longitude outside the valid range.
    #[error("Invalid coordinate: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinate {
        /// The latitude that was provided.
        latitude: f64,
        /// The longitude that was provided.
        longitude: f64,
    },

    /// A geohash string contained a character outside the base-32 alphabet.
    #[error("Invalid geohash character: {character:?}")]
    InvalidGeohash {
        /// The offending character.
        character: char,
    },
}

/// A validated latitude/longitude pair in degrees.
///
/// Latitude is constrained to `[-90, 90]` and longitude to `[-180, 180]`.
/// Construction is the only fallible geospatial operation; every function
/// taking a `GeoPoint` is total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point, rejecting out-of-range (or non-finite) coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError::InvalidCoordinate`] if latitude is outside
    /// `[-90, 90]` or longitude is outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::InvalidCoordinate {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Constructs a point from values already known to be in range.
    pub(crate) const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Latitude in degrees.
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}
