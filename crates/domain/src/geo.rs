// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Geographic points and great-circle distance.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in kilometres (IUGG).
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Kilometres spanned by one degree of latitude.
const KM_PER_DEGREE_LATITUDE: f64 = EARTH_RADIUS_KM * std::f64::consts::PI / 180.0;

/// A WGS84 coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, `-90..=90`.
    pub latitude: f64,
    /// Longitude in degrees, `-180..=180`.
    pub longitude: f64,
}

impl GeoPoint {
    /// Creates a validated point.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinates` if either value is not finite
    /// or out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        if !valid {
            return Err(DomainError::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Haversine great-circle distance to `other`, in kilometres.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let d_lat = lat2 - lat1;
        let d_lon = (other.longitude - self.longitude).to_radians();

        let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_KM * c
    }

    /// Latitude band `(min, max)` that contains every point within `radius_km`.
    ///
    /// Used as a cheap storage-side prefilter before the exact distance check.
    #[must_use]
    pub fn latitude_band(&self, radius_km: f64) -> (f64, f64) {
        let delta = radius_km / KM_PER_DEGREE_LATITUDE;
        (
            (self.latitude - delta).max(-90.0),
            (self.latitude + delta).min(90.0),
        )
    }
}

/// Validates a proximity search radius.
///
/// # Errors
///
/// Returns `DomainError::InvalidRadius` unless the radius is finite and positive.
pub fn validate_radius(radius_km: f64) -> Result<f64, DomainError> {
    if radius_km.is_finite() && radius_km > 0.0 {
        Ok(radius_km)
    } else {
        Err(DomainError::InvalidRadius(radius_km))
    }
}
