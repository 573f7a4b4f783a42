//! Geographic helpers for navigation data.
//!
//! Positions are plain longitude/latitude pairs in degrees. Distances are
//! great-circle (haversine) distances on a spherical earth, which is accurate
//! enough for disambiguating navaids and flagging implausible segments.

use serde::{Deserialize, Serialize};

/// Mean earth radius in meters (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Meters per international nautical mile.
pub const METERS_PER_NM: f64 = 1852.0;

/// A longitude/latitude position in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pos {
    /// Longitude in degrees, -180.0 to 180.0.
    pub lon: f64,
    /// Latitude in degrees, -90.0 to 90.0.
    pub lat: f64,
}

impl Pos {
    /// Create a new position from longitude and latitude.
    pub const fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_meters(&self, other: &Pos) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let dlat = (other.lat - self.lat).to_radians();
        let dlon = (other.lon - self.lon).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS_M * c
    }

    /// Great-circle distance to `other` in nautical miles.
    pub fn distance_nm(&self, other: &Pos) -> f64 {
        meters_to_nm(self.distance_meters(other))
    }
}

/// Convert meters to nautical miles.
#[inline]
pub fn meters_to_nm(meters: f64) -> f64 {
    meters / METERS_PER_NM
}

/// Bounding rectangle in degrees, stored for spatial queries.
///
/// `left`/`right` are longitudes, `top`/`bottom` latitudes. A rectangle that
/// crosses the antimeridian has `left > right`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl Rect {
    /// Smallest rectangle covering the segment between two positions.
    ///
    /// When the longitude span exceeds 180 degrees the shorter way round is
    /// across the antimeridian, so the rectangle wraps from the eastern
    /// longitude to the western one.
    pub fn from_segment(from: &Pos, to: &Pos) -> Self {
        let top = from.lat.max(to.lat);
        let bottom = from.lat.min(to.lat);
        let west = from.lon.min(to.lon);
        let east = from.lon.max(to.lon);

        if east - west > 180.0 {
            Self {
                left: east,
                top,
                right: west,
                bottom,
            }
        } else {
            Self {
                left: west,
                top,
                right: east,
                bottom,
            }
        }
    }
}
