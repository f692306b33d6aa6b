use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Rejected coordinate input.
#[derive(Debug, Error, Clone, PartialEq, Serialize, Deserialize)]
pub enum CoordinateError {
    /// Latitude outside [-90, 90] or not finite.
    #[error("Latitude {0} is out of range (-90 to 90)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180] or not finite.
    #[error("Longitude {0} is out of range (-180 to 180)")]
    InvalidLongitude(f64),
}

/// A WGS84 latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl GeoCoordinate {
    /// Creates a validated coordinate.
    ///
    /// # Errors
    /// Returns `CoordinateError` if either component is out of range or not finite.
    pub fn new(lat: f64, lng: f64) -> Result<Self, CoordinateError> {
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(CoordinateError::InvalidLatitude(lat));
        }
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(CoordinateError::InvalidLongitude(lng));
        }
        Ok(Self { lat, lng })
    }

    /// Creates a coordinate without range checks.
    ///
    /// For values coming from a trusted source such as the map widget or a
    /// device fix.
    pub const fn new_unchecked(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat, self.lng)
    }
}

/// Latitude/longitude extent of a camera viewport, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl Span {
    pub const fn new(latitude_delta: f64, longitude_delta: f64) -> Self {
        Self {
            latitude_delta,
            longitude_delta,
        }
    }

    /// Same extent on both axes.
    pub const fn square(delta: f64) -> Self {
        Self::new(delta, delta)
    }
}

/// The visible viewport of a map: center plus span.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRegion {
    pub latitude: f64,
    pub longitude: f64,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl CameraRegion {
    pub fn centered_on(center: GeoCoordinate, span: Span) -> Self {
        Self {
            latitude: center.lat,
            longitude: center.lng,
            latitude_delta: span.latitude_delta,
            longitude_delta: span.longitude_delta,
        }
    }

    pub fn center(&self) -> GeoCoordinate {
        GeoCoordinate::new_unchecked(self.latitude, self.longitude)
    }

    /// Returns true if `point` lies inside the viewport (edges inclusive).
    pub fn contains(&self, point: GeoCoordinate) -> bool {
        let half_lat = self.latitude_delta / 2.0;
        let half_lng = self.longitude_delta / 2.0;
        (point.lat - self.latitude).abs() <= half_lat && (point.lng - self.longitude).abs() <= half_lng
    }
}
