//! Collaborator interfaces the host platform implements.
//!
//! The controller never touches platform APIs directly; a mobile shell,
//! desktop map widget or test harness plugs in through these traits.

use async_trait::async_trait;
use picker_network::{GeocodeError, NominatimClient, Place};
use picker_types::{
    CameraRegion, GeoCoordinate, LocationError, PermissionRequest, PermissionStatus, Position,
    PositionOptions,
};
use std::time::Duration;
use thiserror::Error;

/// An opaque failure reported by the platform.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Platform error: {0}")]
pub struct PlatformError(pub String);

/// Runtime permission prompt.
#[async_trait]
pub trait PermissionGate: Send + Sync {
    async fn request(&self, request: &PermissionRequest) -> Result<PermissionStatus, PlatformError>;
}

/// One-shot device position query.
#[async_trait]
pub trait LocationSource: Send + Sync {
    async fn current_position(&self, options: PositionOptions) -> Result<Position, LocationError>;
}

/// Coordinate to address lookup.
#[async_trait]
pub trait ReverseGeocoder: Send + Sync {
    async fn reverse(&self, coords: GeoCoordinate) -> Result<Place, GeocodeError>;
}

#[async_trait]
impl ReverseGeocoder for NominatimClient {
    async fn reverse(&self, coords: GeoCoordinate) -> Result<Place, GeocodeError> {
        NominatimClient::reverse(self, coords).await
    }
}

/// Handle to a live map widget.
pub trait MapHandle: Send + Sync {
    fn animate_to_region(&self, region: CameraRegion, duration: Duration);

    /// Shows a single marker, or none.
    fn set_marker(&self, _marker: Option<GeoCoordinate>) {}
}

/// Screen navigation host.
pub trait Navigator: Send + Sync {
    fn go_back(&self);
}
