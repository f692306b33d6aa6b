//! Core value types shared by the location-picker crates.
//!
//! Nothing in here performs I/O: coordinates, camera regions, device
//! positions and the permission vocabulary used by the screen controller.

pub mod coordinate;
pub mod permission;
pub mod position;

pub use coordinate::{CameraRegion, CoordinateError, GeoCoordinate, Span};
pub use permission::{PermissionKind, PermissionRationale, PermissionRequest, PermissionStatus};
pub use position::{LocationError, Position, PositionOptions};

use serde::{Deserialize, Serialize};

/// A modal dialog the host should present (title + body text).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}
