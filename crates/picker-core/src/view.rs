use crate::config::FALLBACK_CENTER;
use crate::error::PickerError;
use picker_types::{CameraRegion, GeoCoordinate, Span};
use serde::Serialize;

pub const BACK_LABEL: &str = "Back";
pub const USE_CURRENT_LOCATION_LABEL: &str = "Get current location";
pub const CONFIRM_LABEL: &str = "Get location";

/// Everything the host needs to draw the screen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenView {
    pub marker: Option<GeoCoordinate>,
    /// Address banner text; `None` while no address has been resolved.
    pub address_banner: Option<String>,
    pub initial_region: CameraRegion,
    /// Draw the device's position dot on the map.
    pub shows_user_location: bool,
    /// Keep the camera following the device's position.
    pub follows_user_location: bool,
    pub back_label: &'static str,
    pub use_current_location_label: &'static str,
    pub confirm_label: &'static str,
    /// A reverse-geocode request is in flight.
    pub geocoding: bool,
    pub last_error: Option<PickerError>,
}

impl Default for ScreenView {
    fn default() -> Self {
        Self {
            marker: None,
            address_banner: None,
            initial_region: CameraRegion::centered_on(FALLBACK_CENTER, Span::square(0.3)),
            shows_user_location: true,
            follows_user_location: true,
            back_label: BACK_LABEL,
            use_current_location_label: USE_CURRENT_LOCATION_LABEL,
            confirm_label: CONFIRM_LABEL,
            geocoding: false,
            last_error: None,
        }
    }
}

impl ScreenView {
    pub fn shows_address_banner(&self) -> bool {
        self.address_banner.is_some()
    }
}
