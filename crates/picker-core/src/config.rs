//! Screen configuration.

use crate::error::PickerError;
use picker_network::NominatimConfig;
use picker_types::{GeoCoordinate, PermissionRationale, PositionOptions, Span};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Map center used before any marker exists (Ho Chi Minh City).
pub const FALLBACK_CENTER: GeoCoordinate = GeoCoordinate::new_unchecked(10.7769, 106.7009);

/// Location picker configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PickerConfig {
    pub position_options: PositionOptions,
    pub fallback_center: GeoCoordinate,
    /// Span of the map's initial camera region.
    pub initial_span: Span,
    /// Span used when focusing the camera on the marker.
    pub focus_span: Span,
    pub focus_animation_ms: u64,
    /// Map widget draws the device's own position.
    pub shows_user_location: bool,
    /// Map camera tracks the device's position as it moves.
    pub follows_user_location: bool,
    pub permission_rationale: PermissionRationale,
    pub nominatim: NominatimConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            position_options: PositionOptions::default(),
            fallback_center: FALLBACK_CENTER,
            initial_span: Span::square(0.3),
            focus_span: Span::new(0.0922, 0.0421),
            focus_animation_ms: 1_000,
            shows_user_location: true,
            follows_user_location: true,
            permission_rationale: PermissionRationale::default(),
            nominatim: NominatimConfig::default(),
        }
    }
}

impl PickerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses and validates a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` on malformed JSON or invalid values.
    pub fn from_json(json: &str) -> Result<Self, PickerError> {
        let config: Self = serde_json::from_str(json).map_err(|e| PickerError::invalid_config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn position_options(mut self, options: PositionOptions) -> Self {
        self.position_options = options;
        self
    }

    pub fn fallback_center(mut self, center: GeoCoordinate) -> Self {
        self.fallback_center = center;
        self
    }

    pub fn initial_span(mut self, span: Span) -> Self {
        self.initial_span = span;
        self
    }

    pub fn focus_span(mut self, span: Span) -> Self {
        self.focus_span = span;
        self
    }

    pub fn focus_animation(mut self, duration: Duration) -> Self {
        self.focus_animation_ms = duration.as_millis() as u64;
        self
    }

    pub fn shows_user_location(mut self, shows: bool) -> Self {
        self.shows_user_location = shows;
        self
    }

    pub fn follows_user_location(mut self, follows: bool) -> Self {
        self.follows_user_location = follows;
        self
    }

    pub fn permission_rationale(mut self, rationale: PermissionRationale) -> Self {
        self.permission_rationale = rationale;
        self
    }

    pub fn nominatim(mut self, nominatim: NominatimConfig) -> Self {
        self.nominatim = nominatim;
        self
    }

    pub fn focus_animation_duration(&self) -> Duration {
        Duration::from_millis(self.focus_animation_ms)
    }

    /// # Errors
    /// Returns `InvalidConfiguration` describing the first invalid field.
    pub fn validate(&self) -> Result<(), PickerError> {
        if self.position_options.timeout_ms == 0 {
            return Err(PickerError::invalid_config("position timeout must be greater than zero"));
        }
        GeoCoordinate::new(self.fallback_center.lat, self.fallback_center.lng)
            .map_err(|e| PickerError::invalid_config(format!("fallback center: {}", e)))?;
        validate_span("initial span", self.initial_span)?;
        validate_span("focus span", self.focus_span)?;
        if self.nominatim.base_url.trim().is_empty() {
            return Err(PickerError::invalid_config("nominatim base_url is empty"));
        }
        if self.nominatim.user_agent.trim().is_empty() {
            return Err(PickerError::invalid_config("nominatim user_agent is empty"));
        }
        Ok(())
    }
}

fn validate_span(name: &str, span: Span) -> Result<(), PickerError> {
    let ok = |d: f64| d.is_finite() && d > 0.0;
    if ok(span.latitude_delta) && ok(span.longitude_delta) {
        Ok(())
    } else {
        Err(PickerError::invalid_config(format!(
            "{} must be positive, got {}/{}",
            name, span.latitude_delta, span.longitude_delta
        )))
    }
}
