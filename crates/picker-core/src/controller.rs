//! The location picker screen controller.
//!
//! Holds the marker, the resolved address and the map handle, and wires the
//! permission gate, location source, geocoder and map together.
//!
//! Every trigger issues a fresh request. Requests are tagged with a
//! generation number; a response whose generation is no longer the latest
//! is dropped, so the address always belongs to the last requested point.
//! A new geocode also cancels the one before it, so superseded lookups do
//! not hold rate-limiter slots.

use crate::config::PickerConfig;
use crate::error::PickerError;
use crate::platform::{LocationSource, MapHandle, Navigator, PermissionGate, ReverseGeocoder};
use crate::view::ScreenView;
use chrono::Utc;
use picker_network::{NominatimClient, Place};
use picker_types::{
    Alert, CameraRegion, GeoCoordinate, LocationError, PermissionRequest, PermissionStatus, Position,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Result of [`LocationPicker::on_mount`].
#[derive(Debug, Clone, PartialEq)]
pub enum MountOutcome {
    /// First mount: the permission flow ran and ended with this status.
    Mounted(PermissionStatus),
    /// The permission flow already ran for this screen.
    AlreadyMounted,
}

/// Result of a reverse-geocode request that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum GeocodeOutcome {
    /// The address was replaced with this place's display name.
    Applied(Place),
    /// A newer request was issued meanwhile; the response was dropped.
    Stale { coords: GeoCoordinate },
}

/// Result of a location acquisition that did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    /// The marker moved to the fix and a geocode was issued for it.
    Located {
        position: Position,
        geocode: Result<GeocodeOutcome, PickerError>,
    },
    /// A newer location request or a map tap superseded this request,
    /// whether it ended in a fix or an error.
    Superseded,
}

#[derive(Default)]
struct ScreenState {
    mounted: bool,
    disposed: bool,
    marker: Option<GeoCoordinate>,
    address: String,
    map: Option<Arc<dyn MapHandle>>,
    geocode_generation: u64,
    /// Cancels the latest geocode when a newer one starts.
    geocode_cancel: Option<CancellationToken>,
    location_generation: u64,
    geocodes_in_flight: usize,
    last_error: Option<PickerError>,
    pending_alert: Option<Alert>,
}

/// Headless controller for the "pick a location" screen.
///
/// All methods take `&self`; overlapping calls (rapid taps, a tap during a
/// location fix) are allowed and resolved by generation tags. Map handle
/// calls happen after the state lock is released, so a handle may call back
/// into the controller.
pub struct LocationPicker {
    config: PickerConfig,
    permissions: Arc<dyn PermissionGate>,
    locator: Arc<dyn LocationSource>,
    geocoder: Arc<dyn ReverseGeocoder>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<ScreenState>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for LocationPicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.lock();
        f.debug_struct("LocationPicker")
            .field("marker", &state.marker)
            .field("address", &state.address)
            .field("map_attached", &state.map.is_some())
            .field("disposed", &state.disposed)
            .finish()
    }
}

impl LocationPicker {
    pub fn builder() -> LocationPickerBuilder {
        LocationPickerBuilder::default()
    }

    fn lock(&self) -> MutexGuard<'_, ScreenState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `err` as the last error and hands it back.
    fn record(&self, err: PickerError) -> PickerError {
        self.lock().last_error = Some(err.clone());
        err
    }

    fn ensure_live(state: &ScreenState) -> Result<(), PickerError> {
        if state.disposed {
            Err(PickerError::Disposed)
        } else {
            Ok(())
        }
    }

    /// Moves the marker and returns the map handle to notify once the lock
    /// is released.
    fn place_marker(state: &mut ScreenState, coords: GeoCoordinate) -> Option<Arc<dyn MapHandle>> {
        state.marker = Some(coords);
        state.map.clone()
    }

    // ------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------

    /// Runs the permission flow. Only the first call per screen does anything.
    pub async fn on_mount(&self) -> Result<MountOutcome, PickerError> {
        {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            if state.mounted {
                debug!("already mounted, skipping permission flow");
                return Ok(MountOutcome::AlreadyMounted);
            }
            state.mounted = true;
        }
        self.request_permission().await.map(MountOutcome::Mounted)
    }

    /// Cancels in-flight work and releases the map handle.
    ///
    /// Results arriving afterwards are dropped; further operations return
    /// `PickerError::Disposed`.
    pub fn unmount(&self) {
        self.cancel.cancel();
        let released = {
            let mut state = self.lock();
            state.disposed = true;
            state.geocode_cancel = None;
            state.map.take()
        };
        drop(released);
        info!("location picker unmounted");
    }

    pub fn is_disposed(&self) -> bool {
        self.lock().disposed
    }

    /// Installs the handle of a freshly created map widget and shows the
    /// current marker on it.
    pub fn attach_map(&self, handle: Box<dyn MapHandle>) -> Result<(), PickerError> {
        let handle: Arc<dyn MapHandle> = Arc::from(handle);
        let marker = {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            state.map = Some(handle.clone());
            state.marker
        };
        handle.set_marker(marker);
        debug!("map handle attached");
        Ok(())
    }

    /// Releases the map handle, returning it to the caller.
    pub fn detach_map(&self) -> Option<Arc<dyn MapHandle>> {
        self.lock().map.take()
    }

    /// Region the map widget should start with: the marker if one exists,
    /// else the configured fallback center.
    pub fn initial_region(&self) -> CameraRegion {
        let center = self.lock().marker.unwrap_or(self.config.fallback_center);
        CameraRegion::centered_on(center, self.config.initial_span)
    }

    // ------------------------------------------------------------------
    // Permission and location
    // ------------------------------------------------------------------

    /// Asks for fine-location access; on grant, acquires the current location.
    ///
    /// Returns `Granted` even if the follow-up location request fails; that
    /// failure lands in [`LocationPicker::last_error`].
    pub async fn request_permission(&self) -> Result<PermissionStatus, PickerError> {
        Self::ensure_live(&self.lock())?;
        let request = PermissionRequest::fine_location(self.config.permission_rationale.clone());

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PickerError::Disposed),
            r = self.permissions.request(&request) => r,
        };

        match result {
            Ok(status) if status.is_granted() => {
                info!("location permission granted");
                let _ = self.acquire_current_location().await;
                Ok(status)
            }
            Ok(status) => {
                warn!(%status, "location permission denied");
                Err(self.record(PickerError::PermissionDenied { status }))
            }
            Err(e) => {
                warn!(error = %e, "location permission request failed");
                Err(self.record(PickerError::PermissionFailed(e.0)))
            }
        }
    }

    /// "Get current location" button.
    pub async fn on_use_current_location_pressed(&self) -> Result<LocationOutcome, PickerError> {
        self.acquire_current_location().await
    }

    /// One-shot device position; moves the marker and geocodes the fix.
    pub async fn acquire_current_location(&self) -> Result<LocationOutcome, PickerError> {
        let generation = {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            state.location_generation += 1;
            state.location_generation
        };
        let options = self.config.position_options;
        debug!(generation, timeout_ms = options.timeout_ms, "requesting current position");

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(PickerError::Disposed),
            r = tokio::time::timeout(options.timeout(), self.locator.current_position(options)) => r,
        };

        let position = match result {
            Ok(Ok(position)) => position,
            Ok(Err(e)) => return self.location_failed(generation, e),
            Err(_) => {
                let e = LocationError::Timeout {
                    timeout_ms: options.timeout_ms,
                };
                return self.location_failed(generation, e);
            }
        };

        let now = Utc::now();
        if !position.is_fresh(options.maximum_age(), now) {
            let e = LocationError::Stale {
                age_ms: position.age_at(now).as_millis() as u64,
                max_age_ms: options.maximum_age_ms,
            };
            return self.location_failed(generation, e);
        }

        let map = {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            if state.location_generation != generation {
                warn!(generation, "dropping superseded location fix");
                return Ok(LocationOutcome::Superseded);
            }
            state.last_error = None;
            Self::place_marker(&mut state, position.coords)
        };
        if let Some(map) = map {
            map.set_marker(Some(position.coords));
        }
        info!(lat = position.coords.lat, lng = position.coords.lng, "current location acquired");

        let geocode = self.reverse_geocode(position.coords).await;
        Ok(LocationOutcome::Located { position, geocode })
    }

    /// Records a location failure, unless a newer request or tap has taken
    /// over since `generation` was issued.
    fn location_failed(&self, generation: u64, e: LocationError) -> Result<LocationOutcome, PickerError> {
        let mut state = self.lock();
        Self::ensure_live(&state)?;
        if state.location_generation != generation {
            warn!(generation, error = %e, "dropping failure of superseded location request");
            return Ok(LocationOutcome::Superseded);
        }
        error!(generation, error = %e, "error getting location");
        let err = PickerError::LocationUnavailable(e);
        state.last_error = Some(err.clone());
        Err(err)
    }

    // ------------------------------------------------------------------
    // Geocoding and map events
    // ------------------------------------------------------------------

    /// Resolves `coords` to an address and shows it, unless a newer request
    /// was issued meanwhile.
    ///
    /// On failure the previous address stays in place.
    pub async fn reverse_geocode(&self, coords: GeoCoordinate) -> Result<GeocodeOutcome, PickerError> {
        let (generation, token) = {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            if let Some(previous) = state.geocode_cancel.take() {
                previous.cancel();
            }
            let token = self.cancel.child_token();
            state.geocode_cancel = Some(token.clone());
            state.geocode_generation += 1;
            state.geocodes_in_flight += 1;
            (state.geocode_generation, token)
        };
        debug!(generation, lat = coords.lat, lng = coords.lng, "reverse geocoding");

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => None,
            r = self.geocoder.reverse(coords) => Some(r),
        };

        let mut state = self.lock();
        state.geocodes_in_flight = state.geocodes_in_flight.saturating_sub(1);
        Self::ensure_live(&state)?;

        let Some(result) = result else {
            debug!(generation, "superseded geocode cancelled");
            return Ok(GeocodeOutcome::Stale { coords });
        };

        if state.geocode_generation != generation {
            warn!(generation, latest = state.geocode_generation, "dropping stale geocode response");
            return Ok(GeocodeOutcome::Stale { coords });
        }
        state.geocode_cancel = None;

        match result {
            Ok(place) => {
                info!(generation, address = %place.display_name, "address resolved");
                state.address = place.display_name.clone();
                state.last_error = None;
                Ok(GeocodeOutcome::Applied(place))
            }
            Err(e) => {
                error!(generation, lat = coords.lat, lng = coords.lng, error = %e, "reverse geocode failed");
                let err = PickerError::Geocode(e);
                state.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Map tap: moves the marker to `coords` and geocodes it.
    ///
    /// Also supersedes any location fix still in flight.
    pub async fn on_map_tapped(&self, coords: GeoCoordinate) -> Result<GeocodeOutcome, PickerError> {
        let map = {
            let mut state = self.lock();
            Self::ensure_live(&state)?;
            state.location_generation += 1;
            Self::place_marker(&mut state, coords)
        };
        if let Some(map) = map {
            map.set_marker(Some(coords));
        }
        debug!(lat = coords.lat, lng = coords.lng, "map tapped");
        self.reverse_geocode(coords).await
    }

    /// "Get location" button: an alert with the raw marker coordinates.
    pub fn on_confirm_pressed(&self) -> Result<Alert, PickerError> {
        let mut state = self.lock();
        Self::ensure_live(&state)?;
        match state.marker {
            Some(marker) => {
                let alert = Alert::new("Location", marker.to_string());
                state.pending_alert = Some(alert.clone());
                state.last_error = None;
                Ok(alert)
            }
            None => {
                warn!("confirm pressed with no marker");
                state.last_error = Some(PickerError::NoLocationSelected);
                Err(PickerError::NoLocationSelected)
            }
        }
    }

    /// Takes the alert waiting to be shown, if any.
    pub fn take_alert(&self) -> Option<Alert> {
        self.lock().pending_alert.take()
    }

    /// Address banner: animate the camera onto the marker.
    ///
    /// Returns whether an animation was started; needs both a marker and an
    /// attached map.
    pub fn on_address_banner_pressed(&self) -> bool {
        let (marker, map) = {
            let mut state = self.lock();
            let (Some(marker), Some(map)) = (state.marker, state.map.clone()) else {
                return false;
            };
            state.last_error = None;
            (marker, map)
        };
        let region = CameraRegion::centered_on(marker, self.config.focus_span);
        map.animate_to_region(region, self.config.focus_animation_duration());
        true
    }

    pub fn on_back_pressed(&self) {
        debug!("navigating back");
        self.navigator.go_back();
    }

    // ------------------------------------------------------------------
    // State
    // ------------------------------------------------------------------

    pub fn marker(&self) -> Option<GeoCoordinate> {
        self.lock().marker
    }

    pub fn address(&self) -> String {
        self.lock().address.clone()
    }

    pub fn last_error(&self) -> Option<PickerError> {
        self.lock().last_error.clone()
    }

    /// Snapshot for rendering.
    pub fn view(&self) -> ScreenView {
        let state = self.lock();
        let center = state.marker.unwrap_or(self.config.fallback_center);
        ScreenView {
            marker: state.marker,
            address_banner: (!state.address.is_empty()).then(|| state.address.clone()),
            initial_region: CameraRegion::centered_on(center, self.config.initial_span),
            shows_user_location: self.config.shows_user_location,
            follows_user_location: self.config.follows_user_location,
            geocoding: state.geocodes_in_flight > 0,
            last_error: state.last_error.clone(),
            ..ScreenView::default()
        }
    }
}

/// Builder for [`LocationPicker`].
#[derive(Default)]
pub struct LocationPickerBuilder {
    config: Option<PickerConfig>,
    permissions: Option<Arc<dyn PermissionGate>>,
    locator: Option<Arc<dyn LocationSource>>,
    geocoder: Option<Arc<dyn ReverseGeocoder>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl LocationPickerBuilder {
    pub fn config(mut self, config: PickerConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn permissions(mut self, gate: Arc<dyn PermissionGate>) -> Self {
        self.permissions = Some(gate);
        self
    }

    pub fn locator(mut self, source: Arc<dyn LocationSource>) -> Self {
        self.locator = Some(source);
        self
    }

    pub fn geocoder(mut self, geocoder: Arc<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Validates the config and checks every collaborator is set.
    ///
    /// Without an explicit geocoder, a [`NominatimClient`] is built from
    /// `config.nominatim`.
    ///
    /// # Errors
    /// Returns `InvalidConfiguration` for an invalid config or a missing
    /// collaborator.
    pub fn build(self) -> Result<LocationPicker, PickerError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let geocoder: Arc<dyn ReverseGeocoder> = match self.geocoder {
            Some(g) => g,
            None => Arc::new(NominatimClient::new(config.nominatim.clone())?),
        };

        Ok(LocationPicker {
            permissions: self
                .permissions
                .ok_or_else(|| PickerError::invalid_config("missing permission gate"))?,
            locator: self
                .locator
                .ok_or_else(|| PickerError::invalid_config("missing location source"))?,
            navigator: self
                .navigator
                .ok_or_else(|| PickerError::invalid_config("missing navigator"))?,
            geocoder,
            config,
            state: Mutex::new(ScreenState::default()),
            cancel: CancellationToken::new(),
        })
    }
}
