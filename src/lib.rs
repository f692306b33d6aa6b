//! # Location Picker
//!
//! A headless "pick a location on a map" screen: asks for location
//! permission, centers on the device position, lets the user drop a pin and
//! reverse-geocodes it through OpenStreetMap Nominatim.
//!
//! This crate is a facade that re-exports the workspace crates.
//!
//! ## Modules
//!
//! - `types`: coordinates, camera regions, positions, permissions
//! - `network`: Nominatim client and rate limiter
//! - everything from `picker-core` at the top level: the controller,
//!   platform traits, config, errors, view model and logging setup
//!
//! ## Usage
//!
//! ```rust,no_run
//! use location_picker::prelude::*;
//! use std::sync::Arc;
//!
//! # fn host(
//! #     gate: Arc<dyn PermissionGate>,
//! #     locator: Arc<dyn LocationSource>,
//! #     nav: Arc<dyn Navigator>,
//! # ) -> Result<(), PickerError> {
//! let picker = LocationPicker::builder()
//!     .config(PickerConfig::default())
//!     .permissions(gate)
//!     .locator(locator)
//!     .navigator(nav)
//!     .build()?;
//! let region = picker.initial_region();
//! # let _ = region;
//! # Ok(())
//! # }
//! ```

pub use picker_core::*;
pub use picker_network as network;
pub use picker_types as types;

pub mod prelude {
    pub use crate::types::{Alert, CameraRegion, GeoCoordinate, PermissionStatus, Position, PositionOptions, Span};
    pub use crate::network::{NominatimClient, NominatimConfig, Place};
    pub use crate::{
        GeocodeOutcome, LocationOutcome, LocationPicker, LocationSource, MapHandle, MountOutcome, Navigator,
        PermissionGate, PickerConfig, PickerError, ReverseGeocoder, ScreenView,
    };
}
