//! Location picker screen logic.
//!
//! - `controller`: the [`LocationPicker`] screen controller
//! - `platform`: traits the host implements (permission, location, map, navigation)
//! - `config`: [`PickerConfig`]
//! - `view`: render snapshot
//! - `logging`: optional `tracing` subscriber setup

pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod platform;
pub mod view;

pub use config::{FALLBACK_CENTER, PickerConfig};
pub use controller::{GeocodeOutcome, LocationOutcome, LocationPicker, LocationPickerBuilder, MountOutcome};
pub use error::{ErrorKind, PickerError};
pub use platform::{LocationSource, MapHandle, Navigator, PermissionGate, PlatformError, ReverseGeocoder};
pub use view::ScreenView;
