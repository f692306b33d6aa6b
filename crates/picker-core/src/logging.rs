//! Diagnostic output.
//!
//! The crates only emit `tracing` events; which subscriber receives them is
//! up to the deployment. [`init`] installs a formatted stderr subscriber for
//! hosts that have none of their own.

use crate::error::PickerError;
use tracing_subscriber::EnvFilter;

/// Filter used when neither an explicit filter nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "picker_core=info,picker_network=info,location_picker=info";

/// Installs a global fmt subscriber.
///
/// `filter` takes `EnvFilter` directives; `None` reads `RUST_LOG` and falls
/// back to [`DEFAULT_FILTER`].
///
/// # Errors
/// Returns `InvalidConfiguration` for an unparsable filter or if a global
/// subscriber is already installed.
pub fn init(filter: Option<&str>) -> Result<(), PickerError> {
    let filter = build_filter(filter)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| PickerError::invalid_config(format!("logging: {}", e)))
}

fn build_filter(filter: Option<&str>) -> Result<EnvFilter, PickerError> {
    match filter {
        Some(directives) => EnvFilter::try_new(directives)
            .map_err(|e| PickerError::invalid_config(format!("log filter: {}", e))),
        None => Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}
