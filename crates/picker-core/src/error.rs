use picker_network::GeocodeError;
use picker_types::{LocationError, PermissionStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from location picker operations.
///
/// Every failure is non-fatal: it is logged, stored as the screen's last
/// error, and returned to the caller. The screen stays usable.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PickerError {
    /// The user (or platform) refused location access.
    #[error("Location permission {status}")]
    PermissionDenied { status: PermissionStatus },

    /// The permission prompt itself failed.
    #[error("Permission request failed: {0}")]
    PermissionFailed(String),

    /// No device position (timeout, provider error, stale fix).
    #[error("{0}")]
    LocationUnavailable(#[from] LocationError),

    /// Reverse geocoding failed.
    #[error("Reverse geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    /// Confirm was pressed before any marker was placed.
    #[error("No location selected")]
    NoLocationSelected,

    /// The screen was torn down.
    #[error("Location picker has been disposed")]
    Disposed,

    /// Invalid configuration.
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },
}

/// Coarse failure classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    PermissionDenied,
    LocationUnavailable,
    NetworkError,
    MalformedResponse,
    /// Caller misuse: no marker, disposed screen, bad config.
    Usage,
}

impl PickerError {
    /// Creates an `InvalidConfiguration` error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            PickerError::PermissionDenied { .. } | PickerError::PermissionFailed(_) => {
                ErrorKind::PermissionDenied
            }
            PickerError::LocationUnavailable(_) => ErrorKind::LocationUnavailable,
            PickerError::Geocode(
                GeocodeError::Network(_) | GeocodeError::Status { .. } | GeocodeError::ClientBuild(_),
            ) => ErrorKind::NetworkError,
            PickerError::Geocode(GeocodeError::MalformedResponse(_) | GeocodeError::Unresolvable(_)) => {
                ErrorKind::MalformedResponse
            }
            PickerError::NoLocationSelected
            | PickerError::Disposed
            | PickerError::InvalidConfiguration { .. } => ErrorKind::Usage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_classification() {
        assert_eq!(
            PickerError::PermissionDenied { status: PermissionStatus::Denied }.kind(),
            ErrorKind::PermissionDenied
        );
        assert_eq!(
            PickerError::from(LocationError::Timeout { timeout_ms: 20_000 }).kind(),
            ErrorKind::LocationUnavailable
        );
        assert_eq!(
            PickerError::from(GeocodeError::Status { code: 502, retry_after_secs: None }).kind(),
            ErrorKind::NetworkError
        );
        assert_eq!(
            PickerError::from(GeocodeError::MalformedResponse("eof".into())).kind(),
            ErrorKind::MalformedResponse
        );
        assert_eq!(PickerError::NoLocationSelected.kind(), ErrorKind::Usage);
    }

    #[test]
    fn test_messages() {
        let e = PickerError::PermissionDenied { status: PermissionStatus::NeverAskAgain };
        assert_eq!(e.to_string(), "Location permission never_ask_again");

        let e = PickerError::from(LocationError::Timeout { timeout_ms: 20_000 });
        assert_eq!(e.to_string(), "Location request timed out after 20000 ms");
    }
}
