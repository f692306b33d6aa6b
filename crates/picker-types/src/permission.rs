use serde::{Deserialize, Serialize};
use std::fmt;

/// Runtime permissions the picker may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionKind {
    FineLocation,
}

/// Outcome of a permission prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    /// Denied and the platform will not prompt again.
    NeverAskAgain,
}

impl PermissionStatus {
    pub fn is_granted(&self) -> bool {
        matches!(self, PermissionStatus::Granted)
    }
}

impl fmt::Display for PermissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionStatus::Granted => "granted",
            PermissionStatus::Denied => "denied",
            PermissionStatus::NeverAskAgain => "never_ask_again",
        };
        write!(f, "{}", s)
    }
}

/// Texts shown in the permission dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PermissionRationale {
    pub title: String,
    pub message: String,
    pub button_neutral: String,
    pub button_negative: String,
    pub button_positive: String,
}

impl Default for PermissionRationale {
    fn default() -> Self {
        Self {
            title: "Agree to allow location access".to_string(),
            message: "Please grant permission for AppRN".to_string(),
            button_neutral: "Ask me later".to_string(),
            button_negative: "Cancel".to_string(),
            button_positive: "Agree".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionRequest {
    pub kind: PermissionKind,
    pub rationale: PermissionRationale,
}

impl PermissionRequest {
    pub fn fine_location(rationale: PermissionRationale) -> Self {
        Self {
            kind: PermissionKind::FineLocation,
            rationale,
        }
    }
}
