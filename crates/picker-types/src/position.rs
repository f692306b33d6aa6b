//! Device position fixes and the options used to request them.

use crate::coordinate::GeoCoordinate;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Options for a one-shot position request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionOptions {
    pub enable_high_accuracy: bool,
    /// Give up after this many milliseconds.
    pub timeout_ms: u64,
    /// Accept a cached fix at most this old.
    pub maximum_age_ms: u64,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout_ms: 20_000,
            maximum_age_ms: 1_000,
        }
    }
}

impl PositionOptions {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn maximum_age(&self) -> Duration {
        Duration::from_millis(self.maximum_age_ms)
    }
}

/// A position fix reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub coords: GeoCoordinate,
    /// Horizontal accuracy radius in meters, if reported.
    pub accuracy_m: Option<f64>,
    /// When the fix was taken.
    pub timestamp: DateTime<Utc>,
}

impl Position {
    /// A fix taken right now.
    pub fn now(coords: GeoCoordinate) -> Self {
        Self {
            coords,
            accuracy_m: None,
            timestamp: Utc::now(),
        }
    }

    /// Age of the fix relative to `now`. Fixes from the future count as zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        (now - self.timestamp).to_std().unwrap_or(Duration::ZERO)
    }

    pub fn is_fresh(&self, maximum_age: Duration, now: DateTime<Utc>) -> bool {
        self.age_at(now) <= maximum_age
    }
}

/// Failure to obtain a device position.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationError {
    /// No fix within the requested timeout.
    #[error("Location request timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The platform reported an error (provider disabled, no signal, ...).
    #[error("Location unavailable: {0}")]
    Unavailable(String),

    /// The platform returned a cached fix older than allowed.
    #[error("Location fix is {age_ms} ms old (max {max_age_ms} ms)")]
    Stale { age_ms: u64, max_age_ms: u64 },
}
