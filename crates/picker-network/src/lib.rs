//! Network module for remote data fetching.
//!
//! Provides reverse geocoding against OpenStreetMap Nominatim with
//! client-side rate limiting and retry/backoff.

pub mod geo;
pub mod rate_limit;

pub use geo::{GeocodeError, NominatimClient, NominatimConfig, Place, PlaceAddress};
pub use rate_limit::RateLimiter;
