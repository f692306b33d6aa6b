//! Reverse Geocoding Module.
//!
//! Converts coordinates into a human-readable address via the OpenStreetMap
//! Nominatim `/reverse` endpoint.

use crate::rate_limit::RateLimiter;
use picker_types::GeoCoordinate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Public Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Errors from reverse geocoding.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeocodeError {
    /// Transport failure (DNS, connect, TLS, timeout).
    #[error("Nominatim request failed: {0}")]
    Network(String),

    /// Non-2xx HTTP status.
    #[error("Nominatim returned HTTP {code}")]
    Status {
        code: u16,
        /// Seconds from a `Retry-After` header, if any.
        retry_after_secs: Option<u64>,
    },

    /// Body was not JSON or lacked `display_name`.
    #[error("Failed to parse Nominatim response: {0}")]
    MalformedResponse(String),

    /// The service answered but found nothing at this point (e.g. open sea).
    #[error("No address found: {0}")]
    Unresolvable(String),

    /// The HTTP client could not be constructed.
    #[error("Failed to create HTTP client: {0}")]
    ClientBuild(String),
}

impl GeocodeError {
    /// Transient failures worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            GeocodeError::Network(_) => true,
            GeocodeError::Status { code, .. } => *code == 429 || *code >= 500,
            _ => false,
        }
    }

    fn retry_after(&self) -> Option<Duration> {
        match self {
            GeocodeError::Status {
                retry_after_secs: Some(secs),
                ..
            } => Some(Duration::from_secs(*secs)),
            _ => None,
        }
    }
}

/// Nominatim client settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy requires an identifying User-Agent.
    pub user_agent: String,
    /// Sent as `accept-language` when set.
    pub accept_language: Option<String>,
    pub request_timeout_ms: u64,
    /// Minimum spacing between requests from this client.
    pub min_interval_ms: u64,
    /// Total attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    /// First retry delay; doubles on every further attempt.
    pub backoff_base_ms: u64,
    /// Upper bound on a server-requested `Retry-After` wait.
    pub max_retry_after_ms: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!("location-picker/", env!("CARGO_PKG_VERSION")).to_string(),
            accept_language: None,
            request_timeout_ms: 10_000,
            min_interval_ms: 1_000,
            max_attempts: 3,
            backoff_base_ms: 500,
            max_retry_after_ms: 30_000,
        }
    }
}

impl NominatimConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    pub fn accept_language(mut self, lang: impl Into<String>) -> Self {
        self.accept_language = Some(lang.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn min_interval(mut self, interval: Duration) -> Self {
        self.min_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base_ms = base.as_millis() as u64;
        self
    }

    pub fn max_retry_after(mut self, max: Duration) -> Self {
        self.max_retry_after_ms = max.as_millis() as u64;
        self
    }

    /// Delay before retry number `attempt` (1-based count of failures so far).
    fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 1u64 << (attempt.saturating_sub(1)).min(16);
        Duration::from_millis(self.backoff_base_ms.saturating_mul(factor))
    }

    /// Wait after `error`: the server's `Retry-After` capped at
    /// `max_retry_after_ms`, else exponential backoff.
    fn retry_delay(&self, error: &GeocodeError, attempt: u32) -> Duration {
        match error.retry_after() {
            Some(requested) => requested.min(Duration::from_millis(self.max_retry_after_ms)),
            None => self.backoff_for(attempt),
        }
    }
}

/// Structured address parts, when Nominatim provides them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceAddress {
    pub house_number: Option<String>,
    pub road: Option<String>,
    pub suburb: Option<String>,
    /// City, town or village, whichever is present.
    pub city: Option<String>,
    pub state: Option<String>,
    pub postcode: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
}

/// A reverse-geocoded location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// The coordinate that was looked up.
    pub coords: GeoCoordinate,
    /// Full formatted address as returned by the service.
    pub display_name: String,
    pub address: PlaceAddress,
}

impl Place {
    /// Short "city, state, country" line; falls back to the full display name.
    pub fn locality(&self) -> String {
        let parts: Vec<&str> = [
            self.address.city.as_deref(),
            self.address.state.as_deref(),
            self.address.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect();

        if parts.is_empty() {
            self.display_name.clone()
        } else {
            parts.join(", ")
        }
    }
}

/// Nominatim API response structure.
#[derive(Debug, Deserialize)]
struct NominatimResponse {
    display_name: Option<String>,
    error: Option<String>,
    #[serde(default)]
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    house_number: Option<String>,
    road: Option<String>,
    suburb: Option<String>,
    neighbourhood: Option<String>,

    // Locality can be in multiple fields
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,

    state: Option<String>,
    postcode: Option<String>,
    country: Option<String>,
    country_code: Option<String>,
}

impl From<NominatimAddress> for PlaceAddress {
    fn from(addr: NominatimAddress) -> Self {
        Self {
            house_number: addr.house_number,
            road: addr.road,
            suburb: addr.suburb.or(addr.neighbourhood),
            city: addr.city.or(addr.town).or(addr.village),
            state: addr.state,
            postcode: addr.postcode,
            country: addr.country,
            country_code: addr.country_code,
        }
    }
}

/// Parses a `/reverse?format=json` body.
fn parse_reverse_body(coords: GeoCoordinate, body: &str) -> Result<Place, GeocodeError> {
    let data: NominatimResponse = serde_json::from_str(body)
        .map_err(|e| GeocodeError::MalformedResponse(e.to_string()))?;

    if let Some(error) = data.error {
        return Err(GeocodeError::Unresolvable(error));
    }

    let display_name = data
        .display_name
        .ok_or_else(|| GeocodeError::MalformedResponse("missing field `display_name`".to_string()))?;

    Ok(Place {
        coords,
        display_name,
        address: data.address.map(PlaceAddress::from).unwrap_or_default(),
    })
}

/// Reverse-geocoding client for a Nominatim instance.
///
/// Cheap to clone; clones share the HTTP connection pool and the rate limiter.
///
/// # Example
/// ```rust,no_run
/// use picker_network::{NominatimClient, NominatimConfig};
/// use picker_types::GeoCoordinate;
///
/// #[tokio::main]
/// async fn main() {
///     let client = NominatimClient::new(NominatimConfig::new().user_agent("my-app/1.0")).unwrap();
///     let coords = GeoCoordinate::new(21.0285, 105.8542).unwrap();
///     let place = client.reverse(coords).await.unwrap();
///     println!("{}", place.display_name);
/// }
/// ```
#[derive(Debug, Clone)]
pub struct NominatimClient {
    http: reqwest::Client,
    config: Arc<NominatimConfig>,
    limiter: Arc<RateLimiter>,
}

impl NominatimClient {
    /// # Errors
    /// Returns `GeocodeError::ClientBuild` if the TLS backend cannot be initialized.
    pub fn new(config: NominatimConfig) -> Result<Self, GeocodeError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| GeocodeError::ClientBuild(e.to_string()))?;

        let limiter = RateLimiter::new(Duration::from_millis(config.min_interval_ms));

        Ok(Self {
            http,
            config: Arc::new(config),
            limiter: Arc::new(limiter),
        })
    }

    /// Looks up the address at `coords`.
    ///
    /// Requests are paced by the client's rate limiter. HTTP 429, 5xx and
    /// transport errors are retried with exponential backoff, honoring
    /// `Retry-After` when the server sends one.
    pub async fn reverse(&self, coords: GeoCoordinate) -> Result<Place, GeocodeError> {
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            self.limiter.acquire().await;

            match self.reverse_once(coords).await {
                Ok(place) => return Ok(place),
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.retry_delay(&e, attempt);
                    warn!(
                        lat = coords.lat,
                        lng = coords.lng,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "reverse geocode failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn reverse_once(&self, coords: GeoCoordinate) -> Result<Place, GeocodeError> {
        let url = format!("{}/reverse", self.config.base_url.trim_end_matches('/'));

        let mut query = vec![
            ("format", "json".to_string()),
            ("lat", coords.lat.to_string()),
            ("lon", coords.lng.to_string()),
        ];
        if let Some(lang) = &self.config.accept_language {
            query.push(("accept-language", lang.clone()));
        }

        debug!(lat = coords.lat, lng = coords.lng, %url, "sending reverse geocode request");

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let retry_after_secs = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<u64>().ok());
            return Err(GeocodeError::Status {
                code: status.as_u16(),
                retry_after_secs,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| GeocodeError::Network(e.to_string()))?;

        parse_reverse_body(coords, &body)
    }
}
