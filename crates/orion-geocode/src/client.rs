//! HTTP client for a Nominatim-compatible geocoding service.
//!
//! Wraps `reqwest` with typed responses for `/search` (forward) and
//! `/reverse` lookups. Requests are made once; callers decide what a failure
//! means for them.

use std::time::Duration;

use orion_core::Coordinates;
use reqwest::{Client, Url};

use crate::error::GeocodeError;
use crate::types::{ErrorBody, Place};

/// Client for the forward/reverse geocoding endpoints.
///
/// Use [`GeocodeClient::new`] for production or point `base_url` at a
/// wiremock server in tests.
pub struct GeocodeClient {
    client: Client,
    base_url: Url,
}

impl GeocodeClient {
    /// Creates a client for the service at `base_url`.
    ///
    /// Nominatim's usage policy requires an identifying `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidBaseUrl`] if
    /// `base_url` does not parse.
    pub fn new(base_url: &str, timeout_secs: u64, user_agent: &str) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(user_agent)
            .build()?;

        // Trailing slash so that `join("search")` appends rather than
        // replacing the last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| GeocodeError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self { client, base_url })
    }

    /// Forward lookup. Returns at most one place; an empty vec means no match.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::Http`] on network failure.
    /// - [`GeocodeError::UnexpectedStatus`] on a non-2xx response.
    /// - [`GeocodeError::Deserialize`] if the body is not a place array.
    pub async fn search(&self, query: &str) -> Result<Vec<Place>, GeocodeError> {
        let url = self.build_url(
            "search",
            &[
                ("q", query),
                ("format", "json"),
                ("addressdetails", "1"),
                ("limit", "1"),
            ],
        )?;
        let body = self.request_text(&url).await?;
        let places: Vec<Place> =
            serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
                context: format!("search(q={query})"),
                source: e,
            })?;
        tracing::debug!(query, results = places.len(), "geocode search");
        Ok(places)
    }

    /// Reverse lookup of a single point.
    ///
    /// # Errors
    ///
    /// - [`GeocodeError::NotFound`] if the service reports nothing at the point.
    /// - [`GeocodeError::Http`] on network failure.
    /// - [`GeocodeError::UnexpectedStatus`] on a non-2xx response.
    /// - [`GeocodeError::Deserialize`] if the body is not a place.
    pub async fn reverse(&self, at: Coordinates) -> Result<Place, GeocodeError> {
        let lat = at.latitude.to_string();
        let lon = at.longitude.to_string();
        let url = self.build_url(
            "reverse",
            &[
                ("lat", &lat),
                ("lon", &lon),
                ("format", "json"),
                ("addressdetails", "1"),
            ],
        )?;
        let body = self.request_text(&url).await?;

        if let Ok(err) = serde_json::from_str::<ErrorBody>(&body) {
            tracing::debug!(%at, error = %err.error, "reverse geocode found nothing");
            return Err(GeocodeError::NotFound(at.to_string()));
        }

        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: format!("reverse(lat={lat}, lon={lon})"),
            source: e,
        })
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| GeocodeError::InvalidBaseUrl {
                base_url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }

    async fn request_text(&self, url: &Url) -> Result<String, GeocodeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response.text().await?)
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
