//! # Environment Agency Flood-Monitoring Client
//!
//! This module talks to the public flood-monitoring REST API:
//!
//! - **Stations**: `GET <base>?_limit=N` → `{ "items": [Station, ...] }`
//! - **Readings**: `GET <base>/<stationRef>/readings?_sorted&_limit=N`
//!   → `{ "items": [RawReading, ...] }`
//!
//! `stationRef` is the final path segment of the station URI, so callers can
//! pass either the full `@id` or the bare reference. It is always sent as one
//! percent-encoded path segment; `.`, `..` and references containing `?`,
//! `#` or `%` are rejected before any request is made.
//!
//! ## Failure Policy
//! Each call issues exactly one request. Transport errors, non-2xx statuses,
//! undecodable bodies and bodies without `items` are all returned as
//! [`ReadingsError`]; nothing is cached or retried here. Whether to try again
//! is up to whoever triggered the fetch.

use crate::config::ApiConfig;
use crate::error::ReadingsError;
use crate::{station_ref, RawReading, Station};
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use reqwest::Url;
use serde::Deserialize;
use std::future::Future;
use std::time::Duration;

/// Anything that can list stations and produce the raw readings for one.
///
/// Implemented by [`FloodApi`] (straight to the upstream API) and by
/// [`crate::fetcher::ReadingsFetcher`] (through a floodwatch server), so the
/// boundary and the CLI can run against either.
pub trait FloodDataSource: Send + Sync {
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, ReadingsError>> + Send;

    fn fetch_readings(
        &self,
        station_id: &str,
    ) -> impl Future<Output = Result<Vec<RawReading>, ReadingsError>> + Send;
}

/// Envelope shared by every list endpoint of the upstream API.
#[derive(Debug, Deserialize)]
struct ItemsResponse<T> {
    items: Option<Vec<T>>,
}

/// HTTP client for the flood-monitoring API.
#[derive(Debug, Clone)]
pub struct FloodApi {
    client: reqwest::Client,
    base_url: Url,
    stations_limit: u32,
    readings_limit: u32,
}

/// Reference code usable as a single upstream path segment.
fn checked_reference(station_id: &str) -> Result<&str, ReadingsError> {
    let reference = station_ref(station_id.trim());
    if reference.is_empty() {
        return Err(ReadingsError::InvalidInput(
            "Station ID is required".to_string(),
        ));
    }
    if reference == "." || reference == ".." || reference.contains(['?', '#', '%']) {
        log::warn!("Rejecting station reference {:?}", reference);
        return Err(ReadingsError::InvalidInput(
            "Invalid station ID".to_string(),
        ));
    }
    Ok(reference)
}

impl FloodApi {
    pub fn new(config: &ApiConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = Url::parse(config.base_url.trim_end_matches('/'))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("API base URL {} cannot take path segments", base_url);
        }

        Ok(FloodApi {
            client,
            base_url,
            stations_limit: config.stations_limit,
            readings_limit: config.readings_limit,
        })
    }

    /// Fetch the station list shown in the station picker.
    pub async fn stations(&self) -> Result<Vec<Station>, ReadingsError> {
        let mut url = self.base_url.clone();
        url.set_query(Some(&format!("_limit={}", self.stations_limit)));
        log::debug!("GET {}", url);

        let unavailable = |reason: String| {
            log::error!("Station list fetch failed: {}", reason);
            ReadingsError::StationsUnavailable { reason }
        };

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        let body: ItemsResponse<Station> = response
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid response body: {}", e)))?;

        let stations = body
            .items
            .ok_or_else(|| unavailable("no stations found in the response".to_string()))?;

        log::info!("Fetched {} stations", stations.len());
        Ok(stations)
    }

    /// Fetch the most recent readings for one station.
    ///
    /// `station_id` may be the full station URI or just its reference code.
    pub async fn station_readings(
        &self,
        station_id: &str,
    ) -> Result<Vec<RawReading>, ReadingsError> {
        let reference = checked_reference(station_id)?;

        let failed = |reason: String| {
            log::error!("Readings fetch for {} failed: {}", reference, reason);
            ReadingsError::fetch_failed(reference, reason)
        };

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| failed(format!("base URL {} cannot take path segments", self.base_url)))?
            .pop_if_empty()
            .push(reference)
            .push("readings");
        url.set_query(Some(&format!("_sorted&_limit={}", self.readings_limit)));
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| failed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(failed(format!("HTTP {}", response.status())));
        }

        let body: ItemsResponse<RawReading> = response
            .json()
            .await
            .map_err(|e| failed(format!("invalid response body: {}", e)))?;

        let readings = body
            .items
            .ok_or_else(|| failed("no items in the response".to_string()))?;

        log::info!("Fetched {} readings for {}", readings.len(), reference);
        Ok(readings)
    }
}

impl FloodDataSource for FloodApi {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ReadingsError> {
        self.stations().await
    }

    async fn fetch_readings(&self, station_id: &str) -> Result<Vec<RawReading>, ReadingsError> {
        self.station_readings(station_id).await
    }
}
