//! # Readings Fetcher
//!
//! Client side of the floodwatch boundary: asks a running floodwatch server for
//! a station's raw readings. One call, one request. Every request carries a
//! `_t` nonce so no intermediate cache can answer it with an older response.

use crate::error::ReadingsError;
use crate::flood_api::FloodDataSource;
use crate::{RawReading, Station};
use reqwest::StatusCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Cache-defeating request parameter.
///
/// Wall-clock milliseconds plus a process-wide counter, so two calls inside the
/// same millisecond still differ.
pub fn cache_buster() -> String {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    let seq = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{}", millis, seq)
}

/// Fetches readings through the `/readings` endpoint of a floodwatch server.
#[derive(Debug, Clone)]
pub struct ReadingsFetcher {
    client: reqwest::Client,
    server_url: String,
}

impl ReadingsFetcher {
    pub fn new(server_url: &str, timeout: Duration) -> reqwest::Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(ReadingsFetcher {
            client,
            server_url: server_url.trim_end_matches('/').to_string(),
        })
    }

    /// Station list as served by the floodwatch `/stations` endpoint.
    pub async fn stations(&self) -> Result<Vec<Station>, ReadingsError> {
        let url = format!("{}/stations", self.server_url);
        let unavailable = |reason: String| {
            log::error!("Station list request failed: {}", reason);
            ReadingsError::StationsUnavailable { reason }
        };

        let response = self
            .client
            .get(&url)
            .query(&[("_t", cache_buster())])
            .send()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {}", response.status())));
        }

        response
            .json()
            .await
            .map_err(|e| unavailable(format!("invalid response body: {}", e)))
    }

    /// Retrieve the current raw readings for `station_id`.
    ///
    /// Fails with `InvalidInput` for an empty id, `EmptyResult` when the
    /// server has no readings, and `FetchFailed` for anything else.
    pub async fn fetch(&self, station_id: &str) -> Result<Vec<RawReading>, ReadingsError> {
        if station_id.trim().is_empty() {
            return Err(ReadingsError::InvalidInput(
                "Station ID is required".to_string(),
            ));
        }

        let url = format!("{}/readings", self.server_url);
        let nonce = cache_buster();

        let response = self
            .client
            .get(&url)
            .query(&[("stationId", station_id), ("_t", nonce.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Readings request for {} failed: {}", station_id, e);
                ReadingsError::fetch_failed(station_id, e)
            })?;

        match response.status() {
            status if status.is_success() => {
                let readings: Vec<RawReading> = response.json().await.map_err(|e| {
                    ReadingsError::fetch_failed(station_id, format!("invalid response body: {}", e))
                })?;
                log::debug!("Received {} readings for {}", readings.len(), station_id);
                Ok(readings)
            }
            StatusCode::NOT_FOUND => Err(ReadingsError::EmptyResult {
                station: station_id.to_string(),
            }),
            StatusCode::BAD_REQUEST => Err(ReadingsError::InvalidInput(
                "Station ID is required".to_string(),
            )),
            status => {
                log::error!("Readings request for {} returned {}", station_id, status);
                Err(ReadingsError::fetch_failed(
                    station_id,
                    format!("HTTP {}", status),
                ))
            }
        }
    }
}

impl FloodDataSource for ReadingsFetcher {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ReadingsError> {
        self.stations().await
    }

    async fn fetch_readings(&self, station_id: &str) -> Result<Vec<RawReading>, ReadingsError> {
        self.fetch(station_id).await
    }
}
