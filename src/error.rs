//! # Pipeline Errors
//!
//! Every failure in the fetch stage is returned to the caller as a
//! [`ReadingsError`]; nothing is retried or swallowed locally. The boundary
//! server turns each variant into an HTTP status with [`ReadingsError::status_code`].
//!
//! The transformer and sampler are total functions and have no error type.

use thiserror::Error;

/// Errors that can occur while obtaining readings for a station.
#[derive(Error, Debug)]
pub enum ReadingsError {
    /// A required identifier was missing or empty
    #[error("{0}")]
    InvalidInput(String),

    /// Network failure, non-success status, or an undecodable upstream body
    #[error("failed to fetch readings for station {station}: {reason}")]
    FetchFailed { station: String, reason: String },

    /// The upstream answered correctly but had no readings
    #[error("no readings found for station {station}")]
    EmptyResult { station: String },

    /// The station list could not be retrieved
    #[error("failed to fetch stations: {reason}")]
    StationsUnavailable { reason: String },
}

impl ReadingsError {
    pub fn fetch_failed(station: impl Into<String>, reason: impl ToString) -> Self {
        ReadingsError::FetchFailed {
            station: station.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status the boundary answers with for this failure.
    pub fn status_code(&self) -> u16 {
        match self {
            ReadingsError::InvalidInput(_) => 400,
            ReadingsError::EmptyResult { .. } => 404,
            ReadingsError::FetchFailed { .. } | ReadingsError::StationsUnavailable { .. } => 500,
        }
    }

    /// Short message safe to put in a response body.
    pub fn public_message(&self) -> &str {
        match self {
            ReadingsError::InvalidInput(message) => message,
            ReadingsError::EmptyResult { .. } => "No readings found for the station",
            ReadingsError::FetchFailed { .. } => "Failed to fetch station readings",
            ReadingsError::StationsUnavailable { .. } => "Failed to fetch stations",
        }
    }
}
