//! # Floodwatch Core Library
//!
//! This library provides the data structures and pipeline stages behind the
//! floodwatch service: pick a UK flood-monitoring station, pull its recent
//! water-level readings from the Environment Agency API, and reshape them into
//! a chart-ready series or an hourly table.
//!
//! ## Data Flow
//! 1. **Fetch**: one request per station selection, no caching, no retries
//!    ([`flood_api`] upstream, [`fetcher`] via a running floodwatch server)
//! 2. **Transform**: group raw readings by timestamp and split them into a
//!    `stage` and a `downstream` series ([`transform`])
//! 3. **Sample**: keep every fourth point for the table view ([`sampler`])
//! 4. **Serve / print**: the HTTP boundary ([`server`]) or the CLI table
//!    ([`renderer`])
//!
//! ## Core Types
//! - [`RawReading`]: one sample as delivered by the upstream API
//! - [`Station`]: one entry of the upstream station list
//! - [`SeriesPoint`]: all readings sharing a timestamp, merged and classified
//! - [`ReadingsSeries`]: the ordered points plus which series are present

use serde::{Deserialize, Serialize};

// Module declarations
pub mod config;
pub mod error;
pub mod fetcher;
pub mod flood_api;
pub mod renderer;
pub mod sampler;
pub mod server;
pub mod transform;

/// One water-level sample from the upstream readings endpoint.
///
/// Field names follow the upstream JSON so the boundary can pass readings
/// through unchanged.
///
/// # Example
/// ```
/// use floodwatch_lib::RawReading;
///
/// let json = r#"{
///     "@id": "http://environment.data.gov.uk/flood-monitoring/data/readings/1029TH-level-stage-i-15_min-mASD/2024-01-01T10-00-00Z",
///     "dateTime": "2024-01-01T10:00:00Z",
///     "measure": "http://environment.data.gov.uk/flood-monitoring/id/measures/1029TH-level-stage-i-15_min-mASD",
///     "value": 1.2
/// }"#;
///
/// let reading: RawReading = serde_json::from_str(json).unwrap();
/// assert_eq!(reading.date_time, "2024-01-01T10:00:00Z");
/// assert_eq!(reading.value, 1.2);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Opaque reading URI, passed through untouched
    #[serde(rename = "@id", default)]
    pub id: String,
    /// ISO-8601 timestamp as supplied by the source
    #[serde(rename = "dateTime")]
    pub date_time: String,
    /// Measure URI; its kind is found by substring, not equality
    pub measure: String,
    /// Water level in metres
    pub value: f64,
}

/// A flood-monitoring station as listed by the upstream stations endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// Station URI; the final path segment is the station reference
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(
        rename = "catchmentName",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub catchment_name: Option<String>,
}

impl Station {
    /// Short reference code taken from the final path segment of the URI.
    ///
    /// ```
    /// use floodwatch_lib::Station;
    ///
    /// let station = Station {
    ///     id: "http://environment.data.gov.uk/flood-monitoring/id/stations/1029TH".into(),
    ///     label: None,
    ///     catchment_name: None,
    /// };
    /// assert_eq!(station.station_ref(), "1029TH");
    /// ```
    pub fn station_ref(&self) -> &str {
        station_ref(&self.id)
    }

    /// Name shown in a station picker: catchment, then label, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.catchment_name
            .as_deref()
            .or(self.label.as_deref())
            .unwrap_or("Unnamed Station")
    }
}

/// Final path segment of a station URI (the whole string if it has no `/`).
pub fn station_ref(station_id: &str) -> &str {
    station_id.rsplit('/').next().unwrap_or(station_id)
}

/// All readings that share one `dateTime`, merged into a single chart point.
///
/// Serialized with the field names the chart and table widgets consume:
/// `dateTime`, `time`, `stage`, `downstream`. Missing series values are
/// omitted rather than written as `null`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    /// Original timestamp string, the grouping key
    #[serde(rename = "dateTime")]
    pub date_time: String,
    /// Hour:minute rendering of `date_time`
    #[serde(rename = "time")]
    pub display_time: String,
    /// Upstream (primary) gauge reading in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<f64>,
    /// Downstream gauge reading in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub downstream: Option<f64>,
}

/// Transformer output: time-ordered points plus which series carry data.
///
/// # Example
/// ```
/// use floodwatch_lib::{ReadingsSeries, SeriesPoint};
///
/// let series = ReadingsSeries {
///     points: vec![SeriesPoint {
///         date_time: "2024-01-01T10:00:00Z".into(),
///         display_time: "10:00".into(),
///         stage: Some(1.2),
///         downstream: None,
///     }],
///     has_stage: true,
///     has_downstream: false,
/// };
///
/// assert_eq!(series.points.len(), 1);
/// assert!(!series.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadingsSeries {
    pub points: Vec<SeriesPoint>,
    /// True iff at least one point has `stage`
    pub has_stage: bool,
    /// True iff at least one point has `downstream`
    pub has_downstream: bool,
}

impl ReadingsSeries {
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
