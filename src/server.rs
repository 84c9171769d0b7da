//! # HTTP Boundary
//!
//! Serves the pipeline to the presentation layer:
//!
//! | Route | Success | Failures |
//! |-------|---------|----------|
//! | `GET /readings?stationId=<uri>` | 200, raw readings | 400 no id, 404 no readings, 500 upstream |
//! | `GET /series?stationId=<uri>&view=chart\|table` | 200, transformed series | same as above |
//! | `GET /stations` | 200, station list | 500 upstream |
//!
//! Error bodies are `{"error": "<message>"}`, including for query strings that
//! fail to decode. Every response, errors included,
//! tells intermediaries not to cache it: readings change every 15 minutes and a
//! stale chart is worse than none.

use crate::config::Config;
use crate::error::ReadingsError;
use crate::flood_api::{FloodApi, FloodDataSource};
use crate::{sampler, transform, RawReading, ReadingsSeries, Station};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{middleware, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

/// Header value attached to every response
pub const NO_STORE: &str = "no-store, max-age=0, must-revalidate";

impl IntoResponse for ReadingsError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// `/readings` query. Unknown parameters are ignored.
#[derive(Debug, Deserialize)]
struct ReadingsQuery {
    #[serde(rename = "stationId")]
    station_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SeriesQuery {
    #[serde(rename = "stationId")]
    station_id: Option<String>,
    #[serde(default)]
    view: SeriesView,
}

fn required_station_id(station_id: Option<&str>) -> Result<&str, ReadingsError> {
    match station_id {
        Some(id) if !id.trim().is_empty() => Ok(id),
        _ => Err(ReadingsError::InvalidInput(
            "Station ID is required".to_string(),
        )),
    }
}

/// Unwrap a decoded query, turning axum's plain-text rejection into a JSON 400.
fn decoded<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ReadingsError> {
    match query {
        Ok(Query(query)) => Ok(query),
        Err(rejection) => {
            log::warn!("Rejected query string: {}", rejection.body_text());
            Err(ReadingsError::InvalidInput(
                "Invalid query string".to_string(),
            ))
        }
    }
}

/// Which rendering of the series `/series` returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesView {
    /// Every point, for the line chart
    #[default]
    Chart,
    /// Every fourth point, for the hourly table
    Table,
}

/// Build the boundary router around a readings source.
pub fn router<S>(source: S) -> Router
where
    S: FloodDataSource + 'static,
{
    Router::new()
        .route("/readings", get(readings::<S>))
        .route("/series", get(series::<S>))
        .route("/stations", get(stations::<S>))
        .layer(middleware::map_response(no_store))
        .with_state(Arc::new(source))
}

/// Bind `server.bind_addr` and serve the upstream API until the process stops.
pub async fn serve(config: &Config) -> anyhow::Result<()> {
    let api = FloodApi::new(&config.api)?;
    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr).await?;
    log::info!("Listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(api)).await?;
    Ok(())
}

async fn no_store(mut response: Response) -> Response {
    response
        .headers_mut()
        .insert(CACHE_CONTROL, HeaderValue::from_static(NO_STORE));
    response
}

/// Fetch readings and treat an empty list as `EmptyResult`.
async fn non_empty_readings<S: FloodDataSource>(
    source: &S,
    station_id: &str,
) -> Result<Vec<RawReading>, ReadingsError> {
    let readings = source.fetch_readings(station_id).await?;
    if readings.is_empty() {
        log::warn!("No readings found for {}", station_id);
        return Err(ReadingsError::EmptyResult {
            station: station_id.to_string(),
        });
    }
    Ok(readings)
}

async fn readings<S: FloodDataSource>(
    State(source): State<Arc<S>>,
    query: Result<Query<ReadingsQuery>, QueryRejection>,
) -> Result<Json<Vec<RawReading>>, ReadingsError> {
    let query = decoded(query)?;
    let station_id = required_station_id(query.station_id.as_deref())?;
    let readings = non_empty_readings(source.as_ref(), station_id).await?;
    log::info!("GET /readings {}: {} readings", station_id, readings.len());
    Ok(Json(readings))
}

async fn series<S: FloodDataSource>(
    State(source): State<Arc<S>>,
    query: Result<Query<SeriesQuery>, QueryRejection>,
) -> Result<Json<ReadingsSeries>, ReadingsError> {
    let query = decoded(query)?;
    let station_id = required_station_id(query.station_id.as_deref())?;
    let readings = non_empty_readings(source.as_ref(), station_id).await?;

    let mut series = transform::transform(&readings);
    if query.view == SeriesView::Table {
        series.points = sampler::sample(&series.points);
    }

    log::info!(
        "GET /series {} ({:?}): {} points",
        station_id,
        query.view,
        series.points.len()
    );
    Ok(Json(series))
}

async fn stations<S: FloodDataSource>(
    State(source): State<Arc<S>>,
) -> Result<Json<Vec<Station>>, ReadingsError> {
    let stations = source.fetch_stations().await?;
    log::info!("GET /stations: {} stations", stations.len());
    Ok(Json(stations))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_statuses() {
        let cases = [
            (ReadingsError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                ReadingsError::EmptyResult {
                    station: "E1".into(),
                },
                StatusCode::NOT_FOUND,
            ),
            (
                ReadingsError::fetch_failed("E1", "HTTP 502"),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_blank_station_id_is_invalid() {
        for station_id in [None, Some(""), Some("  ")] {
            assert!(matches!(
                required_station_id(station_id),
                Err(ReadingsError::InvalidInput(_))
            ));
        }
        assert_eq!(required_station_id(Some("E1")).unwrap(), "E1");
    }

    #[test]
    fn test_readings_query_ignores_view() {
        let uri: axum::http::Uri = "/readings?stationId=E1&view=list".parse().unwrap();
        let Query(query) = Query::<ReadingsQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.station_id.as_deref(), Some("E1"));
    }

    #[test]
    fn test_bad_series_view_is_json_bad_request() {
        let uri: axum::http::Uri = "/series?stationId=E1&view=list".parse().unwrap();
        let err = decoded(Query::<SeriesQuery>::try_from_uri(&uri)).unwrap_err();
        assert_eq!(err.public_message(), "Invalid query string");
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_view_parses_lowercase() {
        let view: SeriesView = serde_json::from_str(r#""table""#).unwrap();
        assert_eq!(view, SeriesView::Table);
    }
}
