//! # Pipeline Property Tests
//!
//! Checks the transform → sample pipeline against the properties the chart and
//! table views rely on: determinism, one point per timestamp, chronological
//! order, honest series flags, and the table stride.

use chrono::{Duration, TimeZone, Utc};
use floodwatch_lib::sampler::sample;
use floodwatch_lib::transform::{parse_timestamp, transform_in};
use floodwatch_lib::RawReading;
use std::collections::HashSet;

const STAGE: &str = "http://environment.data.gov.uk/flood-monitoring/id/measures/E70039-level-stage-i-15_min-m";
const DOWNSTAGE: &str = "http://environment.data.gov.uk/flood-monitoring/id/measures/E70039-level-downstage-i-15_min-m";
const RAINFALL: &str = "http://environment.data.gov.uk/flood-monitoring/id/measures/E70039-rainfall-tipping_bucket_raingauge-t-15_min-mm";

/// A day of 15-minute readings in the upstream's newest-first order, with a
/// downstream gauge that only reports on the hour and a rain gauge mixed in.
fn upstream_day() -> Vec<RawReading> {
    let start = Utc.with_ymd_and_hms(2024, 3, 30, 0, 0, 0).unwrap();
    let mut readings = Vec::new();

    for step in (0..96).rev() {
        let at = start + Duration::minutes(15 * step);
        let date_time = at.format("%Y-%m-%dT%H:%M:%SZ").to_string();

        readings.push(RawReading {
            id: format!("stage/{}", date_time),
            date_time: date_time.clone(),
            measure: STAGE.to_string(),
            value: 1.0 + step as f64 / 100.0,
        });
        if step % 4 == 0 {
            readings.push(RawReading {
                id: format!("downstage/{}", date_time),
                date_time: date_time.clone(),
                measure: DOWNSTAGE.to_string(),
                value: 0.5 + step as f64 / 200.0,
            });
        }
        readings.push(RawReading {
            id: format!("rain/{}", date_time),
            date_time,
            measure: RAINFALL.to_string(),
            value: 0.2,
        });
    }
    readings
}

/// Transforming the same input twice gives the same output.
#[test]
fn transform_is_deterministic() {
    let readings = upstream_day();
    assert_eq!(transform_in(&readings, &Utc), transform_in(&readings, &Utc));
}

/// No two points share a timestamp, and every timestamp is represented.
#[test]
fn one_point_per_timestamp() {
    let readings = upstream_day();
    let series = transform_in(&readings, &Utc);

    let unique: HashSet<&str> = series.points.iter().map(|p| p.date_time.as_str()).collect();
    assert_eq!(unique.len(), series.points.len());
    assert_eq!(series.points.len(), 96);
}

/// Consecutive points never go back in time.
#[test]
fn points_are_chronological() {
    let series = transform_in(&upstream_day(), &Utc);

    for window in series.points.windows(2) {
        let earlier = parse_timestamp(&window[0].date_time).unwrap();
        let later = parse_timestamp(&window[1].date_time).unwrap();
        assert!(
            earlier <= later,
            "{} should not come after {}",
            window[0].date_time,
            window[1].date_time
        );
    }
    assert_eq!(series.points[0].display_time, "00:00");
    assert_eq!(series.points[95].display_time, "23:45");
}

/// Flags match what the points actually carry.
#[test]
fn flags_match_points() {
    let full = transform_in(&upstream_day(), &Utc);
    assert!(full.has_stage);
    assert!(full.has_downstream);

    let stage_only: Vec<RawReading> = upstream_day()
        .into_iter()
        .filter(|r| !r.measure.contains("downstage"))
        .collect();
    let series = transform_in(&stage_only, &Utc);
    assert!(series.has_stage);
    assert!(!series.has_downstream);
    assert!(series.points.iter().all(|p| p.downstream.is_none()));

    let rain_only: Vec<RawReading> = upstream_day()
        .into_iter()
        .filter(|r| r.measure == RAINFALL)
        .collect();
    let series = transform_in(&rain_only, &Utc);
    assert_eq!(series.points.len(), 96);
    assert!(!series.has_stage);
    assert!(!series.has_downstream);
}

/// The hourly table lands on the hour, where the downstream gauge reports.
#[test]
fn table_is_hourly_for_regular_series() {
    let series = transform_in(&upstream_day(), &Utc);
    let table = sample(&series.points);

    assert_eq!(table.len(), 24);
    for (hour, point) in table.iter().enumerate() {
        assert_eq!(point.display_time, format!("{:02}:00", hour));
        assert!(point.stage.is_some());
        assert!(point.downstream.is_some());
    }
}

/// Sampling is by position: a gap in the source shifts the table off the hour.
#[test]
fn table_sampling_ignores_time_gaps() {
    let mut readings = upstream_day();
    readings.retain(|r| r.date_time != "2024-03-30T00:15:00Z");

    let series = transform_in(&readings, &Utc);
    let table = sample(&series.points);

    assert_eq!(table[0].display_time, "00:00");
    assert_eq!(table[1].display_time, "01:15");
}

/// The worked example from the readings endpoint documentation.
#[test]
fn end_to_end_example() {
    let readings = vec![
        RawReading {
            id: String::new(),
            date_time: "2024-01-01T10:00:00Z".to_string(),
            measure: "...stage".to_string(),
            value: 1.2,
        },
        RawReading {
            id: String::new(),
            date_time: "2024-01-01T10:00:00Z".to_string(),
            measure: "...downstage".to_string(),
            value: 0.8,
        },
        RawReading {
            id: String::new(),
            date_time: "2024-01-01T10:15:00Z".to_string(),
            measure: "...stage".to_string(),
            value: 1.3,
        },
    ];

    let series = transform_in(&readings, &Utc);
    let json = serde_json::to_value(&series).unwrap();

    assert_eq!(
        json,
        serde_json::json!({
            "points": [
                { "dateTime": "2024-01-01T10:00:00Z", "time": "10:00", "stage": 1.2, "downstream": 0.8 },
                { "dateTime": "2024-01-01T10:15:00Z", "time": "10:15", "stage": 1.3 }
            ],
            "hasStage": true,
            "hasDownstream": true
        })
    );
}
