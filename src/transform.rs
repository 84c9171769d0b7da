//! # Readings Transformation
//!
//! Turns the flat reading list of one station into the chart series.
//!
//! ## Pipeline
//! 1. **Group**: one [`SeriesPoint`] per distinct `dateTime` string, created on
//!    first sight with its hour:minute display time
//! 2. **Classify**: each reading's measure URI decides which field it fills;
//!    `"downstage"` is checked before `"stage"` because it contains it
//! 3. **Merge**: a later reading with the same timestamp and kind overwrites
//!    the earlier value (input order wins)
//! 4. **Sort**: ascending by the parsed instant, never by string order, so
//!    mixed offsets like `+01:00` and `Z` still line up
//! 5. **Flag**: `has_stage` / `has_downstream` report which series exist
//!
//! The transformation is pure and total. A timestamp that does not parse keeps
//! its point, shows the raw string as its time, and sorts after every
//! parseable point.

use crate::{RawReading, ReadingsSeries, SeriesPoint};
use chrono::{DateTime, FixedOffset, Local, NaiveDateTime, TimeZone};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt::Display;

/// Which series a reading belongs to, decided from its measure URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureKind {
    /// Primary (upstream) gauge
    Stage,
    /// Downstream gauge, tagged `downstage`
    Downstream,
}

impl MeasureKind {
    /// Classify by substring. `None` means the reading feeds neither series.
    ///
    /// ```
    /// use floodwatch_lib::transform::MeasureKind;
    ///
    /// assert_eq!(MeasureKind::classify("E1-level-downstage-i-15_min-m"), Some(MeasureKind::Downstream));
    /// assert_eq!(MeasureKind::classify("E1-level-stage-i-15_min-m"), Some(MeasureKind::Stage));
    /// assert_eq!(MeasureKind::classify("E1-flow--i-15_min-m3_s"), None);
    /// ```
    pub fn classify(measure: &str) -> Option<Self> {
        if measure.contains("downstage") {
            Some(MeasureKind::Downstream)
        } else if measure.contains("stage") {
            Some(MeasureKind::Stage)
        } else {
            None
        }
    }
}

/// Parse a source timestamp into an instant.
///
/// RFC 3339 first; an ISO-8601 timestamp without offset is taken as UTC.
pub fn parse_timestamp(date_time: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(instant) = DateTime::parse_from_rfc3339(date_time) {
        return Some(instant);
    }
    NaiveDateTime::parse_from_str(date_time, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc().fixed_offset())
}

/// Transform readings, rendering display times in the local timezone.
pub fn transform(readings: &[RawReading]) -> ReadingsSeries {
    transform_in(readings, &Local)
}

/// Transform readings, rendering display times in `tz`.
pub fn transform_in<Tz>(readings: &[RawReading], tz: &Tz) -> ReadingsSeries
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    struct Bucket {
        instant: Option<DateTime<FixedOffset>>,
        point: SeriesPoint,
    }

    let mut slots: HashMap<&str, usize> = HashMap::new();
    let mut buckets: Vec<Bucket> = Vec::new();

    for reading in readings {
        let slot = *slots.entry(reading.date_time.as_str()).or_insert_with(|| {
            let instant = parse_timestamp(&reading.date_time);
            let display_time = match instant {
                Some(instant) => instant.with_timezone(tz).format("%H:%M").to_string(),
                None => {
                    log::warn!("Unparseable reading timestamp {:?}", reading.date_time);
                    reading.date_time.clone()
                }
            };
            buckets.push(Bucket {
                instant,
                point: SeriesPoint {
                    date_time: reading.date_time.clone(),
                    display_time,
                    stage: None,
                    downstream: None,
                },
            });
            buckets.len() - 1
        });

        let point = &mut buckets[slot].point;
        match MeasureKind::classify(&reading.measure) {
            Some(MeasureKind::Stage) => point.stage = Some(reading.value),
            Some(MeasureKind::Downstream) => point.downstream = Some(reading.value),
            None => log::trace!("Ignoring reading for measure {}", reading.measure),
        }
    }

    // Stable: equal instants keep first-seen order.
    buckets.sort_by(|a, b| match (&a.instant, &b.instant) {
        (Some(x), Some(y)) => x.cmp(y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    });

    let points: Vec<SeriesPoint> = buckets.into_iter().map(|b| b.point).collect();
    let has_stage = points.iter().any(|p| p.stage.is_some());
    let has_downstream = points.iter().any(|p| p.downstream.is_some());

    log::debug!(
        "Transformed {} readings into {} points (stage: {}, downstream: {})",
        readings.len(),
        points.len(),
        has_stage,
        has_downstream
    );

    ReadingsSeries {
        points,
        has_stage,
        has_downstream,
    }
}
