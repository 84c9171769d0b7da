//! # Terminal Rendering
//!
//! Plain-text output for the CLI: an hourly table of the sampled series, or
//! the full chart series one point per line. Columns only appear for series
//! the station actually reports.

use crate::{ReadingsSeries, SeriesPoint};
use std::fmt::Write;

const TIME_WIDTH: usize = 8;
const VALUE_WIDTH: usize = 16;

/// Format a level in metres with three decimals, `-` when missing.
fn format_level(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "-".to_string(),
    }
}

fn write_row(out: &mut String, series: &ReadingsSeries, time: &str, point: Option<&SeriesPoint>) {
    let _ = write!(out, "{:<width$}", time, width = TIME_WIDTH);
    if series.has_stage {
        let cell = point.map_or_else(|| "Stage (m)".to_string(), |p| format_level(p.stage));
        let _ = write!(out, "{:>width$}", cell, width = VALUE_WIDTH);
    }
    if series.has_downstream {
        let cell =
            point.map_or_else(|| "Downstream (m)".to_string(), |p| format_level(p.downstream));
        let _ = write!(out, "{:>width$}", cell, width = VALUE_WIDTH);
    }
    out.push('\n');
}

/// Render `points` as a table using the column flags of `series`.
///
/// `points` is normally `sampler::sample(&series.points)`; the flags come
/// from the full series so a column does not vanish just because the
/// sampled rows happen to miss it.
pub fn render_table(series: &ReadingsSeries, points: &[SeriesPoint], caption: &str) -> String {
    let mut out = String::new();
    if points.is_empty() {
        out.push_str("No data available for this station\n");
        return out;
    }

    write_row(&mut out, series, "Time", None);
    let rule_width =
        TIME_WIDTH + VALUE_WIDTH * (series.has_stage as usize + series.has_downstream as usize);
    out.push_str(&"-".repeat(rule_width));
    out.push('\n');

    for point in points {
        write_row(&mut out, series, &point.display_time, Some(point));
    }

    let _ = writeln!(out, "{}", caption);
    out
}

/// Render the whole series, one line per point with its full timestamp.
pub fn render_chart_series(series: &ReadingsSeries) -> String {
    let mut out = String::new();
    for point in &series.points {
        let _ = write!(out, "{}  {}", point.date_time, point.display_time);
        if series.has_stage {
            let _ = write!(out, "  stage={}", format_level(point.stage));
        }
        if series.has_downstream {
            let _ = write!(out, "  downstream={}", format_level(point.downstream));
        }
        out.push('\n');
    }
    out
}
