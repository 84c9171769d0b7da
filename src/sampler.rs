//! Positional down-sampling for the table view.
//!
//! The upstream reports every 15 minutes, so keeping every fourth point gives
//! a roughly hourly table. Sampling is by position, not by time: gaps in the
//! source make the table only approximately hourly.

use crate::SeriesPoint;

/// Stride used for the table view
pub const TABLE_STRIDE: usize = 4;

/// Points at positions 0, 4, 8, ... of the sorted series.
///
/// ```
/// use floodwatch_lib::{sampler::sample, SeriesPoint};
///
/// let points: Vec<SeriesPoint> = (0..10)
///     .map(|i| SeriesPoint {
///         date_time: format!("t{i}"),
///         display_time: format!("{i}"),
///         stage: Some(i as f64),
///         downstream: None,
///     })
///     .collect();
///
/// let table = sample(&points);
/// let kept: Vec<&str> = table.iter().map(|p| p.date_time.as_str()).collect();
/// assert_eq!(kept, ["t0", "t4", "t8"]);
/// ```
pub fn sample(points: &[SeriesPoint]) -> Vec<SeriesPoint> {
    sample_every(points, TABLE_STRIDE)
}

/// Every `stride`-th point starting with the first; a stride of 0 keeps all.
pub fn sample_every(points: &[SeriesPoint], stride: usize) -> Vec<SeriesPoint> {
    points.iter().step_by(stride.max(1)).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(n: usize) -> Vec<SeriesPoint> {
        (0..n)
            .map(|i| SeriesPoint {
                date_time: format!("2024-01-01T00:{:02}:00Z", i),
                display_time: format!("00:{:02}", i),
                stage: Some(i as f64),
                downstream: None,
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(sample(&[]).is_empty());
    }

    #[test]
    fn test_short_input_keeps_first() {
        for n in 1..=4 {
            let table = sample(&points(n));
            assert_eq!(table.len(), 1, "length {n}");
            assert_eq!(table[0].stage, Some(0.0));
        }
    }

    #[test]
    fn test_stride_positions() {
        let table = sample(&points(10));
        let kept: Vec<f64> = table.iter().filter_map(|p| p.stage).collect();
        assert_eq!(kept, vec![0.0, 4.0, 8.0]);

        assert_eq!(sample(&points(96)).len(), 24);
        assert_eq!(sample(&points(97)).len(), 25);
    }

    #[test]
    fn test_zero_stride_keeps_everything() {
        assert_eq!(sample_every(&points(5), 0).len(), 5);
    }
}
