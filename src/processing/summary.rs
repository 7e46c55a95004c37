use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::data::datetime::format_timestamp;
use crate::state::series::{serialize_timestamp, AccelerationPoint, Series};

/// The largest single-step fall found among the acceleration points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SteepestDrop {
    pub index: usize,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    /// `values[index] - values[index - 1]`, always negative.
    pub change: f64,
}

/// Headline figures for one analysed signal, shown by the CLI and carried
/// in the JSON report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalSummary {
    /// Samples whose value parsed as a number.
    pub numeric_samples: usize,
    /// Lowest and highest numeric value.
    pub range: Option<(f64, f64)>,
    /// Last defined point of the moving average.
    pub latest_average: Option<f64>,
    /// Fraction of all samples strictly below the threshold.
    pub below_share: f64,
    pub steepest_drop: Option<SteepestDrop>,
}

impl SignalSummary {
    pub fn compute(series: &Series, below_count: usize, acceleration: &[AccelerationPoint]) -> Self {
        let values = series.values();
        let numeric: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        let range = numeric.iter().fold(None, |acc: Option<(f64, f64)>, &v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        });
        let latest_average = series
            .moving_average()
            .iter()
            .rev()
            .find(|v| !v.is_nan())
            .copied();
        let below_share = if series.is_empty() {
            0.0
        } else {
            below_count as f64 / series.len() as f64
        };

        let mut steepest_drop: Option<SteepestDrop> = None;
        for point in acceleration.iter().filter(|p| p.index > 0) {
            let change = values[point.index] - values[point.index - 1];
            if steepest_drop.is_some_and(|d| change >= d.change) {
                continue;
            }
            steepest_drop = Some(SteepestDrop {
                index: point.index,
                timestamp: point.timestamp,
                change,
            });
        }

        Self {
            numeric_samples: numeric.len(),
            range,
            latest_average,
            below_share,
            steepest_drop,
        }
    }
}

impl fmt::Display for SignalSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range {
            Some((lo, hi)) => writeln!(
                f,
                "Range: {lo} to {hi} over {} numeric samples",
                self.numeric_samples
            )?,
            None => writeln!(f, "Range: no numeric samples")?,
        }
        if let Some(avg) = self.latest_average {
            writeln!(f, "Latest moving average: {avg:.3}")?;
        }
        writeln!(f, "Below threshold: {:.1}% of samples", self.below_share * 100.0)?;
        if let Some(drop) = &self.steepest_drop {
            writeln!(
                f,
                "Steepest drop: {} at index {} ({})",
                drop.change,
                drop.index,
                format_timestamp(drop.timestamp)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datetime::parse_timestamp;
    use crate::processing::descent::find_downward_acceleration;
    use crate::processing::threshold::below_threshold;
    use crate::state::series::Sample;

    fn series(values: &[f64]) -> Series {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(parse_timestamp(&format!("01/01/23 00:{i:02}")).unwrap(), v))
            .collect();
        Series::from_samples(samples, 2)
    }

    fn summarize(s: &Series) -> SignalSummary {
        let below = below_threshold(s, 20.0).len();
        SignalSummary::compute(s, below, &find_downward_acceleration(s))
    }

    #[test]
    fn picks_steepest_drop_across_runs() {
        // runs [1, 2] and [4]; steps -10, -5, then -40
        let s = series(&[50.0, 40.0, 35.0, 60.0, 20.0]);
        let summary = summarize(&s);
        assert_eq!(summary.range, Some((20.0, 60.0)));
        assert_eq!(summary.latest_average, Some(40.0));
        let drop = summary.steepest_drop.unwrap();
        assert_eq!((drop.index, drop.change), (4, -40.0));
        assert_eq!(summary.below_share, 0.0);
    }

    #[test]
    fn ignores_nan_values() {
        let s = series(&[f64::NAN, 10.0, f64::NAN, 30.0]);
        let summary = summarize(&s);
        assert_eq!(summary.numeric_samples, 2);
        assert_eq!(summary.range, Some((10.0, 30.0)));
        assert_eq!(summary.below_share, 0.25);
        assert!(summary.steepest_drop.is_none());
    }

    #[test]
    fn empty_series() {
        let summary = summarize(&series(&[]));
        assert_eq!(summary.range, None);
        assert_eq!(summary.latest_average, None);
        assert_eq!(summary.below_share, 0.0);
        assert_eq!(summary.to_string(), "Range: no numeric samples\nBelow threshold: 0.0% of samples\n");
    }

    #[test]
    fn display_lists_drop() {
        let summary = summarize(&series(&[30.0, 10.0]));
        let text = summary.to_string();
        assert!(text.contains("Below threshold: 50.0% of samples"));
        assert!(text.contains("Steepest drop: -20 at index 1 (2023-01-01 00:01:00)"));
    }
}
