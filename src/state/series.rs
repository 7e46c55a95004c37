use chrono::NaiveDateTime;
use serde::{Serialize, Serializer};

use crate::data::datetime;
use crate::processing::moving_average::trailing_mean;

pub(crate) fn serialize_timestamp<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&datetime::format_timestamp(*ts))
}

/// One parsed row of the input table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Sample {
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl Sample {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Time-ordered samples plus the derived trailing moving average.
///
/// Built once by the loader and only read afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    samples: Vec<Sample>,
    moving_average: Vec<f64>,
    window: usize,
}

impl Series {
    /// Stable-sort `samples` by timestamp and attach the moving average.
    /// Samples with equal timestamps keep their input order.
    pub fn from_samples(mut samples: Vec<Sample>, window: usize) -> Self {
        samples.sort_by_key(|s| s.timestamp);
        let values: Vec<f64> = samples.iter().map(|s| s.value).collect();
        let moving_average = trailing_mean(&values, window);
        Self {
            samples,
            moving_average,
            window,
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn moving_average(&self) -> &[f64] {
        &self.moving_average
    }

    pub fn window(&self) -> usize {
        self.window
    }

    pub fn values(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn timestamps(&self) -> Vec<NaiveDateTime> {
        self.samples.iter().map(|s| s.timestamp).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }
}

/// A sample referenced by its position in the series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndexedSample {
    pub index: usize,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl IndexedSample {
    pub fn from_series(series: &Series, index: usize) -> Option<Self> {
        series.get(index).map(|s| Self {
            index,
            timestamp: s.timestamp,
            value: s.value,
        })
    }
}

/// Strict local maxima and minima, in series order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Extrema {
    pub peaks: Vec<IndexedSample>,
    pub troughs: Vec<IndexedSample>,
}

impl Extrema {
    pub fn peak_indices(&self) -> Vec<usize> {
        self.peaks.iter().map(|p| p.index).collect()
    }

    pub fn trough_indices(&self) -> Vec<usize> {
        self.troughs.iter().map(|t| t.index).collect()
    }
}

/// The steepest single-step drop of one downward run. `index` is the
/// destination sample of that step.
pub type AccelerationPoint = IndexedSample;
