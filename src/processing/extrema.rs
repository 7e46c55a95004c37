use crate::state::series::{Extrema, IndexedSample, Series};

/// Indices `i` in `1..n-1` where `values[i-1] < values[i] > values[i+1]`.
/// Plateaus and the two boundary samples are never reported.
pub fn local_maxima(values: &[f64]) -> Vec<usize> {
    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] < w[1] && w[1] > w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Indices `i` in `1..n-1` where `values[i-1] > values[i] < values[i+1]`.
pub fn local_minima(values: &[f64]) -> Vec<usize> {
    values
        .windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] > w[1] && w[1] < w[2])
        .map(|(i, _)| i + 1)
        .collect()
}

/// Peaks and troughs of the series value sequence.
pub fn find_extrema(series: &Series) -> Extrema {
    let values = series.values();
    let collect = |indices: Vec<usize>| -> Vec<IndexedSample> {
        indices
            .into_iter()
            .filter_map(|i| IndexedSample::from_series(series, i))
            .collect()
    };

    let extrema = Extrema {
        peaks: collect(local_maxima(&values)),
        troughs: collect(local_minima(&values)),
    };
    tracing::debug!(
        peaks = extrema.peaks.len(),
        troughs = extrema.troughs.len(),
        "Located extrema"
    );
    extrema
}
