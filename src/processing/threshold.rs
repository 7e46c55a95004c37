use crate::state::series::{IndexedSample, Series};

/// Every sample whose value is strictly below `threshold`, in series order.
pub fn below_threshold(series: &Series, threshold: f64) -> Vec<IndexedSample> {
    series
        .samples()
        .iter()
        .enumerate()
        .filter(|(_, s)| s.value < threshold)
        .map(|(index, s)| IndexedSample {
            index,
            timestamp: s.timestamp,
            value: s.value,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::datetime::parse_timestamp;
    use crate::state::series::Sample;

    fn series(values: &[f64]) -> Series {
        let samples = values
            .iter()
            .enumerate()
            .map(|(i, &v)| Sample::new(parse_timestamp(&format!("01/01/23 00:{i:02}")).unwrap(), v))
            .collect();
        Series::from_samples(samples, 5)
    }

    #[test]
    fn keeps_only_strictly_below() {
        let s = series(&[25.0, 19.9, 20.0, 3.0, f64::NAN, -1.0]);
        let below = below_threshold(&s, 20.0);
        let indices: Vec<usize> = below.iter().map(|b| b.index).collect();
        assert_eq!(indices, vec![1, 3, 5]);
        assert_eq!(below[0].value, 19.9);
    }

    #[test]
    fn matches_set_definition() {
        let values: Vec<f64> = (0..60).map(|i| ((i * 7) % 40) as f64).collect();
        let s = series(&values);
        let below = below_threshold(&s, 20.0);
        let expected: Vec<f64> = values.iter().copied().filter(|v| *v < 20.0).collect();
        let got: Vec<f64> = below.iter().map(|b| b.value).collect();
        assert_eq!(got, expected);
    }

    #[test]
    fn empty_series_gives_empty_output() {
        assert!(below_threshold(&series(&[]), 20.0).is_empty());
    }
}
