/// Trailing mean over up to `window` samples ending at each index.
///
/// The first `window - 1` outputs average however many samples exist so far.
/// NaN inputs are skipped; an output is NaN only when its window holds
/// nothing else. Infinities are averaged like any other value, so an infinite
/// sample makes every output whose window contains it infinite.
/// A `window` of 0 is treated as 1.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut out = Vec::with_capacity(values.len());

    for i in 0..values.len() {
        let start = (i + 1).saturating_sub(window);
        let (sum, count) = values[start..=i]
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
        out.push(if count == 0 { f64::NAN } else { sum / count as f64 });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_sample_equals_itself() {
        assert_eq!(trailing_mean(&[3.5], 5), vec![3.5]);
    }

    #[test]
    fn warm_up_uses_available_samples() {
        let ma = trailing_mean(&[2.0, 4.0, 6.0], 5);
        assert_eq!(ma, vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn full_window_is_mean_of_last_five() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 100.0];
        let ma = trailing_mean(&values, 5);
        assert_eq!(ma.len(), values.len());
        for i in 4..values.len() {
            let expected = values[i - 4..=i].iter().sum::<f64>() / 5.0;
            assert!((ma[i] - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn skips_nan_inside_window() {
        let ma = trailing_mean(&[f64::NAN, 4.0, f64::NAN, 8.0], 5);
        assert!(ma[0].is_nan());
        assert_eq!(ma[1], 4.0);
        assert_eq!(ma[2], 4.0);
        assert_eq!(ma[3], 6.0);
    }

    #[test]
    fn infinity_propagates_through_window() {
        let ma = trailing_mean(&[1.0, f64::INFINITY, 3.0], 5);
        assert_eq!(ma, vec![1.0, f64::INFINITY, f64::INFINITY]);

        let ma = trailing_mean(&[1.0, f64::NEG_INFINITY, 3.0, 5.0], 2);
        assert_eq!(ma, vec![1.0, f64::NEG_INFINITY, f64::NEG_INFINITY, 4.0]);
    }

    #[test]
    fn empty_input() {
        assert!(trailing_mean(&[], 5).is_empty());
    }
}
