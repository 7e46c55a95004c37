use crate::state::series::{AccelerationPoint, IndexedSample, Series};

/// Step differences `values[i] - values[i-1]`. Index 0 has no predecessor
/// and is reported as NaN so positions line up with the series.
pub fn step_slopes(values: &[f64]) -> Vec<f64> {
    let mut slopes = Vec::with_capacity(values.len());
    if !values.is_empty() {
        slopes.push(f64::NAN);
    }
    slopes.extend(values.windows(2).map(|w| w[1] - w[0]));
    slopes
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Outside,
    InRun,
}

/// Maximal runs of consecutive indices with a strictly negative slope.
///
/// A non-negative or NaN slope closes the open run. A run still open when
/// the sequence ends is kept.
pub fn downward_runs(slopes: &[f64]) -> Vec<Vec<usize>> {
    let mut runs = Vec::new();
    let mut current: Vec<usize> = Vec::new();
    let mut state = RunState::Outside;

    for (i, &slope) in slopes.iter().enumerate().skip(1) {
        if slope < 0.0 {
            current.push(i);
            state = RunState::InRun;
        } else if state == RunState::InRun {
            runs.push(std::mem::take(&mut current));
            state = RunState::Outside;
        }
    }
    if !current.is_empty() {
        runs.push(current);
    }

    runs
}

/// Index within `run` with the most negative slope. Ties keep the first.
pub fn steepest_step(run: &[usize], slopes: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for &i in run {
        match best {
            Some(b) if slopes[i] >= slopes[b] => {}
            _ => best = Some(i),
        }
    }
    best
}

/// One acceleration point per downward run, ordered by index.
pub fn find_downward_acceleration(series: &Series) -> Vec<AccelerationPoint> {
    let slopes = step_slopes(&series.values());
    let runs = downward_runs(&slopes);

    let points: Vec<AccelerationPoint> = runs
        .iter()
        .filter_map(|run| steepest_step(run, &slopes))
        .filter_map(|i| IndexedSample::from_series(series, i))
        .collect();

    tracing::debug!(runs = runs.len(), "Segmented downward runs");
    points
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
            .map(|(i, &v)| Sample::new(parse_timestamp(&format!("01/01/23 {i:02}:00")).unwrap(), v))
            .collect();
        Series::from_samples(samples, 5)
    }

    #[test]
    fn plateau_closes_run() {
        let s = series(&[10.0, 30.0, 5.0, 5.0, 50.0]);
        let slopes = step_slopes(&s.values());
        assert_eq!(downward_runs(&slopes), vec![vec![2]]);

        let points = find_downward_acceleration(&s);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].index, 2);
        assert_eq!(points[0].value, 5.0);
        assert_eq!(points[0].timestamp, s.samples()[2].timestamp);
    }

    #[test]
    fn monotone_descent_is_one_run_flushed_at_end() {
        let s = series(&[50.0, 40.0, 25.0, 24.0, 0.0]);
        let slopes = step_slopes(&s.values());
        assert_eq!(&slopes[1..], &[-10.0, -15.0, -1.0, -24.0]);
        assert_eq!(downward_runs(&slopes), vec![vec![1, 2, 3, 4]]);

        let points = find_downward_acceleration(&s);
        assert_eq!(points.len(), 1);
        assert_eq!((points[0].index, points[0].value), (4, 0.0));
    }

    #[test]
    fn short_series_have_no_runs() {
        assert!(find_downward_acceleration(&series(&[])).is_empty());
        assert!(find_downward_acceleration(&series(&[3.0])).is_empty());
    }

    #[test]
    fn single_drop_is_a_run() {
        let points = find_downward_acceleration(&series(&[5.0, 4.0]));
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].index, 1);
    }

    #[test]
    fn ties_keep_first_occurrence() {
        let slopes = step_slopes(&[10.0, 5.0, 0.0, -1.0]);
        assert_eq!(steepest_step(&[1, 2, 3], &slopes), Some(1));
    }

    #[test]
    fn nan_breaks_a_run() {
        let slopes = step_slopes(&[10.0, 9.0, f64::NAN, 8.0, 7.0]);
        assert_eq!(downward_runs(&slopes), vec![vec![1], vec![4]]);
    }

    #[test]
    fn runs_cover_every_negative_slope_once_and_are_maximal() {
        let values: Vec<f64> = (0..300).map(|i| (((i * 53) % 17) as f64) - 8.0).collect();
        let slopes = step_slopes(&values);
        let runs = downward_runs(&slopes);

        let mut seen = vec![0usize; slopes.len()];
        for run in &runs {
            assert!(!run.is_empty());
            assert!(run.windows(2).all(|w| w[1] == w[0] + 1));
            let first = run[0];
            let last = *run.last().unwrap();
            assert!(first == 1 || !(slopes[first - 1] < 0.0));
            assert!(last + 1 == slopes.len() || !(slopes[last + 1] < 0.0));
            for &i in run {
                seen[i] += 1;
            }
        }
        for (i, &slope) in slopes.iter().enumerate().skip(1) {
            assert_eq!(seen[i], usize::from(slope < 0.0));
        }

        for run in &runs {
            let best = steepest_step(run, &slopes).unwrap();
            assert!(run.iter().all(|&i| slopes[best] <= slopes[i]));
        }
    }

    #[test]
    fn points_are_ordered_by_index() {
        let s = series(&[9.0, 7.0, 8.0, 3.0, 1.0, 4.0, 2.0]);
        let indices: Vec<usize> = find_downward_acceleration(&s).iter().map(|p| p.index).collect();
        assert_eq!(indices, vec![1, 3, 6]);
    }
}
