// src/economics/percentile.rs

/// Lower-bound weighted percentile.
///
/// Sorts `(value, weight)` pairs by value, accumulates weights, and returns
/// the first value whose running weight reaches `percentile * total`. No
/// interpolation between neighbours. Empty input yields 0.
pub fn weighted_percentile(samples: &[(f64, f64)], percentile: f64) -> f64 {
    let mut sorted: Vec<(f64, f64)> = samples.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let Some(&(last, _)) = sorted.last() else {
        return 0.0;
    };

    let total: f64 = sorted.iter().map(|(_, w)| w).sum();
    let target = total * percentile;

    let mut cumulative = 0.0;
    for (value, weight) in &sorted {
        cumulative += weight;
        if cumulative >= target {
            return *value;
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn picks_lower_bound_value() {
        let samples = [(300.0, 1.0), (100.0, 1.0), (200.0, 1.0), (400.0, 1.0)];
        assert_eq!(weighted_percentile(&samples, 0.5), 200.0);
        assert_eq!(weighted_percentile(&samples, 0.75), 300.0);
        assert_eq!(weighted_percentile(&samples, 1.0), 400.0);
    }

    #[test]
    fn weights_shift_the_result() {
        let samples = [(100.0, 300.0), (200.0, 310.0), (500.0, 365.0)];
        // total 975: p50 target 487.5 is reached at 200, p75 target 731.25 at 500.
        assert_eq!(weighted_percentile(&samples, 0.5), 200.0);
        assert_eq!(weighted_percentile(&samples, 0.75), 500.0);

        let heavy_low = [(100.0, 900.0), (500.0, 100.0)];
        assert_eq!(weighted_percentile(&heavy_low, 0.75), 100.0);
    }

    #[test]
    fn empty_is_zero() {
        assert_eq!(weighted_percentile(&[], 0.5), 0.0);
    }

    proptest! {
        #[test]
        fn p75_never_below_p50(
            samples in prop::collection::vec((0.0f64..1e6, 1.0f64..400.0), 1..40)
        ) {
            let p50 = weighted_percentile(&samples, 0.5);
            let p75 = weighted_percentile(&samples, 0.75);
            prop_assert!(p75 >= p50);
        }
    }
}
