//! Numeric helpers used by the fee estimator.
//!
//! Everything here is pure: no fee semantics, no I/O. The `f64` helpers
//! work on plain samples; [`quantile_exact`] and [`mean_rounded`] keep
//! integer samples exact above 2^53. Empty input is reported through
//! [`StatsError`] instead of producing `NaN`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by the statistics helpers.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("Cannot compute {operation} of an empty sample set")]
    EmptySamples { operation: &'static str },

    #[error("Quantile must be a number in [0, 1], got {q}")]
    InvalidQuantile { q: f64 },

    #[error("Integer overflow while computing {operation}")]
    Overflow { operation: &'static str },
}

/// A non-negative value held as an exact integer part plus a fraction in
/// `[0, 1)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Fractional {
    pub whole: u128,
    pub fraction: f64,
}

impl Fractional {
    pub const ZERO: Fractional = Fractional {
        whole: 0,
        fraction: 0.0,
    };

    pub const fn from_whole(whole: u128) -> Self {
        Self {
            whole,
            fraction: 0.0,
        }
    }

    /// Lossy view for display.
    pub fn to_f64(self) -> f64 {
        self.whole as f64 + self.fraction
    }
}

/// Return an ascending copy of `samples`. The input is left untouched.
pub fn sort_ascending(samples: &[f64]) -> Vec<f64> {
    let mut sorted = samples.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted
}

/// Additive total of all samples. `sum(&[]) == 0.0`.
pub fn sum(samples: &[f64]) -> f64 {
    samples.iter().sum()
}

/// Arithmetic mean rounded to the nearest integer.
pub fn mean(samples: &[f64]) -> Result<f64, StatsError> {
    if samples.is_empty() {
        return Err(StatsError::EmptySamples { operation: "mean" });
    }

    Ok((sum(samples) / samples.len() as f64).round())
}

/// Linear-interpolated quantile ("type 7").
///
/// `q = 0` yields the minimum and `q = 1` the maximum. Fractional ranks
/// interpolate between the two neighbouring order statistics.
pub fn quantile(samples: &[f64], q: f64) -> Result<f64, StatsError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::InvalidQuantile { q });
    }
    if samples.is_empty() {
        return Err(StatsError::EmptySamples { operation: "quantile" });
    }

    let sorted = sort_ascending(samples);
    let (base, rest) = rank(sorted.len(), q);

    match sorted.get(base + 1) {
        Some(next) => Ok(sorted[base] + rest * (next - sorted[base])),
        None => Ok(sorted[base]),
    }
}

/// Position of quantile `q` among `len` sorted samples, split into the
/// lower index and the interpolation weight of the next sample.
fn rank(len: usize, q: f64) -> (usize, f64) {
    let pos = (len - 1) as f64 * q;
    let base = pos.floor() as usize;
    (base, pos - base as f64)
}

/// [`quantile`] over integer samples.
///
/// The lower order statistic is taken exactly; only the interpolated
/// offset towards the next one goes through `f64`.
pub fn quantile_exact(samples: &[u128], q: f64) -> Result<Fractional, StatsError> {
    if !(0.0..=1.0).contains(&q) {
        return Err(StatsError::InvalidQuantile { q });
    }
    if samples.is_empty() {
        return Err(StatsError::EmptySamples { operation: "quantile" });
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let (base, rest) = rank(sorted.len(), q);
    let lower = sorted[base];

    let next = match sorted.get(base + 1) {
        Some(next) if rest > 0.0 => *next,
        _ => return Ok(Fractional::from_whole(lower)),
    };

    let gap = next - lower;
    let offset = rest * gap as f64;
    let offset_whole = (offset.floor() as u128).min(gap);

    Ok(Fractional {
        whole: lower + offset_whole,
        fraction: if offset_whole == gap {
            0.0
        } else {
            offset - offset.floor()
        },
    })
}

/// Mean of [`Fractional`] values rounded to the nearest integer (halves up).
///
/// Whole parts are summed in checked `u128` arithmetic.
pub fn mean_rounded(values: &[Fractional]) -> Result<u128, StatsError> {
    if values.is_empty() {
        return Err(StatsError::EmptySamples { operation: "mean" });
    }

    let whole = values
        .iter()
        .try_fold(0u128, |acc, v| acc.checked_add(v.whole))
        .ok_or(StatsError::Overflow { operation: "mean" })?;
    let fraction: f64 = values.iter().map(|v| v.fraction).sum();

    let n = values.len() as u128;
    // remainder < n and fraction < n, so the tail is below 2
    let tail = ((whole % n) as f64 + fraction) / values.len() as f64;

    (whole / n)
        .checked_add(tail.round() as u128)
        .ok_or(StatsError::Overflow { operation: "mean" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // ---- sort_ascending ----

    #[test]
    fn sort_ascending_does_not_mutate_input() {
        let samples = vec![3.0, 1.0, 2.0];
        let sorted = sort_ascending(&samples);

        assert_eq!(sorted, vec![1.0, 2.0, 3.0]);
        assert_eq!(samples, vec![3.0, 1.0, 2.0]);
    }

    // ---- sum ----

    #[test]
    fn sum_of_empty_is_zero() {
        assert_eq!(sum(&[]), 0.0);
    }

    #[test]
    fn sum_of_single_sample_is_that_sample() {
        assert_eq!(sum(&[42.0]), 42.0);
    }

    // ---- mean ----

    #[test]
    fn mean_of_empty_is_an_error() {
        assert_eq!(
            mean(&[]),
            Err(StatsError::EmptySamples { operation: "mean" })
        );
    }

    #[test]
    fn mean_rounds_to_nearest_integer() {
        assert_eq!(mean(&[1.0, 2.0]).unwrap(), 2.0); // 1.5 rounds up
        assert_eq!(mean(&[1.0, 1.0, 2.0]).unwrap(), 1.0); // 1.33
        assert_eq!(mean(&[1.0, 2.0, 2.0]).unwrap(), 2.0); // 1.67
    }

    #[test]
    fn mean_of_large_fee_values() {
        let samples = [4_414_699_130.0, 2_000_000_000.0, 2_500_000_000.0, 2_500_000_000.0];
        assert_eq!(mean(&samples).unwrap(), 2_853_674_783.0);
    }

    // ---- quantile ----

    #[test]
    fn quantile_of_odd_length_median_is_middle_element() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0, 5.0], 0.5).unwrap(), 3.0);
    }

    #[test]
    fn quantile_interpolates_between_neighbours() {
        assert_eq!(quantile(&[1.0, 2.0, 3.0, 4.0], 0.5).unwrap(), 2.5);
    }

    #[test]
    fn quantile_sorts_unordered_input() {
        assert_eq!(quantile(&[5.0, 1.0, 4.0, 2.0, 3.0], 0.5).unwrap(), 3.0);
    }

    #[test]
    fn quantile_of_empty_is_an_error() {
        assert_eq!(
            quantile(&[], 0.3),
            Err(StatsError::EmptySamples { operation: "quantile" })
        );
    }

    #[test]
    fn quantile_rejects_out_of_range_q() {
        assert!(matches!(
            quantile(&[1.0], 1.5),
            Err(StatsError::InvalidQuantile { .. })
        ));
        assert!(matches!(
            quantile(&[1.0], -0.1),
            Err(StatsError::InvalidQuantile { .. })
        ));
        assert!(matches!(
            quantile(&[1.0], f64::NAN),
            Err(StatsError::InvalidQuantile { .. })
        ));
    }

    #[test]
    fn quantile_with_duplicates() {
        let samples = [1.5e9, 1.5e9, 1.5e9, 2.0e9];
        assert_eq!(quantile(&samples, 0.3).unwrap(), 1.5e9);
        assert_eq!(quantile(&samples, 0.6).unwrap(), 1.5e9);
        // pos = 2.7 -> 1.5e9 + 0.7 * 0.5e9
        assert!((quantile(&samples, 0.9).unwrap() - 1.85e9).abs() < 1e-3);
    }

    // ---- quantile_exact / mean_rounded ----

    #[test]
    fn quantile_exact_keeps_values_above_2_pow_53() {
        let fee = (1u128 << 53) + 1;
        for q in [0.0, 0.3, 0.6, 0.9, 1.0] {
            assert_eq!(quantile_exact(&[fee], q).unwrap(), Fractional::from_whole(fee));
        }
        assert_eq!(mean_rounded(&[Fractional::from_whole(fee)]).unwrap(), fee);
    }

    #[test]
    fn quantile_exact_interpolates_on_top_of_the_lower_sample() {
        let big = 1u128 << 60;
        // pos = 0.5 between big and big + 2
        let q = quantile_exact(&[big + 2, big], 0.5).unwrap();
        assert_eq!(q.whole, big + 1);
        assert_eq!(q.fraction, 0.0);

        let q = quantile_exact(&[1, 2, 3, 4], 0.5).unwrap();
        assert_eq!(q.whole, 2);
        assert_eq!(q.fraction, 0.5);
    }

    #[test]
    fn quantile_exact_matches_reference_tiers() {
        let fees = [1_000_000_000u128, 2_000_000_000, 3_000_000_000, 4_000_000_000, 5_000_000_000];
        assert!((quantile_exact(&fees, 0.3).unwrap().to_f64() - 2.2e9).abs() < 1.0);
        assert!((quantile_exact(&fees, 0.6).unwrap().to_f64() - 3.4e9).abs() < 1.0);
        assert!((quantile_exact(&fees, 0.9).unwrap().to_f64() - 4.6e9).abs() < 1.0);
    }

    #[test]
    fn quantile_exact_rejects_bad_input() {
        assert_eq!(
            quantile_exact(&[], 0.3),
            Err(StatsError::EmptySamples { operation: "quantile" })
        );
        assert!(matches!(
            quantile_exact(&[1], 1.5),
            Err(StatsError::InvalidQuantile { .. })
        ));
    }

    #[test]
    fn mean_rounded_rounds_halves_up() {
        let values = [4_414_699_130u128, 2_000_000_000, 2_500_000_000, 2_500_000_000]
            .map(Fractional::from_whole);
        assert_eq!(mean_rounded(&values).unwrap(), 2_853_674_783);

        let values = [
            Fractional { whole: 10, fraction: 0.25 },
            Fractional { whole: 11, fraction: 0.5 },
        ];
        // 21.75 / 2 = 10.875
        assert_eq!(mean_rounded(&values).unwrap(), 11);
    }

    #[test]
    fn mean_rounded_of_empty_is_an_error() {
        assert_eq!(
            mean_rounded(&[]),
            Err(StatsError::EmptySamples { operation: "mean" })
        );
    }

    #[test]
    fn mean_rounded_detects_overflow() {
        let values = [Fractional::from_whole(u128::MAX), Fractional::from_whole(1)];
        assert_eq!(
            mean_rounded(&values),
            Err(StatsError::Overflow { operation: "mean" })
        );
    }

    // ---- properties ----

    fn samples_strategy() -> impl Strategy<Value = Vec<f64>> {
        prop::collection::vec(0u64..100_000_000_000u64, 1..64)
            .prop_map(|v| v.into_iter().map(|x| x as f64).collect())
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_quantile_bounds_are_min_and_max(samples in samples_strategy()) {
            let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
            let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

            prop_assert_eq!(quantile(&samples, 0.0).unwrap(), min);
            prop_assert_eq!(quantile(&samples, 1.0).unwrap(), max);
        }

        #[test]
        fn prop_quantile_is_monotone(samples in samples_strategy()) {
            let p30 = quantile(&samples, 0.3).unwrap();
            let p60 = quantile(&samples, 0.6).unwrap();
            let p90 = quantile(&samples, 0.9).unwrap();

            prop_assert!(p30 <= p60);
            prop_assert!(p60 <= p90);
        }

        #[test]
        fn prop_quantile_of_single_sample(x in 0u64..u32::MAX as u64, q in 0.0f64..=1.0) {
            prop_assert_eq!(quantile(&[x as f64], q).unwrap(), x as f64);
        }

        #[test]
        fn prop_quantile_exact_stays_within_samples(
            samples in prop::collection::vec(any::<u128>(), 1..32),
            q in 0.0f64..=1.0,
        ) {
            let min = *samples.iter().min().unwrap();
            let max = *samples.iter().max().unwrap();
            let value = quantile_exact(&samples, q).unwrap();

            prop_assert!(value.whole >= min);
            prop_assert!(value.whole <= max);
            prop_assert!((0.0..1.0).contains(&value.fraction));
        }

        #[test]
        fn prop_sum_is_order_independent(samples in samples_strategy()) {
            let mut reversed = samples.clone();
            reversed.reverse();

            // integer-valued samples well below 2^53 sum exactly
            prop_assert_eq!(sum(&samples), sum(&reversed));
            prop_assert_eq!(sum(&samples), sum(&sort_ascending(&samples)));
        }
    }
}
