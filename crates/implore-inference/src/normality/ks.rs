//! Lilliefors test: Kolmogorov-Smirnov against a normal distribution whose
//! mean and standard deviation are estimated from the sample.
//!
//! The p-value comes from a table of critical values indexed by sample size
//! and significance level, interpolated linearly in log(n). When D is below
//! every tabulated critical value an empirical exponential tail is used.

use serde::{Deserialize, Serialize};

use crate::descriptive::{clean_sample, mean, std_dev};
use crate::distribution::normal_cdf;
use crate::error::{validation, InferenceResult};

/// Significance levels, one per column of [`CRITICAL_VALUES`]
pub const ALPHAS: [f64; 5] = [0.01, 0.05, 0.10, 0.15, 0.20];

/// Critical values of D by sample size, sorted by n
pub const CRITICAL_VALUES: [(usize, [f64; 5]); 19] = [
    (4, [0.417, 0.381, 0.352, 0.319, 0.300]),
    (5, [0.405, 0.337, 0.315, 0.299, 0.285]),
    (6, [0.364, 0.319, 0.294, 0.277, 0.265]),
    (7, [0.348, 0.300, 0.276, 0.258, 0.247]),
    (8, [0.331, 0.285, 0.261, 0.244, 0.233]),
    (9, [0.311, 0.271, 0.249, 0.233, 0.223]),
    (10, [0.294, 0.258, 0.239, 0.224, 0.215]),
    (11, [0.284, 0.249, 0.230, 0.217, 0.206]),
    (12, [0.275, 0.242, 0.223, 0.212, 0.199]),
    (13, [0.268, 0.234, 0.214, 0.202, 0.190]),
    (14, [0.261, 0.227, 0.207, 0.194, 0.183]),
    (15, [0.257, 0.220, 0.201, 0.187, 0.177]),
    (20, [0.231, 0.192, 0.177, 0.165, 0.156]),
    (25, [0.200, 0.180, 0.165, 0.155, 0.147]),
    (30, [0.187, 0.161, 0.144, 0.136, 0.131]),
    (40, [0.165, 0.141, 0.128, 0.122, 0.117]),
    (100, [0.111, 0.091, 0.084, 0.079, 0.076]),
    (400, [0.059, 0.048, 0.044, 0.041, 0.040]),
    (900, [0.040, 0.032, 0.029, 0.027, 0.026]),
];

/// Result of a Lilliefors test
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lilliefors {
    /// Two-sided KS distance D
    pub statistic: f64,
    pub p_value: f64,
    pub n: usize,
}

/// Critical value for sample size `n` at `ALPHAS[alpha_index]`.
///
/// Interpolates linearly in `ln n` between the bracketing table rows and
/// clamps to the first/last row outside the table.
pub fn interpolate_critical_value(n: usize, alpha_index: usize) -> f64 {
    let (first_n, first_row) = CRITICAL_VALUES[0];
    let (last_n, last_row) = CRITICAL_VALUES[CRITICAL_VALUES.len() - 1];
    if n <= first_n {
        return first_row[alpha_index];
    }
    if n >= last_n {
        return last_row[alpha_index];
    }

    let upper_pos = CRITICAL_VALUES.partition_point(|&(size, _)| size < n);
    let (upper_n, upper_row) = CRITICAL_VALUES[upper_pos];
    if upper_n == n {
        return upper_row[alpha_index];
    }
    let (lower_n, lower_row) = CRITICAL_VALUES[upper_pos - 1];

    let t = ((n as f64).ln() - (lower_n as f64).ln())
        / ((upper_n as f64).ln() - (lower_n as f64).ln());
    lower_row[alpha_index] + t * (upper_row[alpha_index] - lower_row[alpha_index])
}

/// Approximate p-value for statistic `d` at sample size `n`
pub fn lilliefors_p_value(n: usize, d: f64) -> f64 {
    for (i, &alpha) in ALPHAS.iter().enumerate() {
        if d > interpolate_critical_value(n, i) {
            return alpha;
        }
    }
    let p = (-7.01256 * (n as f64).sqrt() * d * d + 2.78019).exp();
    p.clamp(0.001, 0.999)
}

/// Lilliefors test on the finite values of `data`; requires n ≥ 4.
///
/// A constant sample short-circuits to `{statistic: 0, p_value: 1}`.
pub fn lilliefors(data: &[f64]) -> InferenceResult<Lilliefors> {
    let x = clean_sample(data);
    let n = x.len();
    validation::require_len("Lilliefors", n, 4)?;

    let m = mean(&x);
    let sd = std_dev(&x);
    if sd == 0.0 {
        return Ok(Lilliefors {
            statistic: 0.0,
            p_value: 1.0,
            n,
        });
    }

    let mut z: Vec<f64> = x.iter().map(|v| (v - m) / sd).collect();
    z.sort_by(f64::total_cmp);

    let nf = n as f64;
    let (d_plus, d_minus) = z
        .iter()
        .enumerate()
        .fold((0.0_f64, 0.0_f64), |(dp, dm), (i, &zi)| {
            let cdf = normal_cdf(zi);
            (
                dp.max((i + 1) as f64 / nf - cdf),
                dm.max(cdf - i as f64 / nf),
            )
        });
    let d = d_plus.max(d_minus);
    let p = lilliefors_p_value(n, d);
    tracing::trace!(n, d, p, "lilliefors");

    Ok(Lilliefors {
        statistic: d,
        p_value: p,
        n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_sorted() {
        assert!(CRITICAL_VALUES.windows(2).all(|w| w[0].0 < w[1].0));
        for (_, row) in CRITICAL_VALUES {
            assert!(row.windows(2).all(|w| w[0] >= w[1]));
        }
    }

    #[test]
    fn test_interpolation_exact_rows() {
        assert_eq!(interpolate_critical_value(10, 1), 0.258);
        assert_eq!(interpolate_critical_value(100, 0), 0.111);
    }

    #[test]
    fn test_interpolation_clamps() {
        assert_eq!(interpolate_critical_value(2, 1), 0.381);
        assert_eq!(interpolate_critical_value(5000, 1), 0.032);
    }

    #[test]
    fn test_interpolation_log_linear() {
        // n = 200 sits between 100 and 400, halfway in log space
        let cv = interpolate_critical_value(200, 1);
        assert!((cv - (0.091 + 0.048) / 2.0).abs() < 1e-12);
        // Strictly between the neighbours for a non-tabulated n
        let cv = interpolate_critical_value(60, 2);
        assert!(cv < 0.128 && cv > 0.084);
    }

    #[test]
    fn test_p_value_table_and_tail() {
        assert_eq!(lilliefors_p_value(100, 0.2), 0.01);
        assert_eq!(lilliefors_p_value(100, 0.1), 0.05);
        assert_eq!(lilliefors_p_value(100, 0.085), 0.10);
        let tail = lilliefors_p_value(100, 0.01);
        assert!((0.001..=0.999).contains(&tail));
    }

    #[test]
    fn test_constant_sample() {
        let r = lilliefors(&[3.0; 60]).unwrap();
        assert_eq!(r.statistic, 0.0);
        assert_eq!(r.p_value, 1.0);
    }

    #[test]
    fn test_insufficient() {
        assert!(lilliefors(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn test_statistic_in_unit_interval() {
        let data: Vec<f64> = (0..80).map(|i| ((i * 37) % 80) as f64).collect();
        let r = lilliefors(&data).unwrap();
        assert!(r.statistic > 0.0 && r.statistic < 1.0);
        assert!((0.0..=1.0).contains(&r.p_value));
    }
}
