//! Descriptive statistics for numeric samples
//!
//! Provides:
//! - Mean, sample variance, standard deviation
//! - Bias-corrected skewness and excess kurtosis
//! - Median and R-7 quantiles
//! - Mid-rank assignment for rank-based tests
//!
//! Every function ignores non-finite entries. Public test entry points call
//! [`clean_sample`] once so that all statistics within one call see the same n.

use serde::{Deserialize, Serialize};

/// Keep only the finite observations, preserving order
pub fn clean_sample(data: &[f64]) -> Vec<f64> {
    data.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Finite observations in ascending order
pub fn sorted_finite(data: &[f64]) -> Vec<f64> {
    let mut sorted = clean_sample(data);
    sorted.sort_by(f64::total_cmp);
    sorted
}

/// Arithmetic mean; NaN when there are no finite values
pub fn mean(data: &[f64]) -> f64 {
    let (sum, count) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, c), &x| (s + x, c + 1));
    if count == 0 {
        return f64::NAN;
    }
    sum / count as f64
}

/// Sample variance (n − 1 denominator); NaN for fewer than 2 finite values
pub fn variance(data: &[f64]) -> f64 {
    let m = mean(data);
    if m.is_nan() {
        return f64::NAN;
    }
    let (sum_sq, count) = data
        .iter()
        .filter(|x| x.is_finite())
        .fold((0.0, 0usize), |(s, c), &x| (s + (x - m).powi(2), c + 1));
    if count < 2 {
        return f64::NAN;
    }
    sum_sq / (count - 1) as f64
}

/// Sample standard deviation
pub fn std_dev(data: &[f64]) -> f64 {
    variance(data).sqrt()
}

/// Sum of `((x − mean) / sd)^power` over the finite values, with the count
fn standardized_moment_sum(data: &[f64], power: i32) -> Option<(f64, usize)> {
    let m = mean(data);
    let sd = std_dev(data);
    if m.is_nan() || sd.is_nan() || sd == 0.0 {
        return None;
    }
    Some(
        data.iter()
            .filter(|x| x.is_finite())
            .fold((0.0, 0usize), |(s, c), &x| {
                (s + ((x - m) / sd).powi(power), c + 1)
            }),
    )
}

/// Bias-corrected sample skewness; NaN for fewer than 3 values or zero spread
pub fn skewness(data: &[f64]) -> f64 {
    match standardized_moment_sum(data, 3) {
        Some((sum, count)) if count >= 3 => {
            let n = count as f64;
            n / ((n - 1.0) * (n - 2.0)) * sum
        }
        _ => f64::NAN,
    }
}

/// Bias-corrected excess kurtosis; NaN for fewer than 4 values or zero spread
pub fn kurtosis(data: &[f64]) -> f64 {
    match standardized_moment_sum(data, 4) {
        Some((sum, count)) if count >= 4 => {
            let n = count as f64;
            let term1 = n * (n + 1.0) / ((n - 1.0) * (n - 2.0) * (n - 3.0)) * sum;
            let term2 = 3.0 * (n - 1.0).powi(2) / ((n - 2.0) * (n - 3.0));
            term1 - term2
        }
        _ => f64::NAN,
    }
}

/// Median of the finite values
pub fn median(data: &[f64]) -> f64 {
    median_of_sorted(&sorted_finite(data))
}

fn median_of_sorted(sorted: &[f64]) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n % 2 == 0 {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    } else {
        sorted[n / 2]
    }
}

/// Quantile by linear interpolation of order statistics (R type 7)
///
/// NaN when `q` is outside `[0, 1]` or there are no finite values.
pub fn quantile(data: &[f64], q: f64) -> f64 {
    quantile_of_sorted(&sorted_finite(data), q)
}

fn quantile_of_sorted(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() || q.is_nan() || !(0.0..=1.0).contains(&q) {
        return f64::NAN;
    }
    let index = q * (sorted.len() - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;
    if lower == upper {
        return sorted[lower];
    }
    let weight = index - lower as f64;
    sorted[lower] * (1.0 - weight) + sorted[upper] * weight
}

/// Assign 1-based mid-ranks, averaging within tied blocks.
///
/// The output is parallel to the input; non-finite entries get NaN and do
/// not consume a rank. Over the n finite values the ranks sum to n(n+1)/2.
pub fn ranks(values: &[f64]) -> Vec<f64> {
    let mut order: Vec<usize> = (0..values.len())
        .filter(|&i| values[i].is_finite())
        .collect();
    order.sort_by(|&a, &b| values[a].total_cmp(&values[b]));

    let mut out = vec![f64::NAN; values.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && values[order[j + 1]] == values[order[i]] {
            j += 1;
        }
        let avg_rank = (i + j + 2) as f64 / 2.0;
        for &idx in &order[i..=j] {
            out[idx] = avg_rank;
        }
        i = j + 1;
    }
    out
}

/// Summary statistics for a numeric sample
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Summary {
    /// Number of finite values
    pub count: usize,
    /// Number of non-finite values dropped
    pub missing: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample variance
    pub variance: f64,
    pub std_dev: f64,
    pub median: f64,
    /// First quartile (R-7)
    pub q1: f64,
    /// Third quartile (R-7)
    pub q3: f64,
    pub skewness: f64,
    /// Excess kurtosis
    pub kurtosis: f64,
}

impl Summary {
    /// Compute summary statistics from a sample
    pub fn from_sample(data: &[f64]) -> Self {
        let finite = clean_sample(data);
        let missing = data.len() - finite.len();

        let mut sorted = finite.clone();
        sorted.sort_by(f64::total_cmp);

        Self {
            count: finite.len(),
            missing,
            min: sorted.first().copied().unwrap_or(f64::NAN),
            max: sorted.last().copied().unwrap_or(f64::NAN),
            mean: mean(&finite),
            variance: variance(&finite),
            std_dev: std_dev(&finite),
            median: median_of_sorted(&sorted),
            q1: quantile_of_sorted(&sorted, 0.25),
            q3: quantile_of_sorted(&sorted, 0.75),
            skewness: skewness(&finite),
            kurtosis: kurtosis(&finite),
        }
    }

    /// Get the range (max - min)
    pub fn range(&self) -> f64 {
        self.max - self.min
    }

    /// Get the interquartile range
    pub fn iqr(&self) -> f64 {
        self.q3 - self.q1
    }

    /// Coefficient of variation (std_dev / |mean|)
    pub fn cv(&self) -> f64 {
        self.std_dev / self.mean.abs()
    }
}
