//! Pairwise post-hoc comparisons.
//!
//! All k(k−1)/2 unordered pairs are compared in nested ascending order of
//! group insertion (`(0,1), (0,2), …, (1,2), …`).
//!
//! - Parametric (Tukey, Scheffé, LSD): mean differences over the pooled
//!   within-group variance
//! - Rank-based (Dunn, Steel-Dwass): mean-rank differences over mid-ranks of
//!   all groups pooled
//!
//! LSD, Dunn and Steel-Dwass p-values are Bonferroni corrected.

use serde::{Deserialize, Serialize};

use crate::config::PairwiseMethod;
use crate::descriptive::{mean, ranks};
use crate::distribution::{chi_square_cdf, normal_cdf, two_sided_normal_p, two_sided_t_p};
use crate::error::{validation, InferenceError, InferenceResult};
use crate::hypothesis::clean_groups;

/// Named samples kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupedSamples {
    names: Vec<String>,
    samples: Vec<Vec<f64>>,
}

impl GroupedSamples {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add values to a group, creating it at the end if the name is new
    pub fn insert(&mut self, name: impl Into<String>, values: impl IntoIterator<Item = f64>) {
        let name = name.into();
        match self.names.iter().position(|n| *n == name) {
            Some(i) => self.samples[i].extend(values),
            None => {
                self.names.push(name);
                self.samples.push(values.into_iter().collect());
            }
        }
    }

    /// Group `values` by a parallel categorical column, in order of first
    /// appearance
    pub fn from_labeled<L: AsRef<str>>(labels: &[L], values: &[f64]) -> InferenceResult<Self> {
        validation::require_same_len(labels.len(), values.len())?;
        let mut groups = Self::new();
        for (label, &value) in labels.iter().zip(values) {
            groups.insert(label.as_ref(), [value]);
        }
        Ok(groups)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn samples(&self) -> &[Vec<f64>] {
        &self.samples
    }

    pub fn get(&self, name: &str) -> Option<&[f64]> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.samples[i].as_slice())
    }

    /// Number of groups
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[f64])> {
        self.names
            .iter()
            .map(String::as_str)
            .zip(self.samples.iter().map(Vec::as_slice))
    }

    /// Finite values of every group, failing on a group with none
    pub(crate) fn cleaned(&self) -> InferenceResult<Vec<Vec<f64>>> {
        clean_groups(&self.samples, |i| self.names[i].clone())
    }
}

impl<N: Into<String>> FromIterator<(N, Vec<f64>)> for GroupedSamples {
    fn from_iter<I: IntoIterator<Item = (N, Vec<f64>)>>(iter: I) -> Self {
        let mut groups = Self::new();
        for (name, values) in iter {
            groups.insert(name, values);
        }
        groups
    }
}

/// One pairwise comparison
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairwiseComparison {
    pub group1: String,
    pub group2: String,
    /// Absolute mean difference, or mean-rank difference for rank methods
    pub difference: f64,
    pub statistic: f64,
    pub standard_error: f64,
    /// p-value after any correction, within [0, 1]
    pub p_value: f64,
    pub method: PairwiseMethod,
}

impl PairwiseComparison {
    /// Copy with `difference`, `statistic` and `standard_error` rounded to
    /// 4 decimals for display. Significance must be judged on the unrounded
    /// value.
    pub fn rounded(&self) -> Self {
        Self {
            difference: round4(self.difference),
            statistic: round4(self.statistic),
            standard_error: round4(self.standard_error),
            ..self.clone()
        }
    }

    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

fn round4(x: f64) -> f64 {
    if x.is_finite() {
        (x * 1e4).round() / 1e4
    } else {
        x
    }
}

/// Bonferroni correction: `min(1, p·m)`
pub fn bonferroni(p_value: f64, comparisons: usize) -> f64 {
    (p_value * comparisons as f64).min(1.0)
}

/// Statistic and uncorrected p-value for one pair.
///
/// A zero standard error yields `(0, 1)` for equal centres and `(∞, 0)`
/// otherwise.
fn evaluate(
    method: PairwiseMethod,
    difference: f64,
    se: f64,
    k: usize,
    error_df: f64,
) -> (f64, f64) {
    if se == 0.0 {
        return if difference == 0.0 {
            (0.0, 1.0)
        } else {
            (f64::INFINITY, 0.0)
        };
    }
    let ratio = difference / se;
    match method {
        PairwiseMethod::Tukey => (ratio, 1.0 - normal_cdf(ratio / std::f64::consts::SQRT_2)),
        PairwiseMethod::Scheffe => {
            let df = (k - 1) as f64;
            let f = ratio * ratio * df;
            (f, 1.0 - chi_square_cdf(f, df))
        }
        PairwiseMethod::Lsd | PairwiseMethod::SteelDwass => (ratio, two_sided_t_p(ratio, error_df)),
        PairwiseMethod::Dunn => (ratio, two_sided_normal_p(ratio)),
    }
}

/// Pooled within-group variance (MSE) over groups with at least 2 values
fn pooled_variance(groups: &[Vec<f64>]) -> f64 {
    let (ss, df) = groups
        .iter()
        .filter(|g| g.len() > 1)
        .fold((0.0, 0usize), |(ss, df), g| {
            let m = mean(g);
            (ss + g.iter().map(|x| (x - m).powi(2)).sum::<f64>(), df + g.len() - 1)
        });
    ss / df as f64
}

/// Compare every pair of groups with `method`.
///
/// Needs at least 2 groups and more observations than groups, so the error
/// degrees of freedom `N − k` are positive.
pub fn pairwise_comparisons(
    groups: &GroupedSamples,
    method: PairwiseMethod,
) -> InferenceResult<Vec<PairwiseComparison>> {
    validation::require_groups(groups.len(), 2)?;
    let clean = groups.cleaned()?;
    let k = clean.len();
    let sizes: Vec<usize> = clean.iter().map(Vec::len).collect();
    let n: usize = sizes.iter().sum();
    validation::require_len(method.display_name(), n, k + 1)?;
    let error_df = (n - k) as f64;

    // Per-group centres (means or mean ranks) and the variance scale
    let (centres, scale): (Vec<f64>, f64) = if method.is_parametric() {
        let mse = pooled_variance(&clean);
        (clean.iter().map(|g| mean(g)).collect(), mse)
    } else {
        let pooled_ranks = ranks(&clean.concat());
        let mut offset = 0;
        let mean_ranks = sizes
            .iter()
            .map(|&size| {
                let m = mean(&pooled_ranks[offset..offset + size]);
                offset += size;
                m
            })
            .collect();
        let nf = n as f64;
        (mean_ranks, nf * (nf + 1.0) / 12.0)
    };
    if !scale.is_finite() {
        return Err(InferenceError::NonFinite {
            routine: "pairwise variance",
        });
    }
    tracing::debug!(method = method.tag(), k, n, "pairwise comparisons");

    let pairs = k * (k - 1) / 2;
    let names = groups.names();
    let mut comparisons = Vec::with_capacity(pairs);
    for i in 0..k {
        for j in (i + 1)..k {
            let difference = (centres[i] - centres[j]).abs();
            let se = (scale * (1.0 / sizes[i] as f64 + 1.0 / sizes[j] as f64)).sqrt();
            let (statistic, raw_p) = evaluate(method, difference, se, k, error_df);
            let p = if method.uses_bonferroni() {
                bonferroni(raw_p, pairs)
            } else {
                raw_p
            };
            comparisons.push(PairwiseComparison {
                group1: names[i].clone(),
                group2: names[j].clone(),
                difference,
                statistic,
                standard_error: se,
                p_value: p.clamp(0.0, 1.0),
                method,
            });
        }
    }
    Ok(comparisons)
}
