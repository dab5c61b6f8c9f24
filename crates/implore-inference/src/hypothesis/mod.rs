//! Hypothesis tests
//!
//! - Parametric: Student's t, one-way ANOVA, Pearson chi-square
//! - Rank-based: Mann-Whitney U, Kruskal-Wallis H, each with an asymptotic
//!   and a Monte Carlo permutation path
//! - Fisher's exact test for r×c tables by Monte Carlo
//!
//! Every test returns a [`TestResult`].

mod fisher;
mod nonparametric;
mod parametric;

pub use fisher::*;
pub use nonparametric::*;
pub use parametric::*;

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::monte_carlo::MonteCarloOutcome;

/// Which test produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TestMethod {
    StudentT,
    OneWayAnova,
    ChiSquare,
    MannWhitney,
    KruskalWallis,
    FisherExact,
}

impl TestMethod {
    /// Display name for reports
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::StudentT => "Student's t-test",
            Self::OneWayAnova => "One-way ANOVA",
            Self::ChiSquare => "Chi-square test of independence",
            Self::MannWhitney => "Mann-Whitney U test",
            Self::KruskalWallis => "Kruskal-Wallis test",
            Self::FisherExact => "Fisher's Exact Test",
        }
    }
}

/// Outcome of a hypothesis test.
///
/// `statistic` is t, F, χ², U or H depending on `method`. Fisher's test has
/// no statistic and reports the observed table probability there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub method: TestMethod,
    pub statistic: f64,
    /// Degrees of freedom (numerator df for ANOVA)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df: Option<f64>,
    /// Denominator df for ANOVA
    #[serde(skip_serializing_if = "Option::is_none")]
    pub df2: Option<f64>,
    pub p_value: f64,
    /// Normal approximation z (Mann-Whitney)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub z: Option<f64>,
    /// Standard error of the difference (t-test)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub standard_error: Option<f64>,
    /// Asymptotic p-value, reported alongside a Monte Carlo one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asymptotic_p_value: Option<f64>,
    /// Resampling details when the Monte Carlo path ran
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monte_carlo: Option<MonteCarloOutcome>,
    /// Finite observations per group, in input order
    pub group_sizes: Vec<usize>,
}

impl TestResult {
    pub(crate) fn new(
        method: TestMethod,
        statistic: f64,
        p_value: f64,
        group_sizes: Vec<usize>,
    ) -> Self {
        Self {
            method,
            statistic,
            df: None,
            df2: None,
            p_value: p_value.clamp(0.0, 1.0),
            z: None,
            standard_error: None,
            asymptotic_p_value: None,
            monte_carlo: None,
            group_sizes,
        }
    }

    pub(crate) fn with_df(mut self, df: f64) -> Self {
        self.df = Some(df);
        self
    }

    /// Method name as shown in reports, marking the Monte Carlo path
    pub fn method_name(&self) -> String {
        match self.monte_carlo {
            Some(_) => format!("{} (Monte Carlo)", self.method.display_name()),
            None => self.method.display_name().to_string(),
        }
    }

    /// Total finite observations
    pub fn n(&self) -> usize {
        self.group_sizes.iter().sum()
    }

    /// Whether `p_value < alpha`
    pub fn is_significant(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

/// Clean each group and reject any that end up empty.
///
/// Names are only used for error messages.
pub(crate) fn clean_groups<S: AsRef<[f64]>>(
    groups: &[S],
    names: impl Fn(usize) -> String,
) -> Result<Vec<Vec<f64>>, InferenceError> {
    groups
        .iter()
        .enumerate()
        .map(|(i, g)| {
            let clean = crate::descriptive::clean_sample(g.as_ref());
            if clean.is_empty() {
                Err(InferenceError::EmptyGroup { group: names(i) })
            } else {
                Ok(clean)
            }
        })
        .collect()
}

/// Positional group name used in error messages
pub(crate) fn group_label(index: usize) -> String {
    format!("group {}", index + 1)
}
