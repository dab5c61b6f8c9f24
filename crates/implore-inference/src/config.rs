//! Inference configuration (Monte Carlo switch, post-hoc method selection).
//!
//! Options are passed by reference into every test call and copied on entry,
//! so a test never observes a change part-way through.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::InferenceError;

/// Default number of resampling iterations
pub const DEFAULT_ITERATIONS: usize = 10_000;

/// Default significance level
pub const DEFAULT_ALPHA: f64 = 0.05;

/// Monte Carlo resampling settings for the nonparametric tests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloOptions {
    /// Use the permutation path instead of the asymptotic one
    pub enabled: bool,
    pub iterations: usize,
    /// Fixed seed for reproducible p-values; entropy-seeded when `None`
    pub seed: Option<u64>,
    /// Stop resampling after this much wall time
    pub time_budget: Option<Duration>,
}

impl Default for MonteCarloOptions {
    fn default() -> Self {
        Self {
            enabled: false,
            iterations: DEFAULT_ITERATIONS,
            seed: None,
            time_budget: None,
        }
    }
}

impl MonteCarloOptions {
    /// Enabled with the default iteration count
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn with_iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_time_budget(mut self, budget: Duration) -> Self {
        self.time_budget = Some(budget);
        self
    }
}

/// Pairwise post-hoc procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PairwiseMethod {
    Tukey,
    Scheffe,
    Lsd,
    Dunn,
    SteelDwass,
}

impl PairwiseMethod {
    /// Every method, parametric first
    pub const ALL: [PairwiseMethod; 5] = [
        Self::Tukey,
        Self::Scheffe,
        Self::Lsd,
        Self::Dunn,
        Self::SteelDwass,
    ];

    /// Methods comparing means under a pooled variance
    pub fn is_parametric(&self) -> bool {
        matches!(self, Self::Tukey | Self::Scheffe | Self::Lsd)
    }

    /// Whether p-values are multiplied by the number of pairs
    pub fn uses_bonferroni(&self) -> bool {
        !matches!(self, Self::Tukey | Self::Scheffe)
    }

    /// Stable method tag
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Tukey => "tukey",
            Self::Scheffe => "scheffe",
            Self::Lsd => "lsd",
            Self::Dunn => "dunn",
            Self::SteelDwass => "steel-dwass",
        }
    }

    /// Display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tukey => "Tukey HSD",
            Self::Scheffe => "Scheffé",
            Self::Lsd => "Fisher's LSD",
            Self::Dunn => "Dunn",
            Self::SteelDwass => "Steel-Dwass",
        }
    }
}

impl fmt::Display for PairwiseMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for PairwiseMethod {
    type Err = InferenceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "tukey" => Ok(Self::Tukey),
            "scheffe" | "scheffé" => Ok(Self::Scheffe),
            "lsd" => Ok(Self::Lsd),
            "dunn" => Ok(Self::Dunn),
            "steel-dwass" => Ok(Self::SteelDwass),
            _ => Err(InferenceError::UnknownMethod {
                method: s.to_string(),
            }),
        }
    }
}

/// Options for the group comparison entry points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceOptions {
    pub monte_carlo: MonteCarloOptions,
    /// Post-hoc method when every group passed its normality test
    pub parametric_method: PairwiseMethod,
    /// Post-hoc method on the rank-based path
    pub nonparametric_method: PairwiseMethod,
    pub alpha: f64,
    /// Run pairwise comparisons for three or more groups
    pub post_hoc: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self {
            monte_carlo: MonteCarloOptions::default(),
            parametric_method: PairwiseMethod::Tukey,
            nonparametric_method: PairwiseMethod::Dunn,
            alpha: DEFAULT_ALPHA,
            post_hoc: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = InferenceOptions::default();
        assert!(!opts.monte_carlo.enabled);
        assert_eq!(opts.monte_carlo.iterations, 10_000);
        assert_eq!(opts.parametric_method, PairwiseMethod::Tukey);
        assert_eq!(opts.nonparametric_method, PairwiseMethod::Dunn);
        assert_eq!(opts.alpha, 0.05);
    }

    #[test]
    fn test_method_tags_round_trip() {
        for method in PairwiseMethod::ALL {
            assert_eq!(method.tag().parse::<PairwiseMethod>(), Ok(method));
        }
        assert_eq!(" Tukey ".parse::<PairwiseMethod>(), Ok(PairwiseMethod::Tukey));
    }

    #[test]
    fn test_unknown_method_rejected() {
        let err = "bonferroni".parse::<PairwiseMethod>().unwrap_err();
        assert_eq!(
            err,
            InferenceError::UnknownMethod {
                method: "bonferroni".to_string()
            }
        );
    }

    #[test]
    fn test_method_families() {
        assert!(PairwiseMethod::Lsd.is_parametric());
        assert!(!PairwiseMethod::Dunn.is_parametric());
        assert!(!PairwiseMethod::Tukey.uses_bonferroni());
        assert!(!PairwiseMethod::Scheffe.uses_bonferroni());
        assert!(PairwiseMethod::Lsd.uses_bonferroni());
        assert!(PairwiseMethod::SteelDwass.uses_bonferroni());
    }

    #[test]
    fn test_builder() {
        let mc = MonteCarloOptions::enabled()
            .with_iterations(500)
            .with_seed(7)
            .with_time_budget(Duration::from_millis(10));
        assert!(mc.enabled);
        assert_eq!(mc.iterations, 500);
        assert_eq!(mc.seed, Some(7));
        assert_eq!(mc.time_budget, Some(Duration::from_millis(10)));
    }
}
