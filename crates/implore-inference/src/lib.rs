//! implore-inference - Statistical inference engine for implore
//!
//! This crate turns plain numeric samples into structured test results:
//!
//! - **Special functions**: erf, log-gamma, regularized incomplete beta/gamma
//! - **Distributions**: normal, Student t, chi-square and F CDFs
//! - **Descriptive**: moments, R-7 quantiles, mid-ranks, [`Summary`]
//! - **Normality**: Shapiro-Wilk (n ≤ 50) and Lilliefors (n > 50)
//! - **Hypothesis tests**: t-test, ANOVA, chi-square, Mann-Whitney,
//!   Kruskal-Wallis, Fisher's exact; rank tests and Fisher's test can resample
//! - **Post-hoc**: Tukey, Scheffé, LSD, Dunn, Steel-Dwass
//! - **Effect sizes**: d, g, r, η², ω², ε², V, φ, ρ with interpretation bands
//!
//! # Design Philosophy
//!
//! Every entry point is a synchronous function of its inputs. Non-finite
//! values are dropped once at the entry point, configuration is passed in
//! explicitly ([`InferenceOptions`]), and failures come back as
//! [`InferenceError`] values so a batch of variables can be analysed without
//! aborting on the first bad one. Numeric helpers signal failure with NaN.
//!
//! Presentation (number formatting, localized text) is left to the caller;
//! interpretation bands expose stable tags for that purpose.

pub mod analysis;
pub mod config;
pub mod descriptive;
pub mod distribution;
pub mod effect_size;
pub mod error;
pub mod hypothesis;
pub mod monte_carlo;
pub mod normality;
pub mod pairwise;
pub mod special;

pub use analysis::{
    compare_groups, test_association, Association, GroupComparison, GroupDescription,
};
pub use config::{InferenceOptions, MonteCarloOptions, PairwiseMethod};
pub use descriptive::Summary;
pub use distribution::*;
pub use effect_size::{
    CorrelationStrength, EffectSize, EffectSizeKind, Interpretation, Magnitude,
};
pub use error::{InferenceError, InferenceResult};
pub use hypothesis::{
    chi_square_independence, fisher_exact_monte_carlo, kruskal_wallis, mann_whitney,
    one_way_anova, t_test, FisherTable, TestMethod, TestResult,
};
pub use monte_carlo::MonteCarloOutcome;
pub use normality::{
    group_normality_status, lilliefors, normality_test, shapiro_wilk, GroupNormalityStatus,
    NormalityConclusion, NormalityReport, NormalityTest,
};
pub use pairwise::{pairwise_comparisons, GroupedSamples, PairwiseComparison};
pub use special::{erf, incomplete_beta, incomplete_gamma, ln_gamma, normal_quantile};
