//! Effect sizes and their qualitative interpretation.
//!
//! Estimators are pure functions of samples or of an already computed test
//! statistic. Interpretation bands use the usual published thresholds; a
//! value equal to a threshold belongs to the band above it. An undefined
//! (NaN) value, such as Cohen's d for two constant samples, is negligible.

use serde::{Deserialize, Serialize};

use crate::descriptive::{clean_sample, mean, ranks, variance};
use crate::error::{validation, InferenceResult};

/// Four-band magnitude for differences and associations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Magnitude {
    Negligible,
    Small,
    Medium,
    Large,
}

impl Magnitude {
    /// Band for `value` given the lower bounds of small, medium and large;
    /// NaN is negligible
    fn banded(value: f64, [small, medium, large]: [f64; 3]) -> Self {
        if value.is_nan() || value < small {
            Self::Negligible
        } else if value < medium {
            Self::Small
        } else if value < large {
            Self::Medium
        } else {
            Self::Large
        }
    }

    /// Localisation key
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Negligible => "effectSizeNegligible",
            Self::Small => "effectSizeSmall",
            Self::Medium => "effectSizeMedium",
            Self::Large => "effectSizeLarge",
        }
    }
}

/// Five-band strength for correlation coefficients
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CorrelationStrength {
    Negligible,
    Weak,
    Moderate,
    Strong,
    VeryStrong,
}

impl CorrelationStrength {
    /// Localisation key
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Negligible => "correlationNegligible",
            Self::Weak => "correlationWeak",
            Self::Moderate => "correlationModerate",
            Self::Strong => "correlationStrong",
            Self::VeryStrong => "correlationVeryStrong",
        }
    }
}

// Interpretation

pub fn interpret_cohens_d(d: f64) -> Magnitude {
    Magnitude::banded(d.abs(), [0.2, 0.5, 0.8])
}

pub fn interpret_rank_biserial(r: f64) -> Magnitude {
    Magnitude::banded(r.abs(), [0.2, 0.3, 0.5])
}

/// Bands for η² and ω²
pub fn interpret_eta_squared(eta2: f64) -> Magnitude {
    Magnitude::banded(eta2, [0.01, 0.06, 0.14])
}

pub fn interpret_epsilon_squared(epsilon2: f64) -> Magnitude {
    Magnitude::banded(epsilon2, [0.01, 0.04, 0.16])
}

/// Cramér's V bands depend on `df = min(rows, cols) − 1`
pub fn interpret_cramers_v(v: f64, df: usize) -> Magnitude {
    let thresholds = match df {
        0 | 1 => [0.1, 0.3, 0.5],
        2 => [0.07, 0.21, 0.35],
        _ => [0.06, 0.17, 0.29],
    };
    Magnitude::banded(v, thresholds)
}

pub fn interpret_phi(phi: f64) -> Magnitude {
    Magnitude::banded(phi, [0.1, 0.3, 0.5])
}

/// Strength of a Pearson or Spearman coefficient; NaN is negligible
pub fn interpret_correlation(r: f64) -> CorrelationStrength {
    let r = r.abs();
    if r.is_nan() || r < 0.1 {
        CorrelationStrength::Negligible
    } else if r < 0.3 {
        CorrelationStrength::Weak
    } else if r < 0.5 {
        CorrelationStrength::Moderate
    } else if r < 0.7 {
        CorrelationStrength::Strong
    } else {
        CorrelationStrength::VeryStrong
    }
}

// Estimators

/// Cohen's d, `|m1 − m2| / s_pooled`
pub fn cohens_d(a: &[f64], b: &[f64]) -> f64 {
    let (a, b) = (clean_sample(a), clean_sample(b));
    let (n1, n2) = (a.len() as f64, b.len() as f64);
    let pooled_sd =
        (((n1 - 1.0) * variance(&a) + (n2 - 1.0) * variance(&b)) / (n1 + n2 - 2.0)).sqrt();
    (mean(&a) - mean(&b)).abs() / pooled_sd
}

/// Hedges' g, Cohen's d with the small-sample factor `1 − 3/(4(n1+n2−2) − 1)`
pub fn hedges_g(a: &[f64], b: &[f64]) -> f64 {
    let df = (clean_sample(a).len() + clean_sample(b).len()) as f64 - 2.0;
    cohens_d(a, b) * (1.0 - 3.0 / (4.0 * df - 1.0))
}

/// Rank-biserial correlation from Mann-Whitney U, `1 − 2U/(n1·n2)`
pub fn rank_biserial(u: f64, n1: usize, n2: usize) -> f64 {
    1.0 - 2.0 * u / (n1 * n2) as f64
}

/// η² = SS_between / SS_total
pub fn eta_squared<S: AsRef<[f64]>>(groups: &[S]) -> f64 {
    let groups: Vec<Vec<f64>> = groups.iter().map(|g| clean_sample(g.as_ref())).collect();
    let all = groups.concat();
    let grand_mean = mean(&all);
    let ssb: f64 = groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.len() as f64 * (mean(g) - grand_mean).powi(2))
        .sum();
    let sst: f64 = all.iter().map(|x| (x - grand_mean).powi(2)).sum();
    ssb / sst
}

/// ω² from the ANOVA F statistic, `df_b(F − 1) / (df_b(F − 1) + N)`
pub fn omega_squared(f: f64, k: usize, n: usize) -> f64 {
    let dfb = k as f64 - 1.0;
    dfb * (f - 1.0) / (dfb * (f - 1.0) + n as f64)
}

/// ε² from Kruskal-Wallis H, `H / (N² / (N + 1))`
pub fn epsilon_squared(h: f64, n: usize) -> f64 {
    let n = n as f64;
    h / (n * n / (n + 1.0))
}

/// Cramér's V, `√(χ² / (N(min_dim − 1)))`
pub fn cramers_v(chi_square: f64, n: usize, min_dimension: usize) -> f64 {
    (chi_square / (n as f64 * (min_dimension as f64 - 1.0))).sqrt()
}

/// φ coefficient for 2×2 tables, `√(χ² / N)`
pub fn phi(chi_square: f64, n: usize) -> f64 {
    (chi_square / n as f64).sqrt()
}

/// Pairs where both values are finite
fn complete_pairs(
    x: &[f64],
    y: &[f64],
    test: &'static str,
) -> InferenceResult<(Vec<f64>, Vec<f64>)> {
    validation::require_same_len(x.len(), y.len())?;
    let (x, y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, b)| a.is_finite() && b.is_finite())
        .map(|(&a, &b)| (a, b))
        .unzip();
    validation::require_len(test, x.len(), 2)?;
    Ok((x, y))
}

fn pearson_of(x: &[f64], y: &[f64]) -> f64 {
    let (mx, my) = (mean(x), mean(y));
    let (sxy, sxx, syy) = x.iter().zip(y).fold((0.0, 0.0, 0.0), |(sxy, sxx, syy), (a, b)| {
        let (dx, dy) = (a - mx, b - my);
        (sxy + dx * dy, sxx + dx * dx, syy + dy * dy)
    });
    sxy / (sxx * syy).sqrt()
}

/// Pearson correlation over complete pairs
pub fn pearson_r(x: &[f64], y: &[f64]) -> InferenceResult<f64> {
    let (x, y) = complete_pairs(x, y, "Pearson correlation")?;
    Ok(pearson_of(&x, &y))
}

/// Spearman's ρ over complete pairs, `1 − 6Σd²/(n(n² − 1))` on mid-ranks.
///
/// Exact without ties; with ties it approximates the Pearson correlation of
/// the rank vectors.
pub fn spearman_rho(x: &[f64], y: &[f64]) -> InferenceResult<f64> {
    let (x, y) = complete_pairs(x, y, "Spearman correlation")?;
    let (rx, ry) = (ranks(&x), ranks(&y));
    let d2: f64 = rx.iter().zip(&ry).map(|(a, b)| (a - b).powi(2)).sum();
    let n = x.len() as f64;
    Ok(1.0 - 6.0 * d2 / (n * (n * n - 1.0)))
}

/// Which estimator produced an [`EffectSize`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EffectSizeKind {
    CohensD,
    HedgesG,
    RankBiserial,
    EtaSquared,
    OmegaSquared,
    EpsilonSquared,
    /// Cramér's V with `df = min(rows, cols) − 1`
    CramersV { df: usize },
    Phi,
    PearsonR,
    SpearmanRho,
}

impl EffectSizeKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::CohensD => "Cohen's d",
            Self::HedgesG => "Hedges' g",
            Self::RankBiserial => "Rank-biserial r",
            Self::EtaSquared => "η²",
            Self::OmegaSquared => "ω²",
            Self::EpsilonSquared => "ε²",
            Self::CramersV { .. } => "Cramér's V",
            Self::Phi => "φ",
            Self::PearsonR => "Pearson r",
            Self::SpearmanRho => "Spearman ρ",
        }
    }
}

/// Band attached to an effect size, serialized as `{"magnitude": "small"}`
/// or `{"correlation": "weak"}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Interpretation {
    Magnitude(Magnitude),
    Correlation(CorrelationStrength),
}

impl Interpretation {
    /// Localisation key
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Magnitude(m) => m.tag(),
            Self::Correlation(c) => c.tag(),
        }
    }
}

/// An effect size value with its band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectSize {
    pub kind: EffectSizeKind,
    pub value: f64,
    pub interpretation: Interpretation,
}

impl EffectSize {
    /// Interpret `value` with the bands for `kind`
    pub fn new(kind: EffectSizeKind, value: f64) -> Self {
        let interpretation = match kind {
            EffectSizeKind::CohensD | EffectSizeKind::HedgesG => {
                Interpretation::Magnitude(interpret_cohens_d(value))
            }
            EffectSizeKind::RankBiserial => {
                Interpretation::Magnitude(interpret_rank_biserial(value))
            }
            EffectSizeKind::EtaSquared | EffectSizeKind::OmegaSquared => {
                Interpretation::Magnitude(interpret_eta_squared(value))
            }
            EffectSizeKind::EpsilonSquared => {
                Interpretation::Magnitude(interpret_epsilon_squared(value))
            }
            EffectSizeKind::CramersV { df } => {
                Interpretation::Magnitude(interpret_cramers_v(value, df))
            }
            EffectSizeKind::Phi => Interpretation::Magnitude(interpret_phi(value)),
            EffectSizeKind::PearsonR | EffectSizeKind::SpearmanRho => {
                Interpretation::Correlation(interpret_correlation(value))
            }
        };
        Self {
            kind,
            value,
            interpretation,
        }
    }
}
