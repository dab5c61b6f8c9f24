//! Automatic test selection for grouped numeric data and contingency tables.
//!
//! Numeric outcome by group:
//! - every group normal: t-test (2 groups) or one-way ANOVA (3+)
//! - otherwise: Mann-Whitney (2 groups) or Kruskal-Wallis (3+)
//!
//! A group is only treated as normal when its normality test actually ran
//! and passed; groups too small to test force the rank-based path.

use serde::{Deserialize, Serialize};

use crate::config::InferenceOptions;
use crate::descriptive::Summary;
use crate::effect_size::{
    cohens_d, cramers_v, epsilon_squared, eta_squared, hedges_g, omega_squared, phi,
    rank_biserial, EffectSize, EffectSizeKind,
};
use crate::error::{validation, InferenceResult};
use crate::hypothesis::{
    chi_square_independence, fisher_exact_monte_carlo, kruskal_wallis, mann_whitney,
    one_way_anova, t_test, TestResult,
};
use crate::normality::{
    group_normality_status, normality_test, GroupNormalityStatus, NormalityReport,
};
use crate::pairwise::{pairwise_comparisons, GroupedSamples, PairwiseComparison};

/// Per-group description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupDescription {
    pub name: String,
    pub summary: Summary,
    pub normality: NormalityReport,
}

/// Result of [`compare_groups`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupComparison {
    pub groups: Vec<GroupDescription>,
    pub normality: GroupNormalityStatus,
    /// Whether the parametric path was taken
    pub parametric: bool,
    pub test: TestResult,
    pub effect_sizes: Vec<EffectSize>,
    /// Post-hoc comparisons for three or more groups
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post_hoc: Option<Vec<PairwiseComparison>>,
    /// `test.p_value < alpha`
    pub significant: bool,
}

/// Compare a numeric outcome across groups, choosing the test from the
/// groups' normality.
pub fn compare_groups(
    groups: &GroupedSamples,
    options: &InferenceOptions,
) -> InferenceResult<GroupComparison> {
    let options = *options;
    validation::require_groups(groups.len(), 2)?;
    let clean = groups.cleaned()?;

    let descriptions: Vec<GroupDescription> = groups
        .names()
        .iter()
        .zip(&clean)
        .map(|(name, values)| GroupDescription {
            name: name.clone(),
            summary: Summary::from_sample(values),
            normality: normality_test(values),
        })
        .collect();
    let status = group_normality_status(descriptions.iter().map(|d| &d.normality));
    let all_tested = descriptions.iter().all(|d| !d.normality.p_value.is_nan());
    let parametric = status.is_normal && all_tested;

    let n: usize = clean.iter().map(Vec::len).sum();
    let k = clean.len();
    tracing::debug!(k, n, parametric, "compare groups");

    let (test, effect_sizes) = match (k, parametric) {
        (2, true) => {
            let test = t_test(&clean[0], &clean[1])?;
            let effects = vec![
                EffectSize::new(EffectSizeKind::CohensD, cohens_d(&clean[0], &clean[1])),
                EffectSize::new(EffectSizeKind::HedgesG, hedges_g(&clean[0], &clean[1])),
            ];
            (test, effects)
        }
        (2, false) => {
            let test = mann_whitney(&clean[0], &clean[1], &options.monte_carlo)?;
            let r = rank_biserial(test.statistic, clean[0].len(), clean[1].len());
            (test, vec![EffectSize::new(EffectSizeKind::RankBiserial, r)])
        }
        (_, true) => {
            let test = one_way_anova(&clean)?;
            let effects = vec![
                EffectSize::new(EffectSizeKind::EtaSquared, eta_squared(&clean)),
                EffectSize::new(
                    EffectSizeKind::OmegaSquared,
                    omega_squared(test.statistic, k, n),
                ),
            ];
            (test, effects)
        }
        (_, false) => {
            let test = kruskal_wallis(&clean, &options.monte_carlo)?;
            let e2 = epsilon_squared(test.statistic, n);
            (test, vec![EffectSize::new(EffectSizeKind::EpsilonSquared, e2)])
        }
    };

    let post_hoc = if k >= 3 && options.post_hoc {
        let method = if parametric {
            options.parametric_method
        } else {
            options.nonparametric_method
        };
        Some(pairwise_comparisons(groups, method)?)
    } else {
        None
    };

    Ok(GroupComparison {
        groups: descriptions,
        normality: status,
        parametric,
        significant: test.is_significant(options.alpha),
        test,
        effect_sizes,
        post_hoc,
    })
}

/// Result of [`test_association`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Association {
    pub chi_square: TestResult,
    /// Fisher's exact test, when Monte Carlo is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fisher: Option<TestResult>,
    /// φ for 2×2 tables, Cramér's V otherwise
    pub effect_size: EffectSize,
    pub significant: bool,
}

/// Association between two categorical variables given their count table.
///
/// Significance follows Fisher's p-value when it was computed, the
/// chi-square p-value otherwise.
pub fn test_association(
    table: &[Vec<u64>],
    options: &InferenceOptions,
) -> InferenceResult<Association> {
    let options = *options;
    let chi_square = chi_square_independence(table)?;
    let n = chi_square.n();
    let (rows, cols) = (table.len(), table.first().map_or(0, Vec::len));

    let effect_size = if rows == 2 && cols == 2 {
        EffectSize::new(EffectSizeKind::Phi, phi(chi_square.statistic, n))
    } else {
        let min_dim = rows.min(cols);
        EffectSize::new(
            EffectSizeKind::CramersV { df: min_dim - 1 },
            cramers_v(chi_square.statistic, n, min_dim),
        )
    };

    let fisher = if options.monte_carlo.enabled {
        Some(fisher_exact_monte_carlo(table, &options.monte_carlo)?.0)
    } else {
        None
    };
    let p_value = fisher.as_ref().map_or(chi_square.p_value, |f| f.p_value);

    Ok(Association {
        significant: p_value < options.alpha,
        chi_square,
        fisher,
        effect_size,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MonteCarloOptions, PairwiseMethod};
    use crate::effect_size::{Interpretation, Magnitude};
    use crate::hypothesis::TestMethod;
    use crate::special::normal_quantile;

    /// Evenly spaced normal quantiles shifted to `centre`
    fn normal_group(n: usize, centre: f64) -> Vec<f64> {
        (1..=n)
            .map(|i| centre + normal_quantile((i as f64 - 0.5) / n as f64))
            .collect()
    }

    #[test]
    fn test_two_normal_groups_use_t_test() {
        let groups: GroupedSamples = [
            ("a", normal_group(20, 0.0)),
            ("b", normal_group(20, 1.0)),
        ]
        .into_iter()
        .collect();
        let cmp = compare_groups(&groups, &InferenceOptions::default()).unwrap();
        assert!(cmp.parametric);
        assert_eq!(cmp.test.method, TestMethod::StudentT);
        assert_eq!(cmp.effect_sizes[0].kind, EffectSizeKind::CohensD);
        assert!(cmp.post_hoc.is_none());
        assert!(cmp.significant);
        assert_eq!(cmp.groups[1].name, "b");
    }

    #[test]
    fn test_skewed_groups_use_mann_whitney() {
        let skewed: Vec<f64> = (0..20).map(|i| (i as f64 / 3.0).exp()).collect();
        let groups: GroupedSamples =
            [("x", skewed.clone()), ("y", skewed)].into_iter().collect();
        let cmp = compare_groups(&groups, &InferenceOptions::default()).unwrap();
        assert!(!cmp.parametric);
        assert_eq!(cmp.test.method, TestMethod::MannWhitney);
        assert_eq!(cmp.effect_sizes[0].kind, EffectSizeKind::RankBiserial);
        assert!(!cmp.significant);
    }

    #[test]
    fn test_small_groups_use_rank_tests() {
        let groups: GroupedSamples = [("a", vec![1.0, 2.0]), ("b", vec![3.0, 4.0])]
            .into_iter()
            .collect();
        let cmp = compare_groups(&groups, &InferenceOptions::default()).unwrap();
        assert!(!cmp.parametric);
        assert_eq!(cmp.test.method, TestMethod::MannWhitney);
    }

    #[test]
    fn test_three_groups_with_post_hoc() {
        let groups: GroupedSamples = [
            ("a", normal_group(15, 0.0)),
            ("b", normal_group(15, 0.5)),
            ("c", normal_group(15, 3.0)),
        ]
        .into_iter()
        .collect();
        let options = InferenceOptions {
            parametric_method: PairwiseMethod::Scheffe,
            ..InferenceOptions::default()
        };
        let cmp = compare_groups(&groups, &options).unwrap();
        assert_eq!(cmp.test.method, TestMethod::OneWayAnova);
        assert_eq!(cmp.effect_sizes.len(), 2);
        assert_eq!(
            cmp.effect_sizes[0].interpretation,
            Interpretation::Magnitude(Magnitude::Large)
        );
        let post_hoc = cmp.post_hoc.unwrap();
        assert_eq!(post_hoc.len(), 3);
        assert!(post_hoc.iter().all(|c| c.method == PairwiseMethod::Scheffe));
    }

    #[test]
    fn test_three_groups_monte_carlo_kruskal_wallis() {
        let skewed = |shift: f64| -> Vec<f64> {
            (0..12).map(|i| shift + (i as f64 / 2.0).exp()).collect()
        };
        let groups: GroupedSamples = [
            ("a", skewed(0.0)),
            ("b", skewed(1.0)),
            ("c", skewed(2.0)),
        ]
        .into_iter()
        .collect();
        let options = InferenceOptions {
            monte_carlo: MonteCarloOptions::enabled().with_iterations(1_000).with_seed(9),
            post_hoc: false,
            ..InferenceOptions::default()
        };
        let cmp = compare_groups(&groups, &options).unwrap();
        assert_eq!(cmp.test.method, TestMethod::KruskalWallis);
        assert!(cmp.test.monte_carlo.is_some());
        assert!(cmp.post_hoc.is_none());
        assert_eq!(cmp.effect_sizes[0].kind, EffectSizeKind::EpsilonSquared);
    }

    #[test]
    fn test_association_effect_kind() {
        let r =
            test_association(&[vec![10, 20], vec![20, 10]], &InferenceOptions::default()).unwrap();
        assert_eq!(r.effect_size.kind, EffectSizeKind::Phi);
        assert!(r.fisher.is_none());
        assert!(r.significant);

        let table = vec![vec![10, 10, 10], vec![10, 10, 10], vec![10, 10, 11]];
        let r = test_association(&table, &InferenceOptions::default()).unwrap();
        assert_eq!(r.effect_size.kind, EffectSizeKind::CramersV { df: 2 });
        assert!(!r.significant);
    }

    #[test]
    fn test_association_with_fisher() {
        let options = InferenceOptions {
            monte_carlo: MonteCarloOptions::enabled().with_iterations(2_000).with_seed(1),
            ..InferenceOptions::default()
        };
        let r = test_association(&[vec![3, 0], vec![0, 3]], &options).unwrap();
        let fisher = r.fisher.unwrap();
        assert_eq!(fisher.method, TestMethod::FisherExact);
        assert!(!r.significant);
    }
}
