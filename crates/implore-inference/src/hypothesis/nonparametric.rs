//! Rank-based tests: Mann-Whitney U and Kruskal-Wallis H.
//!
//! Both rank the pooled sample with mid-ranks. The Monte Carlo path keeps
//! the pooled values (and therefore their ranks) fixed and shuffles the group
//! labels; the asymptotic p-value is reported alongside.

use crate::config::MonteCarloOptions;
use crate::descriptive::ranks;
use crate::distribution::{chi_square_cdf, two_sided_normal_p};
use crate::error::{validation, InferenceResult};
use crate::monte_carlo::permutation_test;

use super::{clean_groups, group_label, TestMethod, TestResult};

/// Absolute slack when comparing a permuted statistic to the observed one
fn tolerance(observed: f64) -> f64 {
    1e-9 * observed.abs().max(1.0)
}

/// `min(U1, U2)` for the observations labelled 0
fn u_statistic(ranks: &[f64], labels: &[usize], n1: usize, n2: usize) -> f64 {
    let rank_sum: f64 = ranks
        .iter()
        .zip(labels)
        .filter(|(_, label)| **label == 0)
        .map(|(r, _)| r)
        .sum();
    let u1 = rank_sum - (n1 * (n1 + 1)) as f64 / 2.0;
    let u2 = (n1 * n2) as f64 - u1;
    u1.min(u2)
}

/// H from the per-label rank sums, clamped at 0
fn h_statistic(ranks: &[f64], labels: &[usize], sizes: &[usize]) -> f64 {
    let mut rank_sums = vec![0.0; sizes.len()];
    for (r, &label) in ranks.iter().zip(labels) {
        rank_sums[label] += r;
    }
    let n = sizes.iter().sum::<usize>() as f64;
    let sum: f64 = rank_sums
        .iter()
        .zip(sizes)
        .map(|(r, &size)| r * r / size as f64)
        .sum();
    (12.0 / (n * (n + 1.0)) * sum - 3.0 * (n + 1.0)).max(0.0)
}

/// Group label per pooled observation
fn pooled_labels(sizes: &[usize]) -> Vec<usize> {
    sizes
        .iter()
        .enumerate()
        .flat_map(|(label, &size)| std::iter::repeat(label).take(size))
        .collect()
}

/// Mann-Whitney U test for two independent samples.
///
/// Reports `U = min(U1, U2)` and the normal approximation
/// `Z = (U − n1·n2/2) / √(n1·n2·(n1+n2+1)/12)`. With Monte Carlo enabled the
/// p-value is the share of label permutations whose U is at most the
/// observed U.
pub fn mann_whitney(
    a: &[f64],
    b: &[f64],
    options: &MonteCarloOptions,
) -> InferenceResult<TestResult> {
    let options = *options;
    let groups = clean_groups(&[a, b], group_label)?;
    let (n1, n2) = (groups[0].len(), groups[1].len());
    let sizes = vec![n1, n2];

    let pooled: Vec<f64> = groups.concat();
    let ranks = ranks(&pooled);
    let labels = pooled_labels(&sizes);

    let u = u_statistic(&ranks, &labels, n1, n2);
    let (n1f, n2f) = (n1 as f64, n2 as f64);
    let mean_u = n1f * n2f / 2.0;
    let sd_u = (n1f * n2f * (n1f + n2f + 1.0) / 12.0).sqrt();
    let z = (u - mean_u) / sd_u;
    let asymptotic_p = two_sided_normal_p(z);

    let mut result = if options.enabled {
        tracing::debug!(n1, n2, iterations = options.iterations, "mann-whitney: monte carlo");
        let slack = tolerance(u);
        let outcome = permutation_test(&labels, &options, |perm| {
            u_statistic(&ranks, perm, n1, n2) <= u + slack
        })?;
        let mut r = TestResult::new(TestMethod::MannWhitney, u, outcome.p_value(), sizes);
        r.asymptotic_p_value = Some(asymptotic_p);
        r.monte_carlo = Some(outcome);
        r
    } else {
        tracing::debug!(n1, n2, "mann-whitney: asymptotic");
        TestResult::new(TestMethod::MannWhitney, u, asymptotic_p, sizes)
    };
    result.z = Some(z);
    Ok(result)
}

/// Kruskal-Wallis H test for k ≥ 2 independent samples.
///
/// `H = 12/(N(N+1))·Σ(R_i²/n_i) − 3(N+1)` with no tie correction, and
/// `p = 1 − χ²(H; k−1)`. With Monte Carlo enabled the p-value is the share of
/// label permutations whose H is at least the observed H.
pub fn kruskal_wallis<S: AsRef<[f64]>>(
    groups: &[S],
    options: &MonteCarloOptions,
) -> InferenceResult<TestResult> {
    let options = *options;
    validation::require_groups(groups.len(), 2)?;
    let groups = clean_groups(groups, group_label)?;
    let sizes: Vec<usize> = groups.iter().map(Vec::len).collect();
    let df = (groups.len() - 1) as f64;

    let pooled: Vec<f64> = groups.concat();
    let ranks = ranks(&pooled);
    let labels = pooled_labels(&sizes);

    let h = h_statistic(&ranks, &labels, &sizes);
    let asymptotic_p =
        validation::require_finite("Kruskal-Wallis p-value", 1.0 - chi_square_cdf(h, df))?;

    let result = if options.enabled {
        tracing::debug!(
            k = sizes.len(),
            iterations = options.iterations,
            "kruskal-wallis: monte carlo"
        );
        let slack = tolerance(h);
        let outcome = permutation_test(&labels, &options, |perm| {
            h_statistic(&ranks, perm, &sizes) >= h - slack
        })?;
        let mut r = TestResult::new(
            TestMethod::KruskalWallis,
            h,
            outcome.p_value(),
            sizes.clone(),
        );
        r.asymptotic_p_value = Some(asymptotic_p);
        r.monte_carlo = Some(outcome);
        r
    } else {
        tracing::debug!(k = sizes.len(), "kruskal-wallis: asymptotic");
        TestResult::new(TestMethod::KruskalWallis, h, asymptotic_p, sizes.clone())
    };
    Ok(result.with_df(df))
}
