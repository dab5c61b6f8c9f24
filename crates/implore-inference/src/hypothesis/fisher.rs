//! Fisher's exact test for r×c tables, estimated by Monte Carlo.
//!
//! Random tables with the observed margins are drawn by shuffling the column
//! labels of the N observations against fixed row labels, which samples the
//! multivariate hypergeometric null exactly. A table is as extreme as the
//! observed one when its probability is no larger.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::config::MonteCarloOptions;
use crate::error::{validation, InferenceResult};
use crate::monte_carlo::resample;
use crate::special::ln_factorial;

use super::parametric::margins;
use super::{TestMethod, TestResult};

/// Relative slack in log-probability when comparing tables
const LN_TOLERANCE: f64 = 1e-7;

/// Margins and observed probability reported with the test
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FisherTable {
    pub row_sums: Vec<u64>,
    pub col_sums: Vec<u64>,
    /// Hypergeometric probability of the observed table
    pub observed_probability: f64,
}

/// `ln` of the probability of `cells` under fixed margins:
/// `Π R_i! Π C_j! / (N! Π n_ij!)`
fn ln_table_probability<'a>(
    margin_term: f64,
    cells: impl IntoIterator<Item = &'a u64>,
) -> f64 {
    margin_term - cells.into_iter().map(|&c| ln_factorial(c)).sum::<f64>()
}

/// Fisher's exact test by Monte Carlo.
///
/// `p = (extreme + 1) / (iterations + 1)`, counting the observed table once.
/// Resampling always runs here; `options.enabled` is not consulted.
pub fn fisher_exact_monte_carlo(
    table: &[Vec<u64>],
    options: &MonteCarloOptions,
) -> InferenceResult<(TestResult, FisherTable)> {
    validation::validate_table(table)?;
    let (row_sums, col_sums) = margins(table);
    let total: u64 = row_sums.iter().sum();
    let (rows, cols) = (row_sums.len(), col_sums.len());

    let margin_term = row_sums.iter().map(|&r| ln_factorial(r)).sum::<f64>()
        + col_sums.iter().map(|&c| ln_factorial(c)).sum::<f64>()
        - ln_factorial(total);
    let observed_ln_p = ln_table_probability(margin_term, table.iter().flatten());
    let threshold = observed_ln_p + LN_TOLERANCE * observed_ln_p.abs().max(1.0);

    let row_labels: Vec<usize> = row_sums
        .iter()
        .enumerate()
        .flat_map(|(i, &r)| std::iter::repeat(i).take(r as usize))
        .collect();
    let col_labels: Vec<usize> = col_sums
        .iter()
        .enumerate()
        .flat_map(|(j, &c)| std::iter::repeat(j).take(c as usize))
        .collect();

    tracing::debug!(
        rows,
        cols,
        total,
        iterations = options.iterations,
        "fisher exact: monte carlo"
    );
    let outcome = resample(options, |rng, n| {
        let mut shuffled = col_labels.clone();
        let mut cells = vec![0u64; rows * cols];
        let mut extreme = 0;
        for _ in 0..n {
            shuffled.shuffle(rng);
            cells.iter_mut().for_each(|c| *c = 0);
            for (&i, &j) in row_labels.iter().zip(&shuffled) {
                cells[i * cols + j] += 1;
            }
            if ln_table_probability(margin_term, &cells) <= threshold {
                extreme += 1;
            }
        }
        extreme
    })?;

    let observed_probability = observed_ln_p.exp();
    let mut result = TestResult::new(
        TestMethod::FisherExact,
        observed_probability,
        outcome.p_value_with_observed(),
        row_sums.iter().map(|&s| s as usize).collect(),
    );
    result.monte_carlo = Some(outcome);

    Ok((
        result,
        FisherTable {
            row_sums,
            col_sums,
            observed_probability,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InferenceError;

    fn seeded(iterations: usize) -> MonteCarloOptions {
        MonteCarloOptions::enabled()
            .with_iterations(iterations)
            .with_seed(2024)
    }

    #[test]
    fn test_observed_probability_2x2() {
        // Margins 3/3 by 3/3: P([[3,0],[0,3]]) = 1 / C(6,3) = 0.05
        let (_, table) =
            fisher_exact_monte_carlo(&[vec![3, 0], vec![0, 3]], &seeded(100)).unwrap();
        assert!((table.observed_probability - 0.05).abs() < 1e-9);
        assert_eq!(table.row_sums, vec![3, 3]);
        assert_eq!(table.col_sums, vec![3, 3]);
    }

    #[test]
    fn test_extreme_table_p_value() {
        // Exact two-sided p for [[3,0],[0,3]] is 0.1
        let (r, _) =
            fisher_exact_monte_carlo(&[vec![3, 0], vec![0, 3]], &seeded(10_000)).unwrap();
        assert!((r.p_value - 0.1).abs() < 0.015, "p = {}", r.p_value);
        assert_eq!(r.method_name(), "Fisher's Exact Test (Monte Carlo)");
    }

    #[test]
    fn test_balanced_table_not_significant() {
        let (r, _) =
            fisher_exact_monte_carlo(&[vec![5, 5], vec![5, 5]], &seeded(2_000)).unwrap();
        assert!(r.p_value > 0.9);
    }

    #[test]
    fn test_rxc_association() {
        let table = vec![vec![12, 1, 1], vec![1, 12, 1], vec![1, 1, 12]];
        let (r, _) = fisher_exact_monte_carlo(&table, &seeded(2_000)).unwrap();
        assert!(r.p_value < 0.01);
        assert_eq!(r.n(), 42);
    }

    #[test]
    fn test_invalid_table() {
        assert!(matches!(
            fisher_exact_monte_carlo(&[vec![1, 2], vec![3]], &seeded(10)),
            Err(InferenceError::InvalidTable { .. })
        ));
    }
}
