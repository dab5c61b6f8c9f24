//! Chunked Monte Carlo resampling.
//!
//! Iterations are split into fixed-size chunks. Chunk `c` draws from its own
//! `StdRng` seeded with `mix(seed, c)`, and chunk counts are summed, so for a
//! given seed the outcome does not depend on how many threads run the chunks.
//!
//! # Parallel Processing
//!
//! When the `parallel` feature is enabled, chunks run on the rayon pool.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::MonteCarloOptions;
use crate::error::{validation, InferenceResult};

/// Iterations per independently seeded chunk
pub const CHUNK_SIZE: usize = 1_000;

/// Result of a resampling run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonteCarloOutcome {
    /// Draws at least as extreme as the observed statistic
    pub extreme: usize,
    /// Draws actually completed
    pub iterations: usize,
    /// The time budget stopped the run early
    pub truncated: bool,
}

impl MonteCarloOutcome {
    /// Empirical p-value, `extreme / iterations`
    pub fn p_value(&self) -> f64 {
        if self.iterations == 0 {
            return f64::NAN;
        }
        self.extreme as f64 / self.iterations as f64
    }

    /// p-value counting the observed statistic as one of the draws
    pub fn p_value_with_observed(&self) -> f64 {
        (self.extreme + 1) as f64 / (self.iterations + 1) as f64
    }
}

/// SplitMix64 finaliser over the base seed and chunk index
fn mix(seed: u64, chunk: u64) -> u64 {
    let mut z = seed ^ chunk.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Run `options.iterations` draws and count the extreme ones.
///
/// `draw(rng, n)` performs `n` draws with `rng` and returns how many were
/// extreme. The first chunk always runs; later chunks are skipped once the
/// time budget is spent.
pub fn resample<F>(options: &MonteCarloOptions, draw: F) -> InferenceResult<MonteCarloOutcome>
where
    F: Fn(&mut StdRng, usize) -> usize + Sync,
{
    let options = *options;
    validation::require_len("Monte Carlo resampling", options.iterations, 1)?;

    let seed = options.seed.unwrap_or_else(rand::random);
    let deadline = options
        .time_budget
        .and_then(|budget| Instant::now().checked_add(budget));
    let n_chunks = options.iterations.div_ceil(CHUNK_SIZE);

    let run_chunk = |chunk: usize| -> Option<(usize, usize)> {
        if chunk > 0 && deadline.is_some_and(|d| Instant::now() >= d) {
            return None;
        }
        let len = CHUNK_SIZE.min(options.iterations - chunk * CHUNK_SIZE);
        let mut rng = StdRng::seed_from_u64(mix(seed, chunk as u64));
        Some((draw(&mut rng, len), len))
    };

    #[cfg(feature = "parallel")]
    let chunks: Vec<Option<(usize, usize)>> =
        (0..n_chunks).into_par_iter().map(run_chunk).collect();

    #[cfg(not(feature = "parallel"))]
    let chunks: Vec<Option<(usize, usize)>> = (0..n_chunks).map(run_chunk).collect();

    let (extreme, iterations) = chunks
        .iter()
        .flatten()
        .fold((0, 0), |(e, n), &(ce, cn)| (e + ce, n + cn));
    let truncated = iterations < options.iterations;
    if truncated {
        tracing::debug!(
            completed = iterations,
            requested = options.iterations,
            "monte carlo: time budget exhausted"
        );
    }

    Ok(MonteCarloOutcome {
        extreme,
        iterations,
        truncated,
    })
}

/// Permutation test over group labels.
///
/// Each draw shuffles `labels` (Fisher-Yates) while the pooled values stay
/// fixed; `is_extreme` sees the permuted labels.
pub fn permutation_test<F>(
    labels: &[usize],
    options: &MonteCarloOptions,
    is_extreme: F,
) -> InferenceResult<MonteCarloOutcome>
where
    F: Fn(&[usize]) -> bool + Sync,
{
    resample(options, |rng, n| {
        let mut shuffled = labels.to_vec();
        let mut extreme = 0;
        for _ in 0..n {
            shuffled.shuffle(rng);
            if is_extreme(&shuffled) {
                extreme += 1;
            }
        }
        extreme
    })
}
