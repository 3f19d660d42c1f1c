//! Score-weighted, duplicate-free candidate sampling.

use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use evo_core::{Candidate, SelectionError};

/// Softmax weights over a score slice, stabilized by subtracting the
/// maximum score before exponentiating so large scores cannot overflow.
fn softmax_weights(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Draw `k` distinct candidates from `pool`, weighted by
/// `exp(score_i) / Σ exp(score_j)`.
///
/// Sampling is without replacement: each draw zeroes the picked candidate's
/// weight before the next one, so `k` draws always suffice even when one
/// score dominates the pool. Fails when `k` exceeds the pool size, since
/// uniqueness cannot be satisfied.
pub fn select<'a, R: Rng + ?Sized>(
    pool: &'a [Candidate],
    k: usize,
    rng: &mut R,
) -> Result<Vec<&'a Candidate>, SelectionError> {
    if k > pool.len() {
        return Err(SelectionError {
            requested: k,
            available: pool.len(),
        });
    }
    if k == 0 {
        return Ok(Vec::new());
    }

    let scores: Vec<f64> = pool.iter().map(|c| c.score).collect();
    let mut weights = softmax_weights(&scores);

    let mut selected = Vec::with_capacity(k);
    while selected.len() < k {
        // At most k - 1 weights are zeroed and k <= pool.len(), so at least
        // one positive weight remains and construction cannot fail.
        let dist = WeightedIndex::new(&weights).map_err(|_| SelectionError {
            requested: k,
            available: pool.len(),
        })?;
        let idx = dist.sample(rng);
        weights[idx] = 0.0;
        selected.push(&pool[idx]);
    }
    Ok(selected)
}
