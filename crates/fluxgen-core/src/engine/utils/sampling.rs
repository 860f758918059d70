use rand::{distributions::WeightedIndex, prelude::*};
use thiserror::Error;
use tracing::instrument;

#[derive(Debug, Error)]
pub enum SamplingError {
    #[error("Input weights list is empty, cannot perform sampling")]
    EmptyWeights,
    #[error("All weights are zero, resulting in zero total weight for sampling")]
    ZeroTotalWeight,
    #[error("Invalid weight value: {0}. Weights must be finite and non-negative")]
    InvalidWeight(f64),
    #[error("Weights sum to a non-finite total ({0})")]
    NonFiniteTotal(f64),
    #[error("Failed to create weighted distribution: {source}")]
    DistributionError {
        #[from]
        source: rand::distributions::WeightedError,
    },
}

/// Picks an index with probability proportional to `weights[i]`.
///
/// A slice whose weights are all zero is an error whatever its length.
#[instrument(level = "trace", skip_all, fields(n = weights.len()))]
pub fn weighted_choice<R: Rng + ?Sized>(
    weights: &[f64],
    rng: &mut R,
) -> Result<usize, SamplingError> {
    if weights.is_empty() {
        return Err(SamplingError::EmptyWeights);
    }
    if let Some(&bad) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
        return Err(SamplingError::InvalidWeight(bad));
    }

    let total_weight: f64 = weights.iter().sum();
    if !total_weight.is_finite() {
        return Err(SamplingError::NonFiniteTotal(total_weight));
    }
    if total_weight <= 0.0 {
        return Err(SamplingError::ZeroTotalWeight);
    }
    if weights.len() == 1 {
        return Ok(0);
    }

    let dist = WeightedIndex::new(weights)?;
    Ok(dist.sample(rng))
}
