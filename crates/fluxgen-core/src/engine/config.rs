use crate::core::physics::spline::EnergyIndexing;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

/// Settings for one generation job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobConfig {
    /// Seed of the job driver's random source.
    pub seed: u64,
    /// Starting value of the adaptive bound.
    pub initial_pmax: f64,
    /// Factor applied to `P` when a probe breaches the bound; always `>= 1`.
    pub pmax_headroom: f64,
    /// Spline-based likelihood evaluation, `None` when disabled.
    pub splines: Option<EnergyIndexing>,
}

impl JobConfig {
    /// Default settings: bound starting at zero, no headroom, splines disabled.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            initial_pmax: 0.0,
            pmax_headroom: 1.0,
            splines: None,
        }
    }
}

#[derive(Default)]
pub struct JobConfigBuilder {
    seed: Option<u64>,
    initial_pmax: Option<f64>,
    pmax_headroom: Option<f64>,
    splines: Option<EnergyIndexing>,
}

impl JobConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    pub fn initial_pmax(mut self, pmax: f64) -> Self {
        self.initial_pmax = Some(pmax);
        self
    }
    pub fn pmax_headroom(mut self, headroom: f64) -> Self {
        self.pmax_headroom = Some(headroom);
        self
    }
    pub fn splines(mut self, indexing: Option<EnergyIndexing>) -> Self {
        self.splines = indexing;
        self
    }

    pub fn build(self) -> Result<JobConfig, ConfigError> {
        let seed = self.seed.ok_or(ConfigError::MissingParameter("seed"))?;

        let initial_pmax = self.initial_pmax.unwrap_or(0.0);
        if !initial_pmax.is_finite() || initial_pmax < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "initial_pmax",
                reason: format!("must be finite and non-negative, got {}", initial_pmax),
            });
        }

        let pmax_headroom = self.pmax_headroom.unwrap_or(1.0);
        if !pmax_headroom.is_finite() || pmax_headroom < 1.0 {
            return Err(ConfigError::InvalidParameter {
                name: "pmax_headroom",
                reason: format!("must be finite and at least 1.0, got {}", pmax_headroom),
            });
        }

        Ok(JobConfig {
            seed,
            initial_pmax,
            pmax_headroom,
            splines: self.splines,
        })
    }
}
