use super::config::ConfigError;
use super::utils::sampling::SamplingError;
use crate::core::models::ids::TargetId;
use crate::core::traits::BoxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Job driver used before configure() completed")]
    NotConfigured,

    #[error("No physics driver can be built for target {target}: job configuration is incomplete")]
    DriverUnavailable { target: TargetId },

    #[error("Flux source failed: {source}")]
    Flux {
        #[source]
        source: BoxError,
    },

    #[error("Geometry analyzer failed: {source}")]
    Geometry {
        #[source]
        source: BoxError,
    },

    #[error("Physics driver for target {target} failed: {source}")]
    Driver {
        target: TargetId,
        #[source]
        source: BoxError,
    },

    #[error("Driver for target {target} returned invalid likelihood {value}")]
    InvalidLikelihood { target: TargetId, value: f64 },

    #[error("Geometry returned invalid path length {value} for target {target}")]
    InvalidPathLength { target: TargetId, value: f64 },

    #[error("Total interaction probability {value} is not finite")]
    InvalidProbability { value: f64 },

    #[error("Flux returned a probe with invalid weight {0}")]
    InvalidWeight(f64),

    #[error("Segment selection failed: {0}")]
    Sampling(#[from] SamplingError),
}
