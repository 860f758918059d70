use crate::core::models::ids::TargetId;
use crate::core::models::path::PathLengthList;
use crate::core::models::probe::ProbeSample;
use crate::core::models::record::InteractionRecord;
use crate::core::physics::spline::EnergyIndexing;
use rand::RngCore;

/// Error type carried by collaborator failures.
///
/// The job driver never inspects these; it wraps them into its own error and aborts.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A lazy, possibly finite stream of candidate probes.
pub trait FluxSource {
    /// Draws the next probe.
    ///
    /// # Return
    ///
    /// Returns `Ok(None)` once the source is exhausted. Exhaustion is an
    /// expected end condition and must be stable: later calls keep returning `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Any error is treated as fatal by the job driver.
    fn next(&mut self) -> Result<Option<ProbeSample>, BoxError>;
}

/// Computes what a probe traverses inside the detector.
pub trait GeometryAnalyzer {
    /// Returns the ordered `(target, length)` pairs crossed by `probe`.
    ///
    /// Lengths must be expressed in units that make `likelihood * length`
    /// a probability-like quantity for the physics drivers in use.
    /// An empty list means the probe misses every volume.
    fn path_lengths(&self, probe: &ProbeSample) -> Result<PathLengthList, BoxError>;

    /// Every target identity that can appear in a path-length list.
    fn targets(&self) -> Vec<TargetId>;
}

/// Per-target physics engine.
pub trait PhysicsDriver {
    /// Unnormalized, non-negative interaction likelihood for `probe` on this
    /// driver's target, per unit path length.
    fn likelihood(&mut self, probe: &ProbeSample) -> Result<f64, BoxError>;

    /// Generates a complete interaction record for an accepted probe.
    ///
    /// The job driver lends its own random source so a job is reproducible from a single seed.
    fn generate(
        &mut self,
        probe: &ProbeSample,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionRecord, BoxError>;

    /// Tabulates the driver's likelihood into splines indexed by `indexing`.
    ///
    /// Drivers without an expensive likelihood keep the default no-op.
    fn create_splines(&mut self, _indexing: EnergyIndexing) -> Result<(), BoxError> {
        Ok(())
    }

    /// Drops tabulated splines and returns to direct likelihood evaluation.
    fn clear_splines(&mut self) {}
}

/// Builds physics drivers for the driver pool.
pub trait DriverFactory {
    /// Constructs the driver for `target`.
    ///
    /// # Return
    ///
    /// `Ok(None)` means no physics is configured for `target`.
    fn build(&self, target: TargetId) -> Result<Option<Box<dyn PhysicsDriver>>, BoxError>;
}

impl<F> DriverFactory for F
where
    F: Fn(TargetId) -> Result<Option<Box<dyn PhysicsDriver>>, BoxError>,
{
    fn build(&self, target: TargetId) -> Result<Option<Box<dyn PhysicsDriver>>, BoxError> {
        self(target)
    }
}
