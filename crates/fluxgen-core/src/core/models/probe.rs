use super::ids::ParticleCode;
use nalgebra::{Point3, Vector3};

/// One candidate incident particle drawn from a flux source.
///
/// Samples are immutable once produced and live for a single scheduler
/// iteration. The direction is stored as a unit vector.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeSample {
    /// Species of the incident particle.
    pub species: ParticleCode,
    /// Total energy in GeV.
    pub energy: f64,
    /// Unit direction of flight.
    pub direction: Vector3<f64>,
    /// Point where the probe enters the detector frame.
    pub position: Point3<f64>,
    /// Generation weight assigned by the flux source.
    pub weight: f64,
}

impl ProbeSample {
    /// Creates a unit-weight probe. A zero direction vector is kept as-is.
    pub fn new(
        species: ParticleCode,
        energy: f64,
        direction: Vector3<f64>,
        position: Point3<f64>,
    ) -> Self {
        let direction = direction.try_normalize(f64::EPSILON).unwrap_or(direction);
        Self {
            species,
            energy,
            direction,
            position,
            weight: 1.0,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Three-momentum assuming a massless probe.
    pub fn momentum(&self) -> Vector3<f64> {
        self.direction * self.energy
    }
}
