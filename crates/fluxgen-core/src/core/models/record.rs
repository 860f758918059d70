use super::ids::{ParticleCode, TargetId};
use super::probe::ProbeSample;
use nalgebra::{Point3, Vector3};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ParticleStatus {
    /// Incoming probe or target.
    Initial,
    /// Stable particle leaving the interaction.
    #[default]
    FinalState,
    /// Decayed or otherwise internal entry kept for bookkeeping.
    Intermediate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub code: ParticleCode,
    pub status: ParticleStatus,
    pub energy: f64,
    pub momentum: Vector3<f64>,
}

impl Particle {
    pub fn new(
        code: ParticleCode,
        status: ParticleStatus,
        energy: f64,
        momentum: Vector3<f64>,
    ) -> Self {
        Self {
            code,
            status,
            energy,
            momentum,
        }
    }

    /// Invariant mass from `E^2 - |p|^2`, clamped at zero.
    pub fn mass(&self) -> f64 {
        (self.energy * self.energy - self.momentum.norm_squared())
            .max(0.0)
            .sqrt()
    }
}

/// Generated final state for one accepted probe.
///
/// The scheduler hands ownership of each record to its caller and keeps no reference.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionRecord {
    pub probe: ProbeSample,
    pub target: TargetId,
    /// Name of the physics channel that produced the record.
    pub channel: String,
    pub vertex: Point3<f64>,
    pub particles: Vec<Particle>,
    pub weight: f64,
}

impl InteractionRecord {
    pub fn new(probe: ProbeSample, target: TargetId, channel: impl Into<String>) -> Self {
        let vertex = probe.position;
        let weight = probe.weight;
        Self {
            probe,
            target,
            channel: channel.into(),
            vertex,
            particles: Vec::new(),
            weight,
        }
    }

    pub fn push(&mut self, particle: Particle) {
        self.particles.push(particle);
    }

    pub fn final_state(&self) -> impl Iterator<Item = &Particle> {
        self.particles
            .iter()
            .filter(|p| p.status == ParticleStatus::FinalState)
    }

    /// Sum of final-state energies.
    pub fn visible_energy(&self) -> f64 {
        self.final_state().map(|p| p.energy).sum()
    }
}
