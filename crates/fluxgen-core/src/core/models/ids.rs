use serde::Deserialize;
use std::fmt;

/// PDG-style particle identity, used for probe species and final-state particles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct ParticleCode(pub i32);

impl ParticleCode {
    pub const ELECTRON: Self = Self(11);
    pub const NU_E: Self = Self(12);
    pub const MUON: Self = Self(13);
    pub const NU_MU: Self = Self(14);
    pub const PROTON: Self = Self(2212);
    pub const NEUTRON: Self = Self(2112);
    pub const PI_PLUS: Self = Self(211);
    pub const PI_ZERO: Self = Self(111);

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_neutrino(self) -> bool {
        matches!(self.0.abs(), 12 | 14 | 16)
    }

    /// Charged lepton partner of a neutrino (`14 -> 13`, `-12 -> -11`).
    pub fn charged_partner(self) -> Option<Self> {
        if self.is_neutrino() {
            Some(Self(self.0 - self.0.signum()))
        } else {
            None
        }
    }

    pub fn name(self) -> Option<&'static str> {
        super::particles::PARTICLE_NAMES.get(&self.0).copied()
    }
}

impl fmt::Display for ParticleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "pdg:{}", self.0),
        }
    }
}

/// Nuclear target identity in the `10LZZZAAAI` code convention.
///
/// This is the key of the driver pool: one physics driver per distinct target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(transparent)]
pub struct TargetId(pub i32);

impl TargetId {
    const NUCLEUS_BASE: i32 = 1_000_000_000;

    /// Builds the ion code for a nucleus with `z` protons and `a` nucleons.
    pub fn nucleus(z: u32, a: u32) -> Self {
        Self(Self::NUCLEUS_BASE + (z as i32) * 10_000 + (a as i32) * 10)
    }

    pub fn code(self) -> i32 {
        self.0
    }

    pub fn is_nucleus(self) -> bool {
        self.0 >= Self::NUCLEUS_BASE
    }

    pub fn z(self) -> Option<u32> {
        self.is_nucleus()
            .then(|| ((self.0 / 10_000) % 1_000) as u32)
    }

    pub fn a(self) -> Option<u32> {
        self.is_nucleus().then(|| ((self.0 / 10) % 1_000) as u32)
    }
}

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
