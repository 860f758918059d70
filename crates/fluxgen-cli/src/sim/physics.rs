use fluxgen::core::models::ids::{ParticleCode, TargetId};
use fluxgen::core::models::probe::ProbeSample;
use fluxgen::core::models::record::{InteractionRecord, Particle, ParticleStatus};
use fluxgen::core::physics::spline::{EnergyIndexing, Spline};
use fluxgen::core::physics::tables::FractionTableSet;
use fluxgen::core::traits::{BoxError, DriverFactory, PhysicsDriver};
use fluxgen::engine::utils::sampling::weighted_choice;
use nalgebra::Vector3;
use rand::{Rng, RngCore};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error, PartialEq)]
pub enum PhysicsError {
    #[error("Target {0} has no interaction channels")]
    NoChannels(TargetId),
    #[error("Target {0} is configured more than once")]
    DuplicateTarget(TargetId),
    #[error("Channel '{channel}' on target {target}: {reason}")]
    InvalidChannel {
        target: TargetId,
        channel: String,
        reason: String,
    },
    #[error("Channel '{channel}' refers to unknown fraction table '{table}'")]
    MissingTable { channel: String, table: String },
    #[error("Invalid spline range [{emin}, {emax}] with {knots} knots")]
    SplineRange { emin: f64, emax: f64, knots: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelKind {
    ChargedCurrent,
    NeutralCurrent,
    /// Charged current with a charm hadron drawn from a fraction table.
    Charm,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ChannelSettings {
    pub name: String,
    pub kind: ChannelKind,
    /// Likelihood per GeV above threshold, per nucleon and unit length.
    pub slope: f64,
    #[serde(default)]
    pub threshold: f64,
    /// Fraction table name; required by `charm` channels.
    #[serde(default)]
    pub table: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct TargetPhysics {
    pub target: TargetId,
    pub channels: Vec<ChannelSettings>,
}

fn default_spline_emin() -> f64 {
    0.01
}
fn default_spline_emax() -> f64 {
    1000.0
}
fn default_spline_knots() -> usize {
    200
}

/// The `[physics]` section. Spline values are clamped outside `[spline-emin, spline-emax]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct PhysicsSettings {
    #[serde(default = "default_spline_emin")]
    pub spline_emin: f64,
    #[serde(default = "default_spline_emax")]
    pub spline_emax: f64,
    #[serde(default = "default_spline_knots")]
    pub spline_knots: usize,
    #[serde(default)]
    pub targets: Vec<TargetPhysics>,
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            spline_emin: default_spline_emin(),
            spline_emax: default_spline_emax(),
            spline_knots: default_spline_knots(),
            targets: Vec::new(),
        }
    }
}

const MUON_MASS: f64 = 0.105_658;
const ELECTRON_MASS: f64 = 0.000_511;
const PION_MASS: f64 = 0.139_570;
const PION_ZERO_MASS: f64 = 0.134_977;
const PROTON_MASS: f64 = 0.938_272;
const NEUTRON_MASS: f64 = 0.939_565;
const D_MASS: f64 = 1.869_66;
const DS_MASS: f64 = 1.968_35;
const LAMBDA_C_MASS: f64 = 2.286_46;

/// GeV of hadronic energy per extra pion.
const PION_MULTIPLICITY_SCALE: f64 = 1.0;
const MAX_PIONS: usize = 10;

fn rest_mass(code: ParticleCode) -> f64 {
    match code.code().abs() {
        11 => ELECTRON_MASS,
        13 => MUON_MASS,
        111 => PION_ZERO_MASS,
        211 => PION_MASS,
        2212 => PROTON_MASS,
        2112 => NEUTRON_MASS,
        411 | 421 => D_MASS,
        431 => DS_MASS,
        4122 => LAMBDA_C_MASS,
        _ => 0.0,
    }
}

fn final_particle(code: ParticleCode, energy: f64, direction: Vector3<f64>) -> Particle {
    let mass = rest_mass(code);
    let energy = energy.max(mass);
    let momentum = (energy * energy - mass * mass).max(0.0).sqrt();
    Particle::new(code, ParticleStatus::FinalState, energy, direction * momentum)
}

fn isotropic(rng: &mut dyn RngCore) -> Vector3<f64> {
    let cos_theta: f64 = rng.gen_range(-1.0..=1.0);
    let phi = rng.gen_range(0.0..std::f64::consts::TAU);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();
    Vector3::new(sin_theta * phi.cos(), sin_theta * phi.sin(), cos_theta)
}

#[derive(Debug, Clone)]
struct Channel {
    settings: ChannelSettings,
    spline: Option<Spline>,
}

impl Channel {
    fn direct(&self, energy: f64, nucleons: f64) -> f64 {
        self.settings.slope * (energy - self.settings.threshold).max(0.0) * nucleons
    }
}

/// Reference driver: per-channel likelihoods linear in energy above threshold,
/// scaled by the nucleon count of the target.
#[derive(Debug)]
pub struct TabulatedDriver {
    target: TargetId,
    nucleons: f64,
    channels: Vec<Channel>,
    tables: Arc<FractionTableSet>,
    spline_range: (f64, f64, usize),
}

impl TabulatedDriver {
    fn channel_values(&self, energy: f64) -> Vec<f64> {
        self.channels
            .iter()
            .map(|c| match &c.spline {
                Some(spline) => spline.evaluate(energy),
                None => c.direct(energy, self.nucleons),
            })
            .collect()
    }

    /// Splits the hadronic energy into a recoil nucleon and a few pions.
    fn push_hadrons(&self, record: &mut InteractionRecord, energy: f64, rng: &mut dyn RngCore) {
        let n_pions = ((energy / PION_MULTIPLICITY_SCALE) as usize).min(MAX_PIONS);
        let share = energy / (n_pions + 1) as f64;
        record.push(final_particle(
            ParticleCode::PROTON,
            PROTON_MASS + share,
            isotropic(rng),
        ));
        for i in 0..n_pions {
            let code = if i % 2 == 0 {
                ParticleCode::PI_PLUS
            } else {
                ParticleCode::PI_ZERO
            };
            record.push(final_particle(code, share, isotropic(rng)));
        }
    }
}

impl PhysicsDriver for TabulatedDriver {
    fn likelihood(&mut self, probe: &ProbeSample) -> Result<f64, BoxError> {
        Ok(self.channel_values(probe.energy).iter().sum())
    }

    fn generate(
        &mut self,
        probe: &ProbeSample,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionRecord, BoxError> {
        let values = self.channel_values(probe.energy);
        let index = weighted_choice(&values, rng)?;
        let channel = &self.channels[index].settings;

        let mut record = InteractionRecord::new(probe.clone(), self.target, channel.name.clone());
        record.push(Particle::new(
            probe.species,
            ParticleStatus::Initial,
            probe.energy,
            probe.momentum(),
        ));

        let y: f64 = rng.gen_range(0.0..1.0);
        let lepton_energy = probe.energy * (1.0 - y);
        let hadronic_energy = probe.energy * y;

        match channel.kind {
            ChannelKind::NeutralCurrent => {
                record.push(final_particle(probe.species, lepton_energy, probe.direction));
                self.push_hadrons(&mut record, hadronic_energy, rng);
            }
            ChannelKind::ChargedCurrent | ChannelKind::Charm => {
                let lepton = probe.species.charged_partner().ok_or_else(|| {
                    format!(
                        "channel '{}' needs a neutrino probe, got {}",
                        channel.name, probe.species
                    )
                })?;
                record.push(final_particle(lepton, lepton_energy, probe.direction));

                if channel.kind == ChannelKind::Charm {
                    let name = channel.table.as_deref().unwrap_or_default();
                    let table = self
                        .tables
                        .get(name)
                        .ok_or_else(|| format!("fraction table '{}' is not loaded", name))?;
                    let charm = table.sample(probe.energy, rng);
                    let z: f64 = rng.gen_range(0.5..1.0);
                    record.push(final_particle(charm, hadronic_energy * z, isotropic(rng)));
                    self.push_hadrons(&mut record, hadronic_energy * (1.0 - z), rng);
                } else {
                    self.push_hadrons(&mut record, hadronic_energy, rng);
                }
            }
        }
        Ok(record)
    }

    fn create_splines(&mut self, indexing: EnergyIndexing) -> Result<(), BoxError> {
        let (emin, emax, knots) = self.spline_range;
        let nucleons = self.nucleons;
        for channel in &mut self.channels {
            let settings = channel.clone();
            channel.spline = Some(Spline::tabulate(indexing, emin, emax, knots, |e| {
                settings.direct(e, nucleons)
            })?);
        }
        debug!(target = %self.target, ?indexing, "Tabulated channel splines");
        Ok(())
    }

    fn clear_splines(&mut self) {
        for channel in &mut self.channels {
            channel.spline = None;
        }
    }
}

/// Builds [`TabulatedDriver`]s for the targets listed in `[[physics.targets]]`.
#[derive(Debug, Clone)]
pub struct ReferenceFactory {
    targets: HashMap<TargetId, Vec<ChannelSettings>>,
    tables: Arc<FractionTableSet>,
    spline_range: (f64, f64, usize),
}

impl ReferenceFactory {
    pub fn new(
        settings: &PhysicsSettings,
        tables: Arc<FractionTableSet>,
    ) -> Result<Self, PhysicsError> {
        let (emin, emax, knots) = (
            settings.spline_emin,
            settings.spline_emax,
            settings.spline_knots,
        );
        if !(emin.is_finite() && emax.is_finite() && emin > 0.0 && emin < emax) || knots < 2 {
            return Err(PhysicsError::SplineRange { emin, emax, knots });
        }

        let mut targets = HashMap::new();
        for entry in &settings.targets {
            if entry.channels.is_empty() {
                return Err(PhysicsError::NoChannels(entry.target));
            }
            for channel in &entry.channels {
                validate_channel(entry.target, channel, &tables)?;
            }
            if targets
                .insert(entry.target, entry.channels.clone())
                .is_some()
            {
                return Err(PhysicsError::DuplicateTarget(entry.target));
            }
        }
        Ok(Self {
            targets,
            tables,
            spline_range: (emin, emax, knots),
        })
    }

    pub fn targets(&self) -> Vec<TargetId> {
        let mut targets: Vec<_> = self.targets.keys().copied().collect();
        targets.sort_unstable();
        targets
    }
}

fn validate_channel(
    target: TargetId,
    channel: &ChannelSettings,
    tables: &FractionTableSet,
) -> Result<(), PhysicsError> {
    let invalid = |reason: String| PhysicsError::InvalidChannel {
        target,
        channel: channel.name.clone(),
        reason,
    };
    if !(channel.slope.is_finite() && channel.slope >= 0.0) {
        return Err(invalid(format!("slope must be >= 0, got {}", channel.slope)));
    }
    if !(channel.threshold.is_finite() && channel.threshold >= 0.0) {
        return Err(invalid(format!(
            "threshold must be >= 0, got {}",
            channel.threshold
        )));
    }
    match (channel.kind, &channel.table) {
        (ChannelKind::Charm, None) => Err(invalid("charm channels need a table".to_string())),
        (ChannelKind::Charm, Some(table)) if tables.get(table).is_none() => {
            Err(PhysicsError::MissingTable {
                channel: channel.name.clone(),
                table: table.clone(),
            })
        }
        _ => Ok(()),
    }
}

impl DriverFactory for ReferenceFactory {
    fn build(&self, target: TargetId) -> Result<Option<Box<dyn PhysicsDriver>>, BoxError> {
        let Some(channels) = self.targets.get(&target) else {
            return Ok(None);
        };
        let driver = TabulatedDriver {
            target,
            nucleons: target.a().map_or(1.0, f64::from),
            channels: channels
                .iter()
                .map(|settings| Channel {
                    settings: settings.clone(),
                    spline: None,
                })
                .collect(),
            tables: Arc::clone(&self.tables),
            spline_range: self.spline_range,
        };
        Ok(Some(Box::new(driver)))
    }
}
