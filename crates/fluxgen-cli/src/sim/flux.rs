use fluxgen::core::models::ids::ParticleCode;
use fluxgen::core::models::probe::ProbeSample;
use fluxgen::core::traits::{BoxError, FluxSource};
use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FluxError {
    #[error("Invalid flux spectrum: {0}")]
    Spectrum(String),
    #[error("Beam direction must be a non-zero vector")]
    ZeroDirection,
    #[error("Beam radius must be finite and non-negative, got {0}")]
    Radius(f64),
    #[error("Flux weight must be finite and non-negative, got {0}")]
    Weight(f64),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "type")]
pub enum Spectrum {
    Monoenergetic { energy: f64 },
    Uniform { emin: f64, emax: f64 },
    /// `dN/dE ∝ E^-index` on `[emin, emax]`.
    PowerLaw { emin: f64, emax: f64, index: f64 },
}

impl Spectrum {
    fn validate(&self) -> Result<(), FluxError> {
        match *self {
            Spectrum::Monoenergetic { energy } if !(energy.is_finite() && energy > 0.0) => Err(
                FluxError::Spectrum(format!("energy must be positive, got {}", energy)),
            ),
            Spectrum::Uniform { emin, emax } | Spectrum::PowerLaw { emin, emax, .. }
                if !(emin.is_finite() && emax.is_finite() && emin > 0.0 && emin < emax) =>
            {
                Err(FluxError::Spectrum(format!(
                    "need 0 < emin < emax, got [{}, {}]",
                    emin, emax
                )))
            }
            Spectrum::PowerLaw { index, .. } if !index.is_finite() => Err(FluxError::Spectrum(
                "power-law index must be finite".to_string(),
            )),
            _ => Ok(()),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            Spectrum::Monoenergetic { energy } => energy,
            Spectrum::Uniform { emin, emax } => rng.gen_range(emin..emax),
            Spectrum::PowerLaw { emin, emax, index } => {
                let u: f64 = rng.r#gen();
                let g = 1.0 - index;
                if g.abs() < 1e-9 {
                    emin * (emax / emin).powf(u)
                } else {
                    let lo = emin.powf(g);
                    let hi = emax.powf(g);
                    (lo + u * (hi - lo)).powf(1.0 / g)
                }
            }
        }
    }
}

fn default_species() -> ParticleCode {
    ParticleCode::NU_MU
}
fn default_direction() -> [f64; 3] {
    [0.0, 0.0, 1.0]
}
fn default_weight() -> f64 {
    1.0
}

/// Settings of the parametric beam flux, read from the `[flux]` section.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FluxSettings {
    #[serde(default = "default_species")]
    pub species: ParticleCode,
    pub spectrum: Spectrum,
    #[serde(default)]
    pub origin: [f64; 3],
    #[serde(default = "default_direction")]
    pub direction: [f64; 3],
    #[serde(default)]
    pub beam_radius: f64,
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Probes available to each job; unlimited when absent.
    #[serde(default)]
    pub max_probes: Option<u64>,
}

/// A pencil or disk beam with a parametric energy spectrum.
#[derive(Debug)]
pub struct BeamFlux {
    settings: FluxSettings,
    direction: Vector3<f64>,
    // orthonormal basis of the beam's transverse plane
    transverse: (Vector3<f64>, Vector3<f64>),
    remaining: Option<u64>,
    rng: StdRng,
}

impl BeamFlux {
    pub fn new(settings: FluxSettings, seed: u64) -> Result<Self, FluxError> {
        settings.spectrum.validate()?;
        if !(settings.beam_radius.is_finite() && settings.beam_radius >= 0.0) {
            return Err(FluxError::Radius(settings.beam_radius));
        }
        if !(settings.weight.is_finite() && settings.weight >= 0.0) {
            return Err(FluxError::Weight(settings.weight));
        }
        let direction = Vector3::from(settings.direction)
            .try_normalize(f64::EPSILON)
            .ok_or(FluxError::ZeroDirection)?;
        let helper = if direction.x.abs() < 0.9 {
            Vector3::x()
        } else {
            Vector3::y()
        };
        let u = direction.cross(&helper).normalize();
        let v = direction.cross(&u);

        Ok(Self {
            remaining: settings.max_probes,
            settings,
            direction,
            transverse: (u, v),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    fn sample_position(&mut self) -> Point3<f64> {
        let origin = Point3::from(self.settings.origin);
        if self.settings.beam_radius == 0.0 {
            return origin;
        }
        // uniform over the disk
        let r = self.settings.beam_radius * self.rng.r#gen::<f64>().sqrt();
        let phi = self.rng.gen_range(0.0..std::f64::consts::TAU);
        let (u, v) = self.transverse;
        origin + u * (r * phi.cos()) + v * (r * phi.sin())
    }
}

impl FluxSource for BeamFlux {
    fn next(&mut self) -> Result<Option<ProbeSample>, BoxError> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return Ok(None);
            }
            *remaining -= 1;
        }
        let energy = self.settings.spectrum.sample(&mut self.rng);
        let position = self.sample_position();
        let probe = ProbeSample::new(self.settings.species, energy, self.direction, position)
            .with_weight(self.settings.weight);
        Ok(Some(probe))
    }
}
