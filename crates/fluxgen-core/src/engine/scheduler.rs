use super::config::{ConfigError, JobConfig};
use super::error::EngineError;
use super::pool::DriverPool;
use super::progress::{Progress, ProgressReporter};
use super::stats::JobStats;
use super::utils::sampling::weighted_choice;
use crate::core::models::path::PathLengthList;
use crate::core::models::probe::ProbeSample;
use crate::core::models::record::InteractionRecord;
use crate::core::physics::spline::EnergyIndexing;
use crate::core::traits::{DriverFactory, FluxSource, GeometryAnalyzer};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, instrument, trace};

/// Rejection-sampling job driver.
///
/// Pulls probes from a flux source, weighs them by the path lengths reported by
/// the geometry and the likelihoods of the per-target physics drivers, and keeps
/// a probe with probability `P / Pmax`. `Pmax` is an adaptive bound that only ever
/// grows.
///
/// A probe whose `P` breaches the current bound raises the bound to
/// `P * pmax_headroom` and is accepted without a random test. Every other probe
/// is tested against the bound in force at the time it is drawn.
///
/// The driver borrows its flux source and geometry for `'a` and owns its driver
/// pool, random source and bound. It is meant for a single thread; run several
/// instances for parallel throughput.
pub struct JobDriver<'a> {
    flux: Option<&'a mut dyn FluxSource>,
    geometry: Option<&'a dyn GeometryAnalyzer>,
    pool: DriverPool,
    config: JobConfig,
    pmax: f64,
    rng: StdRng,
    stats: JobStats,
    configured: bool,
}

impl<'a> JobDriver<'a> {
    pub fn new(config: JobConfig, factory: Box<dyn DriverFactory>) -> Self {
        Self {
            flux: None,
            geometry: None,
            pool: DriverPool::new(factory),
            pmax: config.initial_pmax,
            rng: StdRng::seed_from_u64(config.seed),
            config,
            stats: JobStats::default(),
            configured: false,
        }
    }

    pub fn use_flux(&mut self, flux: &'a mut dyn FluxSource) {
        self.flux = Some(flux);
        self.configured = false;
    }

    pub fn use_geometry(&mut self, geometry: &'a dyn GeometryAnalyzer) {
        self.geometry = Some(geometry);
        self.configured = false;
    }

    pub fn use_splines(&mut self, indexing: EnergyIndexing) {
        self.config.splines = Some(indexing);
        self.configured = false;
    }

    pub fn disable_splines(&mut self) {
        self.config.splines = None;
        self.configured = false;
    }

    /// Checks the bound collaborators and builds a driver for every target the geometry can report.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingParameter`] when the flux or geometry is unbound, and
    /// any driver-pool error raised while building drivers.
    #[instrument(skip_all, name = "job_configure")]
    pub fn configure(&mut self, reporter: &ProgressReporter) -> Result<(), EngineError> {
        if self.flux.is_none() {
            return Err(ConfigError::MissingParameter("flux").into());
        }
        let geometry = self
            .geometry
            .ok_or(ConfigError::MissingParameter("geometry"))?;

        reporter.report(Progress::PhaseStart {
            name: "Building physics drivers",
        });
        self.pool.set_splines(self.config.splines)?;

        let targets = geometry.targets();
        reporter.report(Progress::TaskStart {
            total_steps: targets.len() as u64,
        });
        for target in targets {
            self.pool.lookup(target)?;
            reporter.report(Progress::TaskIncrement);
        }
        reporter.report(Progress::TaskFinish);
        reporter.report(Progress::PhaseFinish);

        info!(
            drivers = self.pool.len(),
            pmax = self.pmax,
            splines = ?self.config.splines,
            "Job driver configured."
        );
        self.configured = true;
        Ok(())
    }

    /// Draws probes until one is accepted or the flux runs out.
    ///
    /// # Return
    ///
    /// `Ok(Some(record))` for an accepted probe, `Ok(None)` once the flux is exhausted.
    ///
    /// # Errors
    ///
    /// [`EngineError::NotConfigured`] before [`configure`](Self::configure) succeeds; any
    /// collaborator failure aborts the call unrecovered.
    #[instrument(level = "debug", skip_all, fields(pmax = self.pmax))]
    pub fn generate_event(&mut self) -> Result<Option<InteractionRecord>, EngineError> {
        if !self.configured {
            return Err(EngineError::NotConfigured);
        }
        let Self {
            flux,
            geometry,
            pool,
            config,
            pmax,
            rng,
            stats,
            ..
        } = self;
        let (Some(flux), Some(geometry)) = (flux.as_deref_mut(), *geometry) else {
            return Err(EngineError::NotConfigured);
        };

        loop {
            let Some(probe) = flux.next().map_err(|source| EngineError::Flux { source })? else {
                debug!("Flux exhausted.");
                return Ok(None);
            };
            stats.probes_drawn += 1;
            if !probe.weight.is_finite() || probe.weight < 0.0 {
                return Err(EngineError::InvalidWeight(probe.weight));
            }

            let paths = geometry
                .path_lengths(&probe)
                .map_err(|source| EngineError::Geometry { source })?;
            if paths.is_empty() {
                stats.geometry_misses += 1;
                continue;
            }

            let contributions = segment_contributions(pool, &paths, &probe)?;
            let probability: f64 = contributions.iter().sum();
            if !probability.is_finite() {
                return Err(EngineError::InvalidProbability { value: probability });
            }

            let accepted = if probability <= 0.0 {
                false
            } else if probability > *pmax {
                // headroom must not push the bound past the largest finite value
                let raised = probability * config.pmax_headroom;
                *pmax = if raised.is_finite() { raised } else { probability };
                stats.bound_raises += 1;
                debug!(
                    probability,
                    pmax = *pmax,
                    "Probability exceeded bound; raising bound and accepting probe."
                );
                true
            } else {
                rng.gen_range(0.0..*pmax) < probability
            };

            if !accepted {
                stats.rejections += 1;
                trace!(probability, energy = probe.energy, "Probe rejected.");
                continue;
            }

            let index = weighted_choice(&contributions, rng)?;
            let target = paths.segments()[index].target;
            let record = pool
                .lookup(target)?
                .generate(&probe, rng)
                .map_err(|source| EngineError::Driver { target, source })?;
            stats.accepted += 1;
            trace!(%target, channel = %record.channel, "Probe accepted.");
            return Ok(Some(record));
        }
    }

    /// Current adaptive bound.
    pub fn pmax(&self) -> f64 {
        self.pmax
    }

    pub fn stats(&self) -> &JobStats {
        &self.stats
    }

    pub fn pool(&self) -> &DriverPool {
        &self.pool
    }

    pub fn config(&self) -> &JobConfig {
        &self.config
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }
}

/// Per-segment `likelihood * length * weight`, in path order.
fn segment_contributions(
    pool: &mut DriverPool,
    paths: &PathLengthList,
    probe: &ProbeSample,
) -> Result<Vec<f64>, EngineError> {
    paths
        .iter()
        .map(|segment| {
            let target = segment.target;
            if !segment.length.is_finite() || segment.length < 0.0 {
                return Err(EngineError::InvalidPathLength {
                    target,
                    value: segment.length,
                });
            }
            let likelihood = pool
                .lookup(target)?
                .likelihood(probe)
                .map_err(|source| EngineError::Driver { target, source })?;
            if !likelihood.is_finite() || likelihood < 0.0 {
                return Err(EngineError::InvalidLikelihood {
                    target,
                    value: likelihood,
                });
            }
            Ok(likelihood * segment.length * probe.weight)
        })
        .collect()
}

impl std::fmt::Debug for JobDriver<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobDriver")
            .field("has_flux", &self.flux.is_some())
            .field("has_geometry", &self.geometry.is_some())
            .field("pool", &self.pool)
            .field("config", &self.config)
            .field("pmax", &self.pmax)
            .field("stats", &self.stats)
            .field("configured", &self.configured)
            .finish()
    }
}
