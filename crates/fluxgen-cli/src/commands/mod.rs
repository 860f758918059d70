pub mod check;
pub mod generate;

use crate::config::AppConfig;
use crate::error::{CliError, Result};
use crate::sim::flux::BeamFlux;
use crate::sim::geometry::SlabGeometry;
use crate::sim::physics::ReferenceFactory;
use crate::sim::tables;
use fluxgen::core::physics::tables::FractionTableSet;
use std::sync::Arc;

/// Seeds the flux stream apart from the job driver's own stream.
const FLUX_SEED_SALT: u64 = 0x9E37_79B9_7F4A_7C15;

/// Collaborators of one job, built from resolved settings.
pub(crate) struct Collaborators {
    pub flux: BeamFlux,
    pub geometry: SlabGeometry,
    pub factory: ReferenceFactory,
}

pub(crate) fn load_tables(config: &AppConfig) -> Result<Arc<FractionTableSet>> {
    Ok(Arc::new(tables::load_tables(&config.tables)?))
}

pub(crate) fn build_collaborators(
    config: &AppConfig,
    seed: u64,
    tables: Arc<FractionTableSet>,
) -> Result<Collaborators> {
    Ok(Collaborators {
        flux: BeamFlux::new(config.flux.clone(), seed ^ FLUX_SEED_SALT).map_err(setup_error)?,
        geometry: SlabGeometry::new(&config.geometry).map_err(setup_error)?,
        factory: ReferenceFactory::new(&config.physics, tables).map_err(setup_error)?,
    })
}

fn setup_error(e: impl std::fmt::Display) -> CliError {
    CliError::Setup(e.to_string())
}
