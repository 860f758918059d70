use super::{Collaborators, build_collaborators, load_tables};
use crate::cli::CheckArgs;
use crate::config::{AppConfig, PartialJobFile};
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use fluxgen::core::models::ids::TargetId;
use fluxgen::core::traits::GeometryAnalyzer;
use fluxgen::engine::progress::ProgressReporter;
use fluxgen::engine::scheduler::JobDriver;
use tracing::{info, warn};

#[derive(Debug)]
pub struct CheckReport {
    /// `(name, target, z_min, z_max)` per layer.
    pub layers: Vec<(String, TargetId, f64, f64)>,
    /// Targets holding a constructed driver after configuration.
    pub pooled: Vec<TargetId>,
    /// Targets with physics but no volume in the geometry.
    pub unused_physics: Vec<TargetId>,
    pub tables: Vec<String>,
}

pub fn run(args: CheckArgs) -> Result<()> {
    let config = PartialJobFile::from_file(&args.config)?.resolve()?;
    let handler = CliProgressHandler::new();
    let report = inspect(&config, &ProgressReporter::with_callback(handler.get_callback()))?;

    println!("Geometry: {} layer(s)", report.layers.len());
    for (name, target, z_min, z_max) in &report.layers {
        println!("  {:<16} {:<12} z = [{}, {})", name, target, z_min, z_max);
    }
    println!("Physics drivers ready for: {:?}", report.pooled);
    if !report.unused_physics.is_empty() {
        println!(
            "  Configured but not in geometry: {:?}",
            report.unused_physics
        );
    }
    if !report.tables.is_empty() {
        println!("Fraction tables: {}", report.tables.join(", "));
    }
    println!("✓ Job file is valid.");
    Ok(())
}

/// Builds every collaborator and configures a job driver, pre-populating its pool.
pub fn inspect(config: &AppConfig, reporter: &ProgressReporter) -> Result<CheckReport> {
    let tables = load_tables(config)?;
    let table_names = tables.names().into_iter().map(str::to_string).collect();
    let Collaborators {
        mut flux,
        geometry,
        factory,
    } = build_collaborators(config, config.job.seed, tables)?;

    let geometry_targets = geometry.targets();
    let unused_physics: Vec<_> = factory
        .targets()
        .into_iter()
        .filter(|t| !geometry_targets.contains(t))
        .collect();
    if !unused_physics.is_empty() {
        warn!(targets = ?unused_physics, "Physics configured for targets absent from the geometry.");
    }

    let layers = geometry
        .layers()
        .map(|(name, target, z_min, z_max)| (name.to_string(), target, z_min, z_max))
        .collect();

    let mut driver = JobDriver::new(config.job.clone(), Box::new(factory));
    driver.use_flux(&mut flux);
    driver.use_geometry(&geometry);
    driver.configure(reporter)?;
    let pooled = driver.pool().targets();
    info!(targets = ?pooled, "Job driver configured.");

    Ok(CheckReport {
        layers,
        pooled,
        unused_physics,
        tables: table_names,
    })
}
