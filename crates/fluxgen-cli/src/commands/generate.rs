use super::{Collaborators, build_collaborators, load_tables};
use crate::cli::GenerateArgs;
use crate::config::{AppConfig, PartialJobFile};
use crate::error::Result;
use crate::output;
use crate::utils::progress::CliProgressHandler;
use fluxgen::core::physics::tables::FractionTableSet;
use fluxgen::engine::progress::ProgressReporter;
use fluxgen::engine::scheduler::JobDriver;
use fluxgen::engine::stats::JobStats;
use fluxgen::workflows::generate::{self, GenerationSummary};
use indicatif::{MultiProgress, ProgressDrawTarget};
use rayon::prelude::*;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Result of one independent job.
#[derive(Debug)]
pub struct JobOutcome {
    pub index: usize,
    pub seed: u64,
    pub summary: GenerationSummary,
}

pub fn run(args: GenerateArgs) -> Result<()> {
    let partial_config = PartialJobFile::from_file(&args.config)?;
    info!("Merging configuration from file and CLI arguments...");
    let config = partial_config.merge_with_cli(&args)?;

    println!(
        "Generating {} event(s) in {} job(s)...",
        config.events, config.jobs
    );
    let outcomes = execute(&config, ProgressDrawTarget::stderr())?;

    let mut stats = JobStats::default();
    for outcome in &outcomes {
        stats.merge(&outcome.summary.stats);
        if outcome.summary.exhausted {
            println!(
                "  Job {} (seed {}): flux exhausted after {} event(s)",
                outcome.index,
                outcome.seed,
                outcome.summary.records.len()
            );
        }
    }
    let max_pmax = outcomes
        .iter()
        .map(|o| o.summary.pmax)
        .fold(0.0_f64, f64::max);

    println!(
        "✓ {} event(s) from {} probe(s) (acceptance {:.3}%, {} bound raise(s), final pmax {:.4e})",
        stats.accepted,
        stats.probes_drawn,
        stats.acceptance_rate() * 100.0,
        stats.bound_raises,
        max_pmax
    );

    if let Some(path) = &config.output {
        let jobs: Vec<_> = outcomes
            .iter()
            .map(|o| (o.index, o.summary.records.as_slice()))
            .collect();
        let written = output::write_events_to_path(path, &jobs)?;
        info!(events = written, path = %path.display(), "Events written.");
        println!("✓ Events written to: {}", path.display());
    }

    Ok(())
}

/// Runs every job of `config` in parallel and returns the outcomes in job order.
#[instrument(skip_all, fields(jobs = config.jobs, events = config.events))]
pub fn execute(config: &AppConfig, draw_target: ProgressDrawTarget) -> Result<Vec<JobOutcome>> {
    let tables = load_tables(config)?;
    // fail on bad settings before any job starts
    build_collaborators(config, config.job.seed, Arc::clone(&tables))?;

    let multi = MultiProgress::with_draw_target(draw_target);
    (0..config.jobs)
        .into_par_iter()
        .map(|index| {
            let label = if config.jobs > 1 {
                format!("[job {}] ", index)
            } else {
                String::new()
            };
            let handler = CliProgressHandler::attached(&multi, label);
            let reporter = ProgressReporter::with_callback(handler.get_callback());
            run_job(config, index, Arc::clone(&tables), &reporter)
        })
        .collect()
}

fn run_job(
    config: &AppConfig,
    index: usize,
    tables: Arc<FractionTableSet>,
    reporter: &ProgressReporter,
) -> Result<JobOutcome> {
    let seed = config.job_seed(index);
    let Collaborators {
        mut flux,
        geometry,
        factory,
    } = build_collaborators(config, seed, tables)?;

    let mut job = config.job.clone();
    job.seed = seed;

    let mut driver = JobDriver::new(job, Box::new(factory));
    driver.use_flux(&mut flux);
    driver.use_geometry(&geometry);

    let summary = generate::run(&mut driver, config.job_events(index), reporter)?;
    if summary.exhausted {
        warn!(job = index, "Job ended early on an exhausted flux.");
    }
    Ok(JobOutcome {
        index,
        seed,
        summary,
    })
}
