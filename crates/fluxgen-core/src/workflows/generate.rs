use crate::core::models::record::InteractionRecord;
use crate::engine::error::EngineError;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scheduler::JobDriver;
use crate::engine::stats::JobStats;
use tracing::{info, instrument, warn};

#[derive(Debug, Clone)]
pub struct GenerationSummary {
    pub records: Vec<InteractionRecord>,
    pub stats: JobStats,
    /// Adaptive bound at the end of the run.
    pub pmax: f64,
    /// `true` when the flux ran out before `n_events` records were produced.
    pub exhausted: bool,
}

/// Generates up to `n_events` records with `driver`, configuring it first if needed.
#[instrument(skip_all, name = "generation_workflow", fields(n_events = n_events))]
pub fn run(
    driver: &mut JobDriver<'_>,
    n_events: u64,
    reporter: &ProgressReporter,
) -> Result<GenerationSummary, EngineError> {
    if !driver.is_configured() {
        driver.configure(reporter)?;
    }

    reporter.report(Progress::PhaseStart {
        name: "Generating events",
    });
    reporter.report(Progress::TaskStart {
        total_steps: n_events,
    });

    let mut records = Vec::with_capacity(n_events.min(1 << 16) as usize);
    let mut exhausted = false;
    let mut last_pmax = driver.pmax();

    while (records.len() as u64) < n_events {
        let next = driver.generate_event()?;
        if driver.pmax() > last_pmax {
            last_pmax = driver.pmax();
            reporter.report(Progress::BoundRaised { pmax: last_pmax });
        }
        match next {
            Some(record) => {
                records.push(record);
                reporter.report(Progress::TaskIncrement);
            }
            None => {
                exhausted = true;
                break;
            }
        }
    }

    reporter.report(Progress::TaskFinish);
    reporter.report(Progress::PhaseFinish);

    let stats = *driver.stats();
    if exhausted {
        warn!(
            produced = records.len(),
            requested = n_events,
            "Flux exhausted before the requested number of events."
        );
        if reporter.is_enabled() {
            reporter.report(Progress::Message(format!(
                "Flux exhausted after {} of {} events",
                records.len(),
                n_events
            )));
        }
    }
    info!(
        events = records.len(),
        probes = stats.probes_drawn,
        acceptance = stats.acceptance_rate(),
        pmax = driver.pmax(),
        "Generation finished."
    );

    Ok(GenerationSummary {
        records,
        stats,
        pmax: driver.pmax(),
        exhausted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::config::JobConfigBuilder;
    use crate::engine::testing::{
        FixedGeometry, Likelihood, RepeatFlux, StubFactory, VecFlux, carbon, iron, probe,
    };
    use std::sync::Mutex;

    #[test]
    fn run_configures_and_produces_requested_events() {
        let factory = StubFactory::new(&[
            (carbon(), Likelihood::Linear(1.0)),
            (iron(), Likelihood::Linear(2.0)),
        ]);
        let calls = factory.calls.clone();
        let mut flux = RepeatFlux::new(probe(2.0));
        let geometry = FixedGeometry::new(&[(carbon(), 1.0), (iron(), 1.0)]);
        let config = JobConfigBuilder::new().seed(10).build().unwrap();
        let mut driver = JobDriver::new(config, Box::new(factory));
        driver.use_flux(&mut flux);
        driver.use_geometry(&geometry);

        let summary = run(&mut driver, 25, &ProgressReporter::new()).unwrap();
        assert_eq!(summary.records.len(), 25);
        assert!(!summary.exhausted);
        assert_eq!(summary.stats.accepted, 25);
        assert!(summary.pmax >= 6.0);
        assert_eq!(calls.total_constructed(), 2);
    }

    #[test]
    fn run_stops_cleanly_on_exhaustion() {
        let factory = StubFactory::new(&[(carbon(), Likelihood::Linear(1.0))]);
        let mut flux = VecFlux::cycling(&[1.0, 3.0], 10);
        let geometry = FixedGeometry::new(&[(carbon(), 1.0)]);
        let config = JobConfigBuilder::new().seed(3).build().unwrap();
        let mut driver = JobDriver::new(config, Box::new(factory));
        driver.use_flux(&mut flux);
        driver.use_geometry(&geometry);

        let summary = run(&mut driver, 1_000, &ProgressReporter::new()).unwrap();
        assert!(summary.exhausted);
        assert!(summary.records.len() <= 10);
        assert_eq!(summary.stats.probes_drawn, 10);
    }

    #[test]
    fn run_reports_progress_and_bound_raises() {
        let factory = StubFactory::new(&[(carbon(), Likelihood::Linear(1.0))]);
        let mut flux = VecFlux::cycling(&[1.0, 2.0, 4.0], 30);
        let geometry = FixedGeometry::new(&[(carbon(), 1.0)]);
        let config = JobConfigBuilder::new().seed(5).build().unwrap();
        let mut driver = JobDriver::new(config, Box::new(factory));
        driver.use_flux(&mut flux);
        driver.use_geometry(&geometry);

        let events = Mutex::new(Vec::new());
        let reporter = ProgressReporter::with_callback(Box::new(|event| {
            events.lock().unwrap().push(event);
        }));
        let summary = run(&mut driver, 3, &reporter).unwrap();
        drop(reporter);

        let events = events.into_inner().unwrap();
        let increments = events
            .iter()
            .filter(|e| matches!(e, Progress::TaskIncrement))
            .count();
        // one increment per configured target, one per generated event
        assert_eq!(increments, 1 + summary.records.len());
        let raises: Vec<f64> = events
            .iter()
            .filter_map(|e| match e {
                Progress::BoundRaised { pmax } => Some(*pmax),
                _ => None,
            })
            .collect();
        assert!(!raises.is_empty());
        assert!(raises.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*raises.last().unwrap(), summary.pmax);
    }

    #[test]
    fn run_with_zero_events_draws_nothing() {
        let factory = StubFactory::new(&[(carbon(), Likelihood::Constant(1.0))]);
        let mut flux = VecFlux::cycling(&[1.0], 5);
        let drawn = flux.drawn.clone();
        let geometry = FixedGeometry::new(&[(carbon(), 1.0)]);
        let config = JobConfigBuilder::new().seed(1).build().unwrap();
        let mut driver = JobDriver::new(config, Box::new(factory));
        driver.use_flux(&mut flux);
        driver.use_geometry(&geometry);

        let summary = run(&mut driver, 0, &ProgressReporter::new()).unwrap();
        assert!(summary.records.is_empty());
        assert!(!summary.exhausted);
        drop(driver);
        assert_eq!(drawn.get(), 0);
    }
}
