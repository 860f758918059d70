//! Stub collaborators shared by the engine and workflow tests.

use crate::core::models::ids::{ParticleCode, TargetId};
use crate::core::models::path::PathLengthList;
use crate::core::models::probe::ProbeSample;
use crate::core::models::record::{InteractionRecord, Particle, ParticleStatus};
use crate::core::physics::spline::EnergyIndexing;
use crate::core::traits::{BoxError, DriverFactory, FluxSource, GeometryAnalyzer, PhysicsDriver};
use nalgebra::{Point3, Vector3};
use rand::{Rng, RngCore};
use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;

pub fn carbon() -> TargetId {
    TargetId::nucleus(6, 12)
}

pub fn iron() -> TargetId {
    TargetId::nucleus(26, 56)
}

pub fn probe(energy: f64) -> ProbeSample {
    ProbeSample::new(ParticleCode::NU_MU, energy, Vector3::z(), Point3::origin())
}

/// Yields a fixed list of probes, then reports exhaustion forever.
pub struct VecFlux {
    probes: VecDeque<ProbeSample>,
    pub drawn: Rc<Cell<usize>>,
}

impl VecFlux {
    pub fn new(probes: impl IntoIterator<Item = ProbeSample>) -> Self {
        Self {
            probes: probes.into_iter().collect(),
            drawn: Rc::new(Cell::new(0)),
        }
    }

    /// `n` probes cycling through `energies`.
    pub fn cycling(energies: &[f64], n: usize) -> Self {
        Self::new((0..n).map(|i| probe(energies[i % energies.len()])))
    }
}

impl FluxSource for VecFlux {
    fn next(&mut self) -> Result<Option<ProbeSample>, BoxError> {
        let next = self.probes.pop_front();
        if next.is_some() {
            self.drawn.set(self.drawn.get() + 1);
        }
        Ok(next)
    }
}

/// Never-ending source of identical probes.
pub struct RepeatFlux {
    probe: ProbeSample,
}

impl RepeatFlux {
    pub fn new(probe: ProbeSample) -> Self {
        Self { probe }
    }
}

impl FluxSource for RepeatFlux {
    fn next(&mut self) -> Result<Option<ProbeSample>, BoxError> {
        Ok(Some(self.probe.clone()))
    }
}

pub struct FailingFlux;

impl FluxSource for FailingFlux {
    fn next(&mut self) -> Result<Option<ProbeSample>, BoxError> {
        Err("flux file is corrupt".into())
    }
}

/// Returns the same path-length list for every probe.
pub struct FixedGeometry {
    paths: PathLengthList,
    targets: Vec<TargetId>,
    pub queries: Cell<usize>,
    fail: bool,
}

impl FixedGeometry {
    pub fn new(segments: &[(TargetId, f64)]) -> Self {
        let mut targets: Vec<_> = segments.iter().map(|(t, _)| *t).collect();
        targets.sort();
        targets.dedup();
        Self {
            paths: segments.iter().copied().collect(),
            targets,
            queries: Cell::new(0),
            fail: false,
        }
    }

    /// Always misses, while still advertising `targets`.
    pub fn missing(targets: &[TargetId]) -> Self {
        Self {
            paths: PathLengthList::new(),
            targets: targets.to_vec(),
            queries: Cell::new(0),
            fail: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new(&[(carbon(), 1.0)])
        }
    }
}

impl GeometryAnalyzer for FixedGeometry {
    fn path_lengths(&self, _probe: &ProbeSample) -> Result<PathLengthList, BoxError> {
        self.queries.set(self.queries.get() + 1);
        if self.fail {
            return Err("geometry overlap detected".into());
        }
        Ok(self.paths.clone())
    }

    fn targets(&self) -> Vec<TargetId> {
        self.targets.clone()
    }
}

/// Per-target call counters shared between a stub factory and the test body.
#[derive(Debug, Default)]
pub struct Calls {
    pub constructed: RefCell<HashMap<TargetId, usize>>,
    pub likelihood: Cell<usize>,
    pub generate: Cell<usize>,
    pub splines: RefCell<Vec<(TargetId, EnergyIndexing)>>,
    pub cleared: Cell<usize>,
}

impl Calls {
    pub fn constructed(&self, target: TargetId) -> usize {
        self.constructed.borrow().get(&target).copied().unwrap_or(0)
    }

    pub fn total_constructed(&self) -> usize {
        self.constructed.borrow().values().sum()
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Likelihood {
    Constant(f64),
    /// Likelihood equal to the probe energy times a slope.
    Linear(f64),
    Failing,
}

pub struct StubDriver {
    pub id: usize,
    target: TargetId,
    likelihood: Likelihood,
    calls: Rc<Calls>,
}

impl PhysicsDriver for StubDriver {
    fn likelihood(&mut self, probe: &ProbeSample) -> Result<f64, BoxError> {
        self.calls.likelihood.set(self.calls.likelihood.get() + 1);
        match self.likelihood {
            Likelihood::Constant(value) => Ok(value),
            Likelihood::Linear(slope) => Ok(slope * probe.energy),
            Likelihood::Failing => Err("cross-section table missing".into()),
        }
    }

    fn generate(
        &mut self,
        probe: &ProbeSample,
        rng: &mut dyn RngCore,
    ) -> Result<InteractionRecord, BoxError> {
        self.calls.generate.set(self.calls.generate.get() + 1);
        let mut record = InteractionRecord::new(probe.clone(), self.target, "stub");
        let fraction: f64 = rng.gen_range(0.1..0.9);
        record.push(Particle::new(
            ParticleCode::MUON,
            ParticleStatus::FinalState,
            probe.energy * fraction,
            probe.momentum() * fraction,
        ));
        Ok(record)
    }

    fn create_splines(&mut self, indexing: EnergyIndexing) -> Result<(), BoxError> {
        self.calls.splines.borrow_mut().push((self.target, indexing));
        Ok(())
    }

    fn clear_splines(&mut self) {
        self.calls.cleared.set(self.calls.cleared.get() + 1);
    }
}

/// Builds `StubDriver`s for the configured targets and counts constructions.
pub struct StubFactory {
    likelihoods: HashMap<TargetId, Likelihood>,
    pub calls: Rc<Calls>,
    next_id: Cell<usize>,
}

impl StubFactory {
    pub fn new(likelihoods: &[(TargetId, Likelihood)]) -> Self {
        Self {
            likelihoods: likelihoods.iter().copied().collect(),
            calls: Rc::new(Calls::default()),
            next_id: Cell::new(0),
        }
    }
}

impl DriverFactory for StubFactory {
    fn build(&self, target: TargetId) -> Result<Option<Box<dyn PhysicsDriver>>, BoxError> {
        let Some(&likelihood) = self.likelihoods.get(&target) else {
            return Ok(None);
        };
        *self
            .calls
            .constructed
            .borrow_mut()
            .entry(target)
            .or_default() += 1;
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        Ok(Some(Box::new(StubDriver {
            id,
            target,
            likelihood,
            calls: Rc::clone(&self.calls),
        })))
    }
}
