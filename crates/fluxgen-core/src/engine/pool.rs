use super::error::EngineError;
use crate::core::models::ids::TargetId;
use crate::core::physics::spline::EnergyIndexing;
use crate::core::traits::{DriverFactory, PhysicsDriver};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, info};

/// Lazily populated map from target identity to its physics driver.
///
/// The pool is the sole owner of every driver it builds. A driver is built at
/// most once per target and lives until the pool is dropped.
pub struct DriverPool {
    drivers: HashMap<TargetId, Box<dyn PhysicsDriver>>,
    factory: Box<dyn DriverFactory>,
    splines: Option<EnergyIndexing>,
}

impl DriverPool {
    pub fn new(factory: Box<dyn DriverFactory>) -> Self {
        Self {
            drivers: HashMap::new(),
            factory,
            splines: None,
        }
    }

    /// Returns the driver for `target`, building it on first use.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::DriverUnavailable`] when the factory has no physics for
    /// `target`, and [`EngineError::Driver`] when building or spline creation fails.
    /// Nothing is inserted in either case.
    pub fn lookup(&mut self, target: TargetId) -> Result<&mut dyn PhysicsDriver, EngineError> {
        let driver = match self.drivers.entry(target) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let mut driver = self
                    .factory
                    .build(target)
                    .map_err(|source| EngineError::Driver { target, source })?
                    .ok_or(EngineError::DriverUnavailable { target })?;
                if let Some(indexing) = self.splines {
                    driver
                        .create_splines(indexing)
                        .map_err(|source| EngineError::Driver { target, source })?;
                }
                info!(%target, "Built physics driver for target.");
                entry.insert(driver)
            }
        };
        Ok(driver.as_mut())
    }

    /// Sets the spline mode for drivers built from now on and applies it to existing drivers.
    pub fn set_splines(&mut self, splines: Option<EnergyIndexing>) -> Result<(), EngineError> {
        if self.splines == splines {
            return Ok(());
        }
        self.splines = splines;
        for (&target, driver) in self.drivers.iter_mut() {
            match splines {
                Some(indexing) => driver
                    .create_splines(indexing)
                    .map_err(|source| EngineError::Driver { target, source })?,
                None => driver.clear_splines(),
            }
        }
        Ok(())
    }

    pub fn splines(&self) -> Option<EnergyIndexing> {
        self.splines
    }

    pub fn contains(&self, target: TargetId) -> bool {
        self.drivers.contains_key(&target)
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }

    /// Targets with a built driver, sorted.
    pub fn targets(&self) -> Vec<TargetId> {
        let mut targets: Vec<_> = self.drivers.keys().copied().collect();
        targets.sort_unstable();
        targets
    }
}

impl std::fmt::Debug for DriverPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DriverPool")
            .field("targets", &self.targets())
            .field("splines", &self.splines)
            .finish()
    }
}

impl Drop for DriverPool {
    fn drop(&mut self) {
        debug!(drivers = self.drivers.len(), "Releasing driver pool.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::traits::BoxError;
    use crate::engine::testing::{Likelihood, StubFactory, carbon, iron, probe};

    fn address(driver: &mut dyn PhysicsDriver) -> usize {
        std::ptr::from_mut(driver).cast::<()>() as usize
    }

    #[test]
    fn repeated_lookups_return_the_same_instance() {
        let factory = StubFactory::new(&[(carbon(), Likelihood::Constant(1.0))]);
        let calls = factory.calls.clone();
        let mut pool = DriverPool::new(Box::new(factory));

        let first = address(pool.lookup(carbon()).unwrap());
        for _ in 0..100 {
            assert_eq!(address(pool.lookup(carbon()).unwrap()), first);
        }
        assert_eq!(calls.constructed(carbon()), 1);
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn each_distinct_target_is_built_exactly_once() {
        let factory = StubFactory::new(&[
            (carbon(), Likelihood::Constant(1.0)),
            (iron(), Likelihood::Constant(2.0)),
        ]);
        let calls = factory.calls.clone();
        let mut pool = DriverPool::new(Box::new(factory));

        for i in 0..50 {
            let target = if i % 3 == 0 { iron() } else { carbon() };
            pool.lookup(target).unwrap();
        }
        assert_eq!(calls.constructed(carbon()), 1);
        assert_eq!(calls.constructed(iron()), 1);
        assert_eq!(pool.targets(), vec![carbon(), iron()]);
    }

    #[test]
    fn lookup_returns_driver_bound_to_its_target() {
        let factory = StubFactory::new(&[
            (carbon(), Likelihood::Constant(1.0)),
            (iron(), Likelihood::Constant(2.0)),
        ]);
        let mut pool = DriverPool::new(Box::new(factory));
        let p = probe(1.0);
        assert_eq!(pool.lookup(carbon()).unwrap().likelihood(&p).unwrap(), 1.0);
        assert_eq!(pool.lookup(iron()).unwrap().likelihood(&p).unwrap(), 2.0);
    }

    #[test]
    fn unknown_target_is_a_fatal_lookup_error() {
        let factory = StubFactory::new(&[(carbon(), Likelihood::Constant(1.0))]);
        let mut pool = DriverPool::new(Box::new(factory));
        let result = pool.lookup(iron());
        assert!(matches!(
            result,
            Err(EngineError::DriverUnavailable { target }) if target == iron()
        ));
        assert!(!pool.contains(iron()));
        assert!(pool.lookup(iron()).is_err());
    }

    #[test]
    fn factory_failure_propagates_as_driver_error() {
        let factory = |_target: TargetId| -> Result<Option<Box<dyn PhysicsDriver>>, BoxError> {
            Err("physics list not loaded".into())
        };
        let mut pool = DriverPool::new(Box::new(factory));
        assert!(matches!(
            pool.lookup(carbon()),
            Err(EngineError::Driver { .. })
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn splines_are_created_for_new_and_existing_drivers() {
        let factory = StubFactory::new(&[
            (carbon(), Likelihood::Constant(1.0)),
            (iron(), Likelihood::Constant(2.0)),
        ]);
        let calls = factory.calls.clone();
        let mut pool = DriverPool::new(Box::new(factory));

        pool.lookup(carbon()).unwrap();
        assert!(calls.splines.borrow().is_empty());

        pool.set_splines(Some(EnergyIndexing::Log)).unwrap();
        assert_eq!(
            *calls.splines.borrow(),
            vec![(carbon(), EnergyIndexing::Log)]
        );

        pool.lookup(iron()).unwrap();
        pool.lookup(iron()).unwrap();
        assert_eq!(
            *calls.splines.borrow(),
            vec![(carbon(), EnergyIndexing::Log), (iron(), EnergyIndexing::Log)]
        );

        // same mode again is a no-op
        pool.set_splines(Some(EnergyIndexing::Log)).unwrap();
        assert_eq!(calls.splines.borrow().len(), 2);
        assert_eq!(calls.total_constructed(), 2);

        pool.set_splines(None).unwrap();
        assert_eq!(calls.cleared.get(), 2);
        assert_eq!(pool.splines(), None);
    }
}
