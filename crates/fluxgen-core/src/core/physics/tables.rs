use crate::core::models::ids::ParticleCode;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum TableError {
    #[error("Fraction table '{0}' has no energy bins")]
    NoBins(String),
    #[error("Fraction table '{table}': bin [{emin}, {emax}] is empty or inverted")]
    InvalidBin { table: String, emin: f64, emax: f64 },
    #[error("Fraction table '{table}': bin starting at {emin} has negative or non-finite fractions")]
    InvalidFraction { table: String, emin: f64 },
    #[error("Fraction table '{table}': bin starting at {emin} has zero total fraction")]
    ZeroTotal { table: String, emin: f64 },
    #[error("Fraction table '{table}': fractions of bin starting at {emin} overflow")]
    TotalOverflow { table: String, emin: f64 },
}

/// Relative production fractions of particle species inside one energy interval.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnergyBin {
    pub emin: f64,
    pub emax: f64,
    pub fractions: Vec<FractionEntry>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FractionEntry {
    pub pdg: ParticleCode,
    pub fraction: f64,
}

impl EnergyBin {
    fn contains(&self, energy: f64) -> bool {
        energy >= self.emin && energy < self.emax
    }

    fn total(&self) -> f64 {
        self.fractions.iter().map(|f| f.fraction).sum()
    }
}

/// An energy-binned table of species fractions, e.g. charm-hadron production fractions.
///
/// Tables are plain owned values. A driver that needs one receives it at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FractionTable {
    name: String,
    bins: Vec<EnergyBin>,
}

impl FractionTable {
    pub fn new(name: impl Into<String>, mut bins: Vec<EnergyBin>) -> Result<Self, TableError> {
        let name = name.into();
        if bins.is_empty() {
            return Err(TableError::NoBins(name));
        }
        for bin in &bins {
            if !(bin.emin.is_finite() && bin.emax.is_finite()) || bin.emin >= bin.emax {
                return Err(TableError::InvalidBin {
                    table: name,
                    emin: bin.emin,
                    emax: bin.emax,
                });
            }
            if bin
                .fractions
                .iter()
                .any(|f| !f.fraction.is_finite() || f.fraction < 0.0)
            {
                return Err(TableError::InvalidFraction {
                    table: name,
                    emin: bin.emin,
                });
            }
            let total = bin.total();
            if !total.is_finite() {
                return Err(TableError::TotalOverflow {
                    table: name,
                    emin: bin.emin,
                });
            }
            if total <= 0.0 {
                return Err(TableError::ZeroTotal {
                    table: name,
                    emin: bin.emin,
                });
            }
        }
        bins.sort_by(|a, b| a.emin.total_cmp(&b.emin));
        Ok(Self { name, bins })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bins(&self) -> &[EnergyBin] {
        &self.bins
    }

    /// Bin covering `energy`, or the nearest bin when `energy` lies outside every bin.
    pub fn bin_for(&self, energy: f64) -> &EnergyBin {
        if let Some(bin) = self.bins.iter().find(|b| b.contains(energy)) {
            return bin;
        }
        self.bins
            .iter()
            .min_by(|a, b| {
                let da = (a.emin - energy).abs().min((a.emax - energy).abs());
                let db = (b.emin - energy).abs().min((b.emax - energy).abs());
                da.total_cmp(&db)
            })
            .unwrap_or(&self.bins[0])
    }

    /// Normalized fraction of `code` at `energy`; zero when the code is not tabulated.
    pub fn fraction(&self, energy: f64, code: ParticleCode) -> f64 {
        let bin = self.bin_for(energy);
        let matched: f64 = bin
            .fractions
            .iter()
            .filter(|f| f.pdg == code)
            .map(|f| f.fraction)
            .sum();
        matched / bin.total()
    }

    /// Draws a species at `energy` with probability equal to its tabulated fraction.
    pub fn sample<R: Rng + ?Sized>(&self, energy: f64, rng: &mut R) -> ParticleCode {
        let bin = self.bin_for(energy);
        // bins are validated to have a positive finite total
        match WeightedIndex::new(bin.fractions.iter().map(|f| f.fraction)) {
            Ok(dist) => bin.fractions[dist.sample(rng)].pdg,
            Err(_) => bin.fractions[0].pdg,
        }
    }
}

/// Named collection of fraction tables, explicitly constructed and owned by the caller.
#[derive(Debug, Clone, Default)]
pub struct FractionTableSet {
    tables: HashMap<String, FractionTable>,
}

impl FractionTableSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `table`, replacing and returning any table with the same name.
    pub fn insert(&mut self, table: FractionTable) -> Option<FractionTable> {
        self.tables.insert(table.name.clone(), table)
    }

    pub fn get(&self, name: &str) -> Option<&FractionTable> {
        self.tables.get(name)
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
