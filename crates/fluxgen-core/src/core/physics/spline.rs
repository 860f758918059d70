use serde::Deserialize;
use thiserror::Error;

/// Energy variable used to place and interpolate spline knots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum EnergyIndexing {
    Linear,
    #[default]
    Log,
}

impl EnergyIndexing {
    fn transform(self, energy: f64) -> f64 {
        match self {
            EnergyIndexing::Linear => energy,
            EnergyIndexing::Log => energy.ln(),
        }
    }

    fn inverse(self, x: f64) -> f64 {
        match self {
            EnergyIndexing::Linear => x,
            EnergyIndexing::Log => x.exp(),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum SplineError {
    #[error("A spline needs at least 2 knots, got {0}")]
    TooFewKnots(usize),
    #[error("Knot energies must be strictly increasing (knot {index}: {energy})")]
    NotIncreasing { index: usize, energy: f64 },
    #[error("Knot {index} has a non-finite value or energy")]
    NonFinite { index: usize },
    #[error("Log-energy indexing requires positive energies (knot {index}: {energy})")]
    NonPositiveEnergy { index: usize, energy: f64 },
    #[error("Invalid tabulation range [{emin}, {emax}]")]
    InvalidRange { emin: f64, emax: f64 },
}

/// Piecewise-linear interpolation of a function of energy, linear in `E` or in `ln E`.
#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    indexing: EnergyIndexing,
    // (transformed energy, value), strictly increasing in x
    knots: Vec<(f64, f64)>,
}

impl Spline {
    pub fn from_knots(
        indexing: EnergyIndexing,
        knots: Vec<(f64, f64)>,
    ) -> Result<Self, SplineError> {
        if knots.len() < 2 {
            return Err(SplineError::TooFewKnots(knots.len()));
        }
        let mut transformed = Vec::with_capacity(knots.len());
        for (index, &(energy, value)) in knots.iter().enumerate() {
            if !energy.is_finite() || !value.is_finite() {
                return Err(SplineError::NonFinite { index });
            }
            if indexing == EnergyIndexing::Log && energy <= 0.0 {
                return Err(SplineError::NonPositiveEnergy { index, energy });
            }
            let x = indexing.transform(energy);
            if let Some(&(prev, _)) = transformed.last() {
                if x <= prev {
                    return Err(SplineError::NotIncreasing { index, energy });
                }
            }
            transformed.push((x, value));
        }
        Ok(Self {
            indexing,
            knots: transformed,
        })
    }

    /// Samples `f` on `n_knots` points evenly spaced in the indexing variable over `[emin, emax]`.
    pub fn tabulate<F>(
        indexing: EnergyIndexing,
        emin: f64,
        emax: f64,
        n_knots: usize,
        mut f: F,
    ) -> Result<Self, SplineError>
    where
        F: FnMut(f64) -> f64,
    {
        if !(emin.is_finite() && emax.is_finite()) || emin >= emax {
            return Err(SplineError::InvalidRange { emin, emax });
        }
        if indexing == EnergyIndexing::Log && emin <= 0.0 {
            return Err(SplineError::NonPositiveEnergy {
                index: 0,
                energy: emin,
            });
        }
        if n_knots < 2 {
            return Err(SplineError::TooFewKnots(n_knots));
        }

        let x0 = indexing.transform(emin);
        let x1 = indexing.transform(emax);
        let step = (x1 - x0) / (n_knots - 1) as f64;
        let knots = (0..n_knots)
            .map(|i| {
                // pin the last knot to emax to avoid exp/ln round-off
                let energy = if i + 1 == n_knots {
                    emax
                } else {
                    indexing.inverse(x0 + step * i as f64)
                };
                (energy, f(energy))
            })
            .collect();
        Self::from_knots(indexing, knots)
    }

    pub fn indexing(&self) -> EnergyIndexing {
        self.indexing
    }

    pub fn len(&self) -> usize {
        self.knots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    pub fn range(&self) -> (f64, f64) {
        let first = self.knots[0].0;
        let last = self.knots[self.knots.len() - 1].0;
        (self.indexing.inverse(first), self.indexing.inverse(last))
    }

    /// Interpolated value at `energy`, clamped to the end knots outside the tabulated range.
    pub fn evaluate(&self, energy: f64) -> f64 {
        let (first_x, first_y) = self.knots[0];
        let (last_x, last_y) = self.knots[self.knots.len() - 1];

        if self.indexing == EnergyIndexing::Log && energy <= 0.0 {
            return first_y;
        }
        let x = self.indexing.transform(energy);
        if x <= first_x {
            return first_y;
        }
        if x >= last_x {
            return last_y;
        }

        let upper = self.knots.partition_point(|&(kx, _)| kx <= x);
        let (xa, ya) = self.knots[upper - 1];
        let (xb, yb) = self.knots[upper];
        ya + (yb - ya) * (x - xa) / (xb - xa)
    }
}
