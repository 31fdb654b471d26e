//! Axis-aligned boxes: the initial set, the unsafe set and the state space.

use std::fmt;

use ibc_smt::terms::SmtTerm;
use num::rational::BigRational;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::numeric::{linspace, rational_from_f64};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionKind {
    Initial,
    Unsafe,
    StateSpace,
}

impl fmt::Display for RegionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKind::Initial => write!(f, "initial region"),
            RegionKind::Unsafe => write!(f, "unsafe region"),
            RegionKind::StateSpace => write!(f, "state space"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegionError {
    #[error("{kind}: expected an even number of bounds, got {count}")]
    OddBoundCount { kind: RegionKind, count: usize },
    #[error("{kind}: no bounds given")]
    Empty { kind: RegionKind },
    #[error("{kind}: bound {index} is not finite ({value})")]
    NonFinite {
        kind: RegionKind,
        index: usize,
        value: f64,
    },
    #[error("{kind}: axis {axis} has low {low} greater than high {high}")]
    Inverted {
        kind: RegionKind,
        axis: usize,
        low: f64,
        high: f64,
    },
    #[error("{kind}: has dimension {found}, expected {expected}")]
    DimensionMismatch {
        kind: RegionKind,
        expected: usize,
        found: usize,
    },
}

/// Closed interval on one axis, kept both as the given float and as the
/// exact rational handed to the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct Interval {
    pub low: f64,
    pub high: f64,
    low_exact: BigRational,
    high_exact: BigRational,
}

impl Interval {
    pub fn low_exact(&self) -> &BigRational {
        &self.low_exact
    }

    pub fn high_exact(&self) -> &BigRational {
        &self.high_exact
    }
}

/// Axis-aligned box `[low_0, high_0] x [low_1, high_1] x ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    kind: RegionKind,
    axes: Vec<Interval>,
}

impl Region {
    /// Build a box from flat bounds `(low_0, high_0, low_1, high_1, ...)`.
    pub fn from_flat(kind: RegionKind, bounds: &[f64]) -> Result<Self, RegionError> {
        if bounds.is_empty() {
            return Err(RegionError::Empty { kind });
        }
        if bounds.len() % 2 != 0 {
            return Err(RegionError::OddBoundCount {
                kind,
                count: bounds.len(),
            });
        }
        let mut axes = Vec::with_capacity(bounds.len() / 2);
        for (axis, pair) in bounds.chunks_exact(2).enumerate() {
            let (low, high) = (pair[0], pair[1]);
            let low_exact = rational_from_f64(low).ok_or(RegionError::NonFinite {
                kind,
                index: 2 * axis,
                value: low,
            })?;
            let high_exact = rational_from_f64(high).ok_or(RegionError::NonFinite {
                kind,
                index: 2 * axis + 1,
                value: high,
            })?;
            if low > high {
                return Err(RegionError::Inverted {
                    kind,
                    axis,
                    low,
                    high,
                });
            }
            axes.push(Interval {
                low,
                high,
                low_exact,
                high_exact,
            });
        }
        Ok(Self { kind, axes })
    }

    pub fn kind(&self) -> RegionKind {
        self.kind
    }

    pub fn dim(&self) -> usize {
        self.axes.len()
    }

    pub fn axes(&self) -> &[Interval] {
        &self.axes
    }

    pub fn to_flat(&self) -> Vec<f64> {
        self.axes.iter().flat_map(|a| [a.low, a.high]).collect()
    }

    pub fn expect_dim(&self, expected: usize) -> Result<(), RegionError> {
        if self.dim() == expected {
            Ok(())
        } else {
            Err(RegionError::DimensionMismatch {
                kind: self.kind,
                expected,
                found: self.dim(),
            })
        }
    }

    /// `low_i <= x_i <= high_i` for every axis.
    pub fn membership(&self, state: &[SmtTerm]) -> SmtTerm {
        let mut bounds = Vec::with_capacity(2 * self.axes.len());
        for (axis, var) in self.axes.iter().zip(state) {
            bounds.push(SmtTerm::real(axis.low_exact.clone()).le(var.clone()));
            bounds.push(var.clone().le(SmtTerm::real(axis.high_exact.clone())));
        }
        SmtTerm::and(bounds)
    }

    pub fn contains(&self, point: &[f64]) -> bool {
        point.len() == self.axes.len()
            && self
                .axes
                .iter()
                .zip(point)
                .all(|(axis, &v)| axis.low <= v && v <= axis.high)
    }

    /// Cartesian grid with `per_axis` evenly spaced samples on each axis.
    pub fn grid(&self, per_axis: usize) -> Vec<Vec<f64>> {
        let mut points: Vec<Vec<f64>> = vec![Vec::new()];
        for axis in &self.axes {
            let samples = linspace(axis.low, axis.high, per_axis);
            points = points
                .into_iter()
                .flat_map(|prefix| {
                    samples.iter().map(move |&s| {
                        let mut p = prefix.clone();
                        p.push(s);
                        p
                    })
                })
                .collect();
        }
        points
    }
}
