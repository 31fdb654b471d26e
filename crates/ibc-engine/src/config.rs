//! Problem configuration and its validated form.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::polynomial::{MonomialBasis, PolynomialMap};
use crate::region::{Region, RegionError, RegionKind};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Region(#[from] RegionError),
    #[error("dynamics have dimension {dynamics}, template basis has dimension {basis}")]
    BasisDimension { dynamics: usize, basis: usize },
    #[error("template basis is empty")]
    EmptyBasis,
    #[error("dynamics have no components")]
    EmptyDynamics,
}

/// Flat-bound description of a barrier problem, as read from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IbcConfig {
    pub k_max: u32,
    pub initial_region: Vec<f64>,
    pub unsafe_region: Vec<f64>,
    pub state_space: Vec<f64>,
}

impl IbcConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }
}

/// A fully validated problem: regions checked against the dynamics'
/// dimension and a template basis over the same variables.
#[derive(Debug, Clone)]
pub struct IbcProblem {
    name: String,
    k_max: u32,
    dynamics: PolynomialMap,
    basis: MonomialBasis,
    initial: Region,
    unsafe_set: Region,
    state_space: Region,
}

impl IbcProblem {
    pub fn new(
        name: impl Into<String>,
        config: &IbcConfig,
        dynamics: PolynomialMap,
        basis: MonomialBasis,
    ) -> Result<Self, ConfigError> {
        let dim = dynamics.dim();
        if dim == 0 {
            return Err(ConfigError::EmptyDynamics);
        }
        if basis.is_empty() {
            return Err(ConfigError::EmptyBasis);
        }
        if basis.dim() != dim {
            return Err(ConfigError::BasisDimension {
                dynamics: dim,
                basis: basis.dim(),
            });
        }
        let initial = Region::from_flat(RegionKind::Initial, &config.initial_region)?;
        let unsafe_set = Region::from_flat(RegionKind::Unsafe, &config.unsafe_region)?;
        let state_space = Region::from_flat(RegionKind::StateSpace, &config.state_space)?;
        for region in [&initial, &unsafe_set, &state_space] {
            region.expect_dim(dim)?;
        }
        Ok(Self {
            name: name.into(),
            k_max: config.k_max,
            dynamics,
            basis,
            initial,
            unsafe_set,
            state_space,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn k_max(&self) -> u32 {
        self.k_max
    }

    pub fn dim(&self) -> usize {
        self.dynamics.dim()
    }

    pub fn dynamics(&self) -> &PolynomialMap {
        &self.dynamics
    }

    pub fn basis(&self) -> &MonomialBasis {
        &self.basis
    }

    pub fn initial(&self) -> &Region {
        &self.initial
    }

    pub fn unsafe_set(&self) -> &Region {
        &self.unsafe_set
    }

    pub fn state_space(&self) -> &Region {
        &self.state_space
    }

    /// Same problem with a different search bound.
    pub fn with_k_max(mut self, k_max: u32) -> Self {
        self.k_max = k_max;
        self
    }

    pub fn config(&self) -> IbcConfig {
        IbcConfig {
            k_max: self.k_max,
            initial_region: self.initial.to_flat(),
            unsafe_region: self.unsafe_set.to_flat(),
            state_space: self.state_space.to_flat(),
        }
    }
}
