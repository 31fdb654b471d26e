//! Reads solved coefficients back out of a model.

use ibc_smt::solver::{Model, ModelValue};
use num::rational::BigRational;
use serde::Serialize;
use thiserror::Error;

use crate::numeric::rational_to_f64;
use crate::polynomial::MonomialBasis;
use crate::template::{CoeffKey, CoefficientTable, FixedChain, NumericChain};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("model has no value for `{name}` (certificate {certificate}, monomial {monomial})")]
    Missing {
        name: String,
        certificate: usize,
        monomial: usize,
    },
    #[error("model value for `{name}` is not a real number")]
    NotReal { name: String },
    #[error("coefficients have {found} entries per certificate, basis has {expected}")]
    BasisMismatch { expected: usize, found: usize },
}

/// Solved chain coefficients.
///
/// `certificates[i]` holds the coefficients of `B_i` with the highest-degree
/// monomial first, i.e. the basis order reversed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconstructedCoefficients {
    pub k: u32,
    pub certificates: Vec<Vec<f64>>,
    #[serde(skip)]
    exact: Vec<Vec<BigRational>>,
}

impl ReconstructedCoefficients {
    /// Exact values in basis order, as the solver returned them.
    pub fn exact(&self) -> &[Vec<BigRational>] {
        &self.exact
    }

    pub fn to_fixed_chain(&self, basis: &MonomialBasis) -> Result<FixedChain, ExtractError> {
        self.check_basis(basis)?;
        Ok(FixedChain::from_basis(basis, self.exact.clone()))
    }

    /// Numeric view of the chain over `basis`.
    pub fn chain<'a>(
        &'a self,
        basis: &'a MonomialBasis,
    ) -> Result<ReconstructedChain<'a>, ExtractError> {
        self.check_basis(basis)?;
        Ok(ReconstructedChain {
            coefficients: self,
            basis,
        })
    }

    fn check_basis(&self, basis: &MonomialBasis) -> Result<(), ExtractError> {
        match self.certificates.iter().find(|c| c.len() != basis.len()) {
            Some(c) => Err(ExtractError::BasisMismatch {
                expected: basis.len(),
                found: c.len(),
            }),
            None => Ok(()),
        }
    }
}

pub struct ReconstructedChain<'a> {
    coefficients: &'a ReconstructedCoefficients,
    basis: &'a MonomialBasis,
}

impl NumericChain for ReconstructedChain<'_> {
    fn certificate_count(&self) -> usize {
        self.coefficients.certificates.len()
    }

    fn eval(&self, index: usize, point: &[f64]) -> f64 {
        let Some(highest_first) = self.coefficients.certificates.get(index) else {
            return f64::NAN;
        };
        let basis_order: Vec<f64> = highest_first.iter().rev().copied().collect();
        self.basis.combine(&basis_order, point)
    }
}

/// Look up every entry of `table` in `model` by key.
pub fn extract_coefficients(
    model: &Model,
    table: &CoefficientTable,
) -> Result<ReconstructedCoefficients, ExtractError> {
    let mut exact = Vec::with_capacity(table.certificates());
    for certificate in 0..table.certificates() {
        let mut coeffs = Vec::with_capacity(table.monomials());
        for monomial in 0..table.monomials() {
            let key = CoeffKey {
                certificate,
                monomial,
            };
            let name = table.name(key).unwrap_or_default();
            match model.values.get(name) {
                Some(ModelValue::Real(value)) => coeffs.push(value.clone()),
                Some(ModelValue::Bool(_)) => {
                    return Err(ExtractError::NotReal {
                        name: name.to_string(),
                    })
                }
                None => {
                    return Err(ExtractError::Missing {
                        name: name.to_string(),
                        certificate,
                        monomial,
                    })
                }
            }
        }
        exact.push(coeffs);
    }
    let certificates = exact
        .iter()
        .map(|coeffs| coeffs.iter().rev().map(rational_to_f64).collect())
        .collect();
    Ok(ReconstructedCoefficients {
        k: table.k(),
        certificates,
        exact,
    })
}
