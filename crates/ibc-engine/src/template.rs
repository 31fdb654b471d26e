//! Barrier templates: chains with symbolic (solver-chosen) or fixed
//! coefficients, and the per-attempt coefficient table.

use std::fmt;

use ibc_smt::sorts::SmtSort;
use ibc_smt::terms::SmtTerm;
use num::rational::BigRational;

use crate::polynomial::{MonomialBasis, Polynomial};

/// Position of one free coefficient: certificate `B_i`, basis monomial `j`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoeffKey {
    pub certificate: usize,
    pub monomial: usize,
}

/// Free coefficient variables of one search attempt.
///
/// Entries are stored certificate-major, monomial-minor. Names embed the
/// chain length so tables of different attempts never collide.
#[derive(Debug, Clone)]
pub struct CoefficientTable {
    k: u32,
    monomials: usize,
    names: Vec<String>,
}

impl CoefficientTable {
    pub fn new(k: u32, monomials: usize) -> Self {
        let certificates = k as usize + 1;
        let mut names = Vec::with_capacity(certificates * monomials);
        for certificate in 0..certificates {
            for monomial in 0..monomials {
                names.push(coefficient_name(k, CoeffKey { certificate, monomial }));
            }
        }
        Self { k, monomials, names }
    }

    pub fn k(&self) -> u32 {
        self.k
    }

    pub fn certificates(&self) -> usize {
        self.k as usize + 1
    }

    pub fn monomials(&self) -> usize {
        self.monomials
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, key: CoeffKey) -> Option<&str> {
        if key.certificate >= self.certificates() || key.monomial >= self.monomials {
            return None;
        }
        self.names
            .get(key.certificate * self.monomials + key.monomial)
            .map(String::as_str)
    }

    pub fn entries(&self) -> impl Iterator<Item = (CoeffKey, &str)> + '_ {
        self.names.iter().enumerate().map(move |(i, name)| {
            (
                CoeffKey {
                    certificate: i / self.monomials.max(1),
                    monomial: i % self.monomials.max(1),
                },
                name.as_str(),
            )
        })
    }

    pub fn declarations(&self) -> Vec<(String, SmtSort)> {
        self.names
            .iter()
            .map(|name| (name.clone(), SmtSort::Real))
            .collect()
    }

    /// Coefficient variables of certificate `B_i`, in basis order.
    pub fn certificate_vars(&self, certificate: usize) -> Vec<SmtTerm> {
        let start = certificate * self.monomials;
        self.names
            .get(start..start + self.monomials)
            .unwrap_or_default()
            .iter()
            .map(|name| SmtTerm::var(name.clone()))
            .collect()
    }
}

fn coefficient_name(k: u32, key: CoeffKey) -> String {
    format!("c_k{:02}_b{:03}_m{:03}", k, key.certificate, key.monomial)
}

/// A chain `B_0..B_k` whose members can be instantiated as solver terms.
pub trait BarrierChain {
    /// Number of certificates, `k + 1`.
    fn len(&self) -> usize;

    fn barrier(&self, index: usize, state: &[SmtTerm]) -> SmtTerm;
}

/// A chain whose members can be evaluated at concrete points.
pub trait NumericChain {
    fn certificate_count(&self) -> usize;

    fn eval(&self, index: usize, point: &[f64]) -> f64;
}

/// Template whose coefficients are the free variables of a [`CoefficientTable`].
pub struct SymbolicChain<'a> {
    basis: &'a MonomialBasis,
    table: &'a CoefficientTable,
}

impl<'a> SymbolicChain<'a> {
    pub fn new(basis: &'a MonomialBasis, table: &'a CoefficientTable) -> Self {
        Self { basis, table }
    }
}

impl BarrierChain for SymbolicChain<'_> {
    fn len(&self) -> usize {
        self.table.certificates()
    }

    fn barrier(&self, index: usize, state: &[SmtTerm]) -> SmtTerm {
        self.basis
            .combine(&self.table.certificate_vars(index), state)
    }
}

/// Chain with known exact coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedChain {
    certificates: Vec<Polynomial>,
}

impl FixedChain {
    pub fn new(certificates: Vec<Polynomial>) -> Self {
        Self { certificates }
    }

    /// One coefficient vector per certificate, each in basis order.
    pub fn from_basis(basis: &MonomialBasis, coefficients: Vec<Vec<BigRational>>) -> Self {
        Self {
            certificates: coefficients
                .into_iter()
                .map(|coeffs| Polynomial::from_basis(basis, coeffs))
                .collect(),
        }
    }

    pub fn certificates(&self) -> &[Polynomial] {
        &self.certificates
    }

    pub fn k(&self) -> u32 {
        self.certificates.len().saturating_sub(1) as u32
    }

    pub fn map_certificate(
        mut self,
        index: usize,
        f: impl FnOnce(&Polynomial) -> Polynomial,
    ) -> Self {
        if let Some(cert) = self.certificates.get_mut(index) {
            *cert = f(cert);
        }
        self
    }
}

impl BarrierChain for FixedChain {
    fn len(&self) -> usize {
        self.certificates.len()
    }

    fn barrier(&self, index: usize, state: &[SmtTerm]) -> SmtTerm {
        match self.certificates.get(index) {
            Some(p) => p.eval(state),
            None => SmtTerm::real_int(0),
        }
    }
}

impl NumericChain for FixedChain {
    fn certificate_count(&self) -> usize {
        self.certificates.len()
    }

    fn eval(&self, index: usize, point: &[f64]) -> f64 {
        self.certificates
            .get(index)
            .map_or(f64::NAN, |p| p.eval(point))
    }
}

impl fmt::Display for FixedChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, cert) in self.certificates.iter().enumerate() {
            let names: Vec<String> = (0..cert.dim()).map(|d| format!("x{d}")).collect();
            let names: Vec<&str> = names.iter().map(String::as_str).collect();
            let terms: Vec<String> = cert
                .terms()
                .iter()
                .map(|(c, m)| format!("({c})*{}", m.label(&names)))
                .collect();
            writeln!(f, "B_{i}(x) = {}", terms.join(" + "))?;
        }
        Ok(())
    }
}
