//! Multivariate polynomials with exact coefficients, monomial bases for
//! templates, and polynomial dynamics.

use num::rational::BigRational;
use num::traits::Zero;
use serde::Serialize;

use crate::numeric::Scalar;

/// Power product `x0^e0 * x1^e1 * ...`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Monomial {
    exponents: Vec<u32>,
}

impl Monomial {
    pub fn new(exponents: Vec<u32>) -> Self {
        Self { exponents }
    }

    pub fn constant(dim: usize) -> Self {
        Self {
            exponents: vec![0; dim],
        }
    }

    pub fn dim(&self) -> usize {
        self.exponents.len()
    }

    pub fn degree(&self) -> u32 {
        self.exponents.iter().sum()
    }

    pub fn exponents(&self) -> &[u32] {
        &self.exponents
    }

    /// `coeff * monomial(state)`. The constant monomial returns `coeff` as is,
    /// which keeps symbolic terms free of `* 1` factors.
    pub fn scale<S: Scalar>(&self, coeff: S, state: &[S]) -> S {
        let mut acc = coeff;
        for (var, &exp) in state.iter().zip(&self.exponents) {
            for _ in 0..exp {
                acc = acc.times(var);
            }
        }
        acc
    }

    pub fn label(&self, var_names: &[&str]) -> String {
        let factors: Vec<String> = self
            .exponents
            .iter()
            .enumerate()
            .filter(|&(_, &e)| e > 0)
            .map(|(i, &e)| {
                let name = var_names.get(i).copied().unwrap_or("x");
                if e == 1 {
                    name.to_string()
                } else {
                    format!("{name}^{e}")
                }
            })
            .collect();
        if factors.is_empty() {
            "1".to_string()
        } else {
            factors.join("*")
        }
    }
}

/// Ordered monomial basis of a barrier template, lowest degree first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonomialBasis {
    dim: usize,
    monomials: Vec<Monomial>,
}

impl MonomialBasis {
    /// All monomials in `dim` variables of total degree at most `max_degree`,
    /// graded by degree, and within a degree by decreasing power of `x0`.
    ///
    /// For `dim = 1` this is `1, x, x^2, ...`.
    pub fn full(dim: usize, max_degree: u32) -> Self {
        let mut monomials = Vec::new();
        for degree in 0..=max_degree {
            let mut current = vec![0u32; dim];
            push_compositions(degree, 0, &mut current, &mut monomials);
        }
        Self { dim, monomials }
    }

    pub fn from_monomials(dim: usize, monomials: Vec<Monomial>) -> Self {
        Self { dim, monomials }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.monomials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub fn monomials(&self) -> &[Monomial] {
        &self.monomials
    }

    /// `sum_j coeffs[j] * monomials[j](state)` with coefficients in basis order.
    pub fn combine<S: Scalar>(&self, coeffs: &[S], state: &[S]) -> S {
        let mut terms = self
            .monomials
            .iter()
            .zip(coeffs)
            .map(|(m, c)| m.scale(c.clone(), state));
        match terms.next() {
            Some(first) => terms.fold(first, |acc, t| acc.plus(&t)),
            None => S::constant(&BigRational::zero()),
        }
    }
}

fn push_compositions(remaining: u32, index: usize, current: &mut Vec<u32>, out: &mut Vec<Monomial>) {
    if index + 1 >= current.len() {
        if let Some(last) = current.len().checked_sub(1) {
            current[last] = remaining;
            out.push(Monomial::new(current.clone()));
            current[last] = 0;
        } else if remaining == 0 {
            out.push(Monomial::new(Vec::new()));
        }
        return;
    }
    for e in (0..=remaining).rev() {
        current[index] = e;
        push_compositions(remaining - e, index + 1, current, out);
    }
    current[index] = 0;
}

/// Polynomial with exact rational coefficients.
#[derive(Debug, Clone, PartialEq)]
pub struct Polynomial {
    dim: usize,
    terms: Vec<(BigRational, Monomial)>,
}

impl Polynomial {
    pub fn new(dim: usize, terms: Vec<(BigRational, Monomial)>) -> Self {
        Self { dim, terms }
    }

    /// Coefficients given in basis order.
    pub fn from_basis(basis: &MonomialBasis, coeffs: Vec<BigRational>) -> Self {
        let terms = coeffs
            .into_iter()
            .zip(basis.monomials().iter().cloned())
            .collect();
        Self {
            dim: basis.dim(),
            terms,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn terms(&self) -> &[(BigRational, Monomial)] {
        &self.terms
    }

    pub fn eval<S: Scalar>(&self, state: &[S]) -> S {
        let mut terms = self
            .terms
            .iter()
            .map(|(c, m)| m.scale(S::constant(c), state));
        match terms.next() {
            Some(first) => terms.fold(first, |acc, t| acc.plus(&t)),
            None => S::constant(&BigRational::zero()),
        }
    }

    /// Copy with the coefficient of `monomial` negated.
    pub fn with_negated_term(&self, monomial: &Monomial) -> Self {
        let terms = self
            .terms
            .iter()
            .map(|(c, m)| if m == monomial { (-c.clone(), m.clone()) } else { (c.clone(), m.clone()) })
            .collect();
        Self {
            dim: self.dim,
            terms,
        }
    }
}

/// One-step dynamics `x -> f(x)`, one polynomial per state component.
#[derive(Debug, Clone, PartialEq)]
pub struct PolynomialMap {
    components: Vec<Polynomial>,
}

impl PolynomialMap {
    pub fn new(components: Vec<Polynomial>) -> Self {
        Self { components }
    }

    pub fn dim(&self) -> usize {
        self.components.len()
    }

    pub fn components(&self) -> &[Polynomial] {
        &self.components
    }

    pub fn apply<S: Scalar>(&self, state: &[S]) -> Vec<S> {
        self.components.iter().map(|p| p.eval(state)).collect()
    }
}
