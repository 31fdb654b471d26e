//! Shared arithmetic over symbolic terms and floating point samples.
//!
//! Dynamics and barrier polynomials are written once against [`Scalar`] and
//! evaluated either into an [`SmtTerm`] (for the solver) or into an `f64`
//! (for sanity checks and plotting).

use ibc_smt::backends::smtlib_values::parse_decimal;
use ibc_smt::terms::SmtTerm;
use num::bigint::BigInt;
use num::rational::BigRational;
use num::traits::ToPrimitive;

pub trait Scalar: Clone {
    fn constant(value: &BigRational) -> Self;
    fn plus(&self, other: &Self) -> Self;
    fn times(&self, other: &Self) -> Self;
}

impl Scalar for f64 {
    fn constant(value: &BigRational) -> Self {
        rational_to_f64(value)
    }

    fn plus(&self, other: &Self) -> Self {
        self + other
    }

    fn times(&self, other: &Self) -> Self {
        self * other
    }
}

impl Scalar for SmtTerm {
    fn constant(value: &BigRational) -> Self {
        SmtTerm::real(value.clone())
    }

    fn plus(&self, other: &Self) -> Self {
        self.clone().add(other.clone())
    }

    fn times(&self, other: &Self) -> Self {
        self.clone().mul(other.clone())
    }
}

pub fn ratio(num: i64, den: i64) -> BigRational {
    BigRational::new(BigInt::from(num), BigInt::from(den))
}

/// Exact rational for the shortest decimal spelling of `value`, so `2.3`
/// becomes `23/10` rather than the nearest binary fraction.
pub fn rational_from_f64(value: f64) -> Option<BigRational> {
    if !value.is_finite() {
        return None;
    }
    parse_decimal(&value.to_string())
}

/// Nearest `f64` to an exact rational.
pub fn rational_to_f64(value: &BigRational) -> f64 {
    value.to_f64().unwrap_or_else(|| {
        let num = value.numer().to_f64().unwrap_or(f64::NAN);
        let den = value.denom().to_f64().unwrap_or(f64::NAN);
        num / den
    })
}

/// Horner evaluation of a highest-degree-first coefficient sequence.
pub fn polyval(coefficients: &[f64], x: f64) -> f64 {
    coefficients.iter().fold(0.0, |acc, c| acc * x + c)
}

/// `count` evenly spaced points from `low` to `high` inclusive.
pub fn linspace(low: f64, high: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![low],
        _ => {
            let step = (high - low) / (count - 1) as f64;
            (0..count)
                .map(|i| if i + 1 == count { high } else { low + step * i as f64 })
                .collect()
        }
    }
}
