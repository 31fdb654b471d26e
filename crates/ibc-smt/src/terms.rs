use num::bigint::BigInt;
use num::rational::BigRational;

use crate::sorts::SmtSort;

/// Abstract SMT term representation, solver-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub enum SmtTerm {
    /// Variable reference by name (free or bound by an enclosing quantifier).
    Var(String),
    /// Exact rational literal of sort `Real`.
    RealLit(BigRational),
    /// Boolean literal.
    BoolLit(bool),

    // Arithmetic
    Add(Box<SmtTerm>, Box<SmtTerm>),
    Mul(Box<SmtTerm>, Box<SmtTerm>),

    // Comparison
    Eq(Box<SmtTerm>, Box<SmtTerm>),
    Lt(Box<SmtTerm>, Box<SmtTerm>),
    Le(Box<SmtTerm>, Box<SmtTerm>),
    Gt(Box<SmtTerm>, Box<SmtTerm>),
    Ge(Box<SmtTerm>, Box<SmtTerm>),

    // Boolean logic
    And(Vec<SmtTerm>),
    Implies(Box<SmtTerm>, Box<SmtTerm>),

    /// Universal quantifier over the listed bound variables.
    ForAll(Vec<(String, SmtSort)>, Box<SmtTerm>),
}

#[allow(clippy::should_implement_trait)]
impl SmtTerm {
    pub fn var(name: impl Into<String>) -> Self {
        SmtTerm::Var(name.into())
    }

    pub fn real(value: BigRational) -> Self {
        SmtTerm::RealLit(value)
    }

    /// Integral real literal.
    pub fn real_int(n: i64) -> Self {
        SmtTerm::RealLit(BigRational::from_integer(BigInt::from(n)))
    }

    /// Rational literal `num / den`. `den` must be non-zero.
    pub fn real_ratio(num: i64, den: i64) -> Self {
        SmtTerm::RealLit(BigRational::new(BigInt::from(num), BigInt::from(den)))
    }

    pub fn bool(b: bool) -> Self {
        SmtTerm::BoolLit(b)
    }

    pub fn add(self, other: SmtTerm) -> Self {
        SmtTerm::Add(Box::new(self), Box::new(other))
    }

    pub fn mul(self, other: SmtTerm) -> Self {
        SmtTerm::Mul(Box::new(self), Box::new(other))
    }

    pub fn eq(self, other: SmtTerm) -> Self {
        SmtTerm::Eq(Box::new(self), Box::new(other))
    }

    pub fn lt(self, other: SmtTerm) -> Self {
        SmtTerm::Lt(Box::new(self), Box::new(other))
    }

    pub fn le(self, other: SmtTerm) -> Self {
        SmtTerm::Le(Box::new(self), Box::new(other))
    }

    pub fn gt(self, other: SmtTerm) -> Self {
        SmtTerm::Gt(Box::new(self), Box::new(other))
    }

    pub fn ge(self, other: SmtTerm) -> Self {
        SmtTerm::Ge(Box::new(self), Box::new(other))
    }

    pub fn and(terms: Vec<SmtTerm>) -> Self {
        SmtTerm::And(terms)
    }

    pub fn implies(self, other: SmtTerm) -> Self {
        SmtTerm::Implies(Box::new(self), Box::new(other))
    }

    /// `forall (vars: Real). body`
    pub fn forall_reals(vars: &[String], body: SmtTerm) -> Self {
        let bindings = vars
            .iter()
            .map(|name| (name.clone(), SmtSort::Real))
            .collect();
        SmtTerm::ForAll(bindings, Box::new(body))
    }

    /// Names of the free variables of this term, in first-occurrence order.
    pub fn free_vars(&self) -> Vec<String> {
        let mut bound: Vec<String> = Vec::new();
        let mut out: Vec<String> = Vec::new();
        collect_free_vars(self, &mut bound, &mut out);
        out
    }
}

fn collect_free_vars(term: &SmtTerm, bound: &mut Vec<String>, out: &mut Vec<String>) {
    match term {
        SmtTerm::Var(name) => {
            if !bound.contains(name) && !out.contains(name) {
                out.push(name.clone());
            }
        }
        SmtTerm::RealLit(_) | SmtTerm::BoolLit(_) => {}
        SmtTerm::Add(l, r)
        | SmtTerm::Mul(l, r)
        | SmtTerm::Eq(l, r)
        | SmtTerm::Lt(l, r)
        | SmtTerm::Le(l, r)
        | SmtTerm::Gt(l, r)
        | SmtTerm::Ge(l, r)
        | SmtTerm::Implies(l, r) => {
            collect_free_vars(l, bound, out);
            collect_free_vars(r, bound, out);
        }
        SmtTerm::And(terms) => {
            for t in terms {
                collect_free_vars(t, bound, out);
            }
        }
        SmtTerm::ForAll(bindings, body) => {
            let before = bound.len();
            bound.extend(bindings.iter().map(|(name, _)| name.clone()));
            collect_free_vars(body, bound, out);
            bound.truncate(before);
        }
    }
}
