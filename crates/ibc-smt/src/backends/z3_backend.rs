use std::collections::HashMap;

use num::rational::BigRational;
use num::traits::ToPrimitive;
use thiserror::Error;
use z3::ast::Ast;
use z3::SatResult as Z3SatResult;

use crate::backends::smtlib_values::parse_real_value;
use crate::solver::{Model, ModelValue, SatResult, SmtSolver};
use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

#[derive(Debug, Error)]
pub enum Z3Error {
    #[error("Z3 error: {0}")]
    Internal(String),
    #[error("Unknown variable: {0}")]
    UnknownVariable(String),
    #[error("Numeral out of range: {0}")]
    NumeralOutOfRange(String),
}

pub struct Z3Solver {
    solver: z3::Solver,
    real_vars: HashMap<String, z3::ast::Real>,
    bool_vars: HashMap<String, z3::ast::Bool>,
    _params: Option<z3::Params>,
}

impl Z3Solver {
    pub fn new() -> Self {
        let solver = z3::Solver::new();
        Self {
            solver,
            real_vars: HashMap::new(),
            bool_vars: HashMap::new(),
            _params: None,
        }
    }

    /// Solver whose `check` gives up with `unknown` after `timeout_secs`.
    /// Zero means no limit.
    pub fn with_timeout_secs(timeout_secs: u64) -> Self {
        if timeout_secs == 0 {
            return Self::new();
        }
        let solver = z3::Solver::new();
        let mut params = z3::Params::new();
        let timeout_ms = timeout_secs.saturating_mul(1000).min(u64::from(u32::MAX));
        params.set_u32("timeout", timeout_ms as u32);
        solver.set_params(&params);
        Self {
            solver,
            real_vars: HashMap::new(),
            bool_vars: HashMap::new(),
            _params: Some(params),
        }
    }

    pub fn with_default_config() -> Self {
        Self::new()
    }

    fn real_numeral(value: &BigRational) -> Result<z3::ast::Real, Z3Error> {
        let out_of_range = || Z3Error::NumeralOutOfRange(value.to_string());
        let num = value.numer().to_i64().ok_or_else(out_of_range)?;
        let den = value.denom().to_i64().ok_or_else(out_of_range)?;
        let num = z3::ast::Real::from_int(&z3::ast::Int::from_i64(num));
        if den == 1 {
            return Ok(num);
        }
        let den = z3::ast::Real::from_int(&z3::ast::Int::from_i64(den));
        Ok(&num / &den)
    }

    /// `bound` holds quantifier-bound constants, innermost last.
    fn translate_term(
        &self,
        term: &SmtTerm,
        bound: &mut Vec<(String, z3::ast::Real)>,
    ) -> Result<Z3Term, Z3Error> {
        match term {
            SmtTerm::Var(name) => {
                if let Some((_, v)) = bound.iter().rev().find(|(n, _)| n == name) {
                    Ok(Z3Term::Real(v.clone()))
                } else if let Some(v) = self.real_vars.get(name) {
                    Ok(Z3Term::Real(v.clone()))
                } else if let Some(v) = self.bool_vars.get(name) {
                    Ok(Z3Term::Bool(v.clone()))
                } else {
                    Err(Z3Error::UnknownVariable(name.clone()))
                }
            }
            SmtTerm::RealLit(r) => Ok(Z3Term::Real(Self::real_numeral(r)?)),
            SmtTerm::BoolLit(b) => Ok(Z3Term::Bool(z3::ast::Bool::from_bool(*b))),
            SmtTerm::Add(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Real(&l + &r))
            }
            SmtTerm::Mul(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Real(&l * &r))
            }
            SmtTerm::Eq(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?;
                let r = self.translate_term(rhs, bound)?;
                match (l, r) {
                    (Z3Term::Real(lr), Z3Term::Real(rr)) => Ok(Z3Term::Bool(lr.eq(&rr))),
                    (Z3Term::Bool(lb), Z3Term::Bool(rb)) => Ok(Z3Term::Bool(lb.eq(&rb))),
                    _ => Err(Z3Error::Internal("Sort mismatch in Eq".into())),
                }
            }
            SmtTerm::Lt(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Bool(l.lt(&r)))
            }
            SmtTerm::Le(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Bool(l.le(&r)))
            }
            SmtTerm::Gt(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Bool(l.gt(&r)))
            }
            SmtTerm::Ge(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_real()?;
                let r = self.translate_term(rhs, bound)?.into_real()?;
                Ok(Z3Term::Bool(l.ge(&r)))
            }
            SmtTerm::And(terms) => {
                let mut bools = Vec::with_capacity(terms.len());
                for t in terms {
                    bools.push(self.translate_term(t, bound)?.into_bool()?);
                }
                let refs: Vec<&z3::ast::Bool> = bools.iter().collect();
                Ok(Z3Term::Bool(z3::ast::Bool::and(&refs)))
            }
            SmtTerm::Implies(lhs, rhs) => {
                let l = self.translate_term(lhs, bound)?.into_bool()?;
                let r = self.translate_term(rhs, bound)?.into_bool()?;
                Ok(Z3Term::Bool(l.implies(&r)))
            }
            SmtTerm::ForAll(bindings, body) => {
                let scope_start = bound.len();
                for (name, sort) in bindings {
                    match sort {
                        SmtSort::Real => {
                            bound.push((name.clone(), z3::ast::Real::new_const(name.as_str())));
                        }
                        SmtSort::Bool => {
                            return Err(Z3Error::Internal(
                                "Boolean quantifier bindings are not supported".into(),
                            ));
                        }
                    }
                }
                let body = self.translate_term(body, bound);
                let consts: Vec<z3::ast::Real> =
                    bound.drain(scope_start..).map(|(_, c)| c).collect();
                let body = body?.into_bool()?;
                let bound_refs: Vec<&dyn Ast> = consts.iter().map(|c| c as &dyn Ast).collect();
                Ok(Z3Term::Bool(z3::ast::forall_const(&bound_refs, &[], &body)))
            }
        }
    }
}

enum Z3Term {
    Real(z3::ast::Real),
    Bool(z3::ast::Bool),
}

impl Z3Term {
    fn into_real(self) -> Result<z3::ast::Real, Z3Error> {
        match self {
            Z3Term::Real(r) => Ok(r),
            Z3Term::Bool(_) => Err(Z3Error::Internal("Expected Real, got Bool".into())),
        }
    }

    fn into_bool(self) -> Result<z3::ast::Bool, Z3Error> {
        match self {
            Z3Term::Bool(b) => Ok(b),
            Z3Term::Real(_) => Err(Z3Error::Internal("Expected Bool, got Real".into())),
        }
    }
}

impl Default for Z3Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl SmtSolver for Z3Solver {
    type Error = Z3Error;

    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Z3Error> {
        match sort {
            SmtSort::Real => {
                let v = z3::ast::Real::new_const(name);
                self.real_vars.insert(name.to_string(), v);
            }
            SmtSort::Bool => {
                let v = z3::ast::Bool::new_const(name);
                self.bool_vars.insert(name.to_string(), v);
            }
        }
        Ok(())
    }

    fn assert(&mut self, term: &SmtTerm) -> Result<(), Z3Error> {
        let mut bound = Vec::new();
        let z3_term = self.translate_term(term, &mut bound)?.into_bool()?;
        self.solver.assert(&z3_term);
        Ok(())
    }

    fn check_sat(&mut self) -> Result<SatResult, Z3Error> {
        match self.solver.check() {
            Z3SatResult::Sat => Ok(SatResult::Sat),
            Z3SatResult::Unsat => Ok(SatResult::Unsat),
            Z3SatResult::Unknown => Ok(SatResult::Unknown("Z3 returned unknown".into())),
        }
    }

    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Z3Error> {
        match self.solver.check() {
            Z3SatResult::Sat => {
                let z3_model = self
                    .solver
                    .get_model()
                    .ok_or_else(|| Z3Error::Internal("SAT but no model available".into()))?;
                let mut values = HashMap::new();

                for &(name, sort) in var_names {
                    match sort {
                        SmtSort::Real => {
                            if let Some(v) = self.real_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::Real>(v, true) {
                                    let value = parse_real_value(&val.to_string())
                                        .map_err(|e| Z3Error::Internal(e.to_string()))?;
                                    values.insert(name.to_string(), ModelValue::Real(value));
                                }
                            }
                        }
                        SmtSort::Bool => {
                            if let Some(v) = self.bool_vars.get(name) {
                                if let Some(val) = z3_model.eval::<z3::ast::Bool>(v, true) {
                                    if let Some(b) = val.as_bool() {
                                        values.insert(name.to_string(), ModelValue::Bool(b));
                                    }
                                }
                            }
                        }
                    }
                }

                Ok((SatResult::Sat, Some(Model { values })))
            }
            Z3SatResult::Unsat => Ok((SatResult::Unsat, None)),
            Z3SatResult::Unknown => Ok((SatResult::Unknown("Z3 returned unknown".into()), None)),
        }
    }

    fn reset(&mut self) -> Result<(), Z3Error> {
        self.solver.reset();
        // Z3 may drop per-solver parameters on reset; reapply timeout if configured.
        if let Some(params) = &self._params {
            self.solver.set_params(params);
        }
        self.real_vars.clear();
        self.bool_vars.clear();
        Ok(())
    }
}
