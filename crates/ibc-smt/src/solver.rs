use std::collections::HashMap;

use num::rational::BigRational;

use crate::sorts::SmtSort;
use crate::terms::SmtTerm;

/// Result of a satisfiability check.
#[derive(Debug, Clone, PartialEq)]
pub enum SatResult {
    Sat,
    Unsat,
    Unknown(String),
}

/// A model (variable assignments) extracted from a SAT result.
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub values: HashMap<String, ModelValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelValue {
    Real(BigRational),
    Bool(bool),
}

impl Model {
    pub fn get_real(&self, name: &str) -> Option<&BigRational> {
        match self.values.get(name) {
            Some(ModelValue::Real(r)) => Some(r),
            _ => None,
        }
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        match self.values.get(name) {
            Some(ModelValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }
}

/// Abstract SMT solver interface.
///
/// A solver context answers one `check_sat`/`check_sat_with_model` per
/// `reset`; callers that need an independent answer must reset (or build a
/// fresh instance) first.
pub trait SmtSolver {
    type Error: std::error::Error;

    /// Declare a new free variable.
    fn declare_var(&mut self, name: &str, sort: &SmtSort) -> Result<(), Self::Error>;

    /// Assert a constraint.
    fn assert(&mut self, term: &SmtTerm) -> Result<(), Self::Error>;

    /// Check satisfiability.
    fn check_sat(&mut self) -> Result<SatResult, Self::Error>;

    /// Check satisfiability and extract a model if SAT.
    fn check_sat_with_model(
        &mut self,
        var_names: &[(&str, &SmtSort)],
    ) -> Result<(SatResult, Option<Model>), Self::Error>;

    /// Reset the solver state.
    fn reset(&mut self) -> Result<(), Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use num::bigint::BigInt;
    use std::io;

    struct MockSolver {
        sat_result: SatResult,
        asserted: Vec<SmtTerm>,
        reset_calls: usize,
    }

    impl SmtSolver for MockSolver {
        type Error = io::Error;

        fn declare_var(&mut self, _name: &str, _sort: &SmtSort) -> Result<(), Self::Error> {
            Ok(())
        }

        fn assert(&mut self, term: &SmtTerm) -> Result<(), Self::Error> {
            self.asserted.push(term.clone());
            Ok(())
        }

        fn check_sat(&mut self) -> Result<SatResult, Self::Error> {
            Ok(self.sat_result.clone())
        }

        fn check_sat_with_model(
            &mut self,
            _var_names: &[(&str, &SmtSort)],
        ) -> Result<(SatResult, Option<Model>), Self::Error> {
            Ok((self.sat_result.clone(), None))
        }

        fn reset(&mut self) -> Result<(), Self::Error> {
            self.reset_calls += 1;
            self.asserted.clear();
            Ok(())
        }
    }

    #[test]
    fn model_getters_return_typed_values_only() {
        let mut values = HashMap::new();
        let half = BigRational::new(BigInt::from(1), BigInt::from(2));
        values.insert("c".to_string(), ModelValue::Real(half.clone()));
        values.insert("flag".to_string(), ModelValue::Bool(true));
        let model = Model { values };

        assert_eq!(model.get_real("c"), Some(&half));
        assert_eq!(model.get_bool("flag"), Some(true));
        assert_eq!(model.get_real("flag"), None);
        assert_eq!(model.get_bool("c"), None);
        assert_eq!(model.get_real("missing"), None);
    }

    #[test]
    fn reset_clears_assertions() {
        let mut solver = MockSolver {
            sat_result: SatResult::Unknown("timeout".to_string()),
            asserted: Vec::new(),
            reset_calls: 0,
        };
        solver.assert(&SmtTerm::bool(true)).expect("assert");
        assert_eq!(solver.asserted.len(), 1);
        assert_eq!(
            solver.check_sat().expect("check"),
            SatResult::Unknown("timeout".to_string())
        );

        solver.reset().expect("reset should succeed");
        assert_eq!(solver.reset_calls, 1);
        assert!(solver.asserted.is_empty());
    }
}
