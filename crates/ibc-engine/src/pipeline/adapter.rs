//! One satisfiability check of one encoding.

use ibc_smt::solver::{Model, SatResult, SmtSolver};
use ibc_smt::sorts::SmtSort;
use ibc_smt::terms::SmtTerm;

use crate::encoder::IbcEncoding;

#[derive(Debug, Clone)]
pub enum CheckOutcome {
    Satisfiable(Model),
    Unsatisfiable,
    Unknown(String),
}

/// Reset `solver`, submit the encoding's declarations and single assertion,
/// and check once. Timeouts come back as `Unknown`.
pub fn check_encoding<S: SmtSolver>(
    solver: &mut S,
    encoding: &IbcEncoding,
) -> Result<CheckOutcome, S::Error> {
    check_assertion(
        solver,
        &encoding.declarations,
        &encoding.assertion,
        &encoding.model_vars,
    )
}

pub(crate) fn check_assertion<S: SmtSolver>(
    solver: &mut S,
    declarations: &[(String, SmtSort)],
    assertion: &SmtTerm,
    model_vars: &[(String, SmtSort)],
) -> Result<CheckOutcome, S::Error> {
    solver.reset()?;
    for (name, sort) in declarations {
        solver.declare_var(name, sort)?;
    }
    solver.assert(assertion)?;
    let var_refs: Vec<(&str, &SmtSort)> = model_vars
        .iter()
        .map(|(n, s)| (n.as_str(), s))
        .collect();
    let (result, model) = solver.check_sat_with_model(&var_refs)?;
    Ok(match result {
        SatResult::Sat => CheckOutcome::Satisfiable(model.unwrap_or_default()),
        SatResult::Unsat => CheckOutcome::Unsatisfiable,
        SatResult::Unknown(reason) => CheckOutcome::Unknown(reason),
    })
}
