//! Checking chains whose coefficients are already known.

use std::time::Instant;

use ibc_smt::solver::SmtSolver;
use tracing::info;

use super::adapter::{check_assertion, check_encoding, CheckOutcome};
use super::timeout::{attempt_timeout_secs, deadline_from_timeout_secs, timeout_unknown_reason};
use super::{with_solver_factory, IbcError, SearchOptions};
use crate::config::IbcProblem;
use crate::encoder::{encode_fixed, ConditionKind};
use crate::result::{ConditionReport, VerificationReport, VerificationVerdict};
use crate::template::FixedChain;

fn verdict_of(outcome: CheckOutcome) -> VerificationVerdict {
    match outcome {
        CheckOutcome::Satisfiable(_) => VerificationVerdict::Holds,
        CheckOutcome::Unsatisfiable => VerificationVerdict::Violated,
        CheckOutcome::Unknown(reason) => VerificationVerdict::Unknown { reason },
    }
}

pub fn verify_chain(
    problem: &IbcProblem,
    chain: &FixedChain,
    options: &SearchOptions,
) -> Result<VerificationReport, IbcError> {
    with_solver_factory!(options.solver, factory => verify_chain_with(problem, chain, options, factory))
}

/// Check all four conditions of `chain` at once. The encoding has no free
/// variables, so satisfiable means the chain is a valid IBC.
pub fn verify_chain_with<S, F>(
    problem: &IbcProblem,
    chain: &FixedChain,
    options: &SearchOptions,
    mut make_solver: F,
) -> Result<VerificationReport, IbcError>
where
    S: SmtSolver,
    F: FnMut(u64) -> Result<S, S::Error>,
{
    let encoding = encode_fixed(problem, chain);
    let deadline = deadline_from_timeout_secs(options.overall_timeout_secs);
    let timeout = attempt_timeout_secs(options.attempt_timeout_secs, deadline).unwrap_or_default();
    info!(system = problem.name(), k = chain.k(), "verifying fixed chain");
    let start = Instant::now();
    let outcome = make_solver(timeout)
        .and_then(|mut solver| check_encoding(&mut solver, &encoding))
        .map_err(|e| IbcError::Solver(e.to_string()))?;
    let elapsed_ms = start.elapsed().as_millis() as u64;
    let verdict = verdict_of(outcome);
    info!(elapsed_ms, "status: {verdict}");
    Ok(VerificationReport {
        system: problem.name().to_string(),
        k: chain.k(),
        verdict,
        elapsed_ms,
        conditions: Vec::new(),
    })
}

pub fn diagnose_conditions(
    problem: &IbcProblem,
    chain: &FixedChain,
    options: &SearchOptions,
) -> Result<Vec<ConditionReport>, IbcError> {
    with_solver_factory!(options.solver, factory => diagnose_conditions_with(problem, chain, options, factory))
}

/// Check each condition of `chain` on its own, each with a fresh solver.
/// The overall deadline, if any, spans all four checks.
pub fn diagnose_conditions_with<S, F>(
    problem: &IbcProblem,
    chain: &FixedChain,
    options: &SearchOptions,
    mut make_solver: F,
) -> Result<Vec<ConditionReport>, IbcError>
where
    S: SmtSolver,
    F: FnMut(u64) -> Result<S, S::Error>,
{
    let encoding = encode_fixed(problem, chain);
    let deadline = deadline_from_timeout_secs(options.overall_timeout_secs);
    let mut reports = Vec::with_capacity(ConditionKind::ALL.len());

    for condition in ConditionKind::ALL {
        let Some(timeout) = attempt_timeout_secs(options.attempt_timeout_secs, deadline) else {
            reports.push(ConditionReport {
                condition,
                verdict: VerificationVerdict::Unknown {
                    reason: timeout_unknown_reason(&condition.to_string()),
                },
                elapsed_ms: 0,
            });
            continue;
        };
        let term = encoding.conditions.get(condition);
        let start = Instant::now();
        let outcome = make_solver(timeout)
            .and_then(|mut solver| check_assertion(&mut solver, &[], &term, &[]))
            .map_err(|e| IbcError::Solver(e.to_string()))?;
        let elapsed_ms = start.elapsed().as_millis() as u64;
        let verdict = verdict_of(outcome);
        info!(%condition, elapsed_ms, "status: {verdict}");
        reports.push(ConditionReport {
            condition,
            verdict,
            elapsed_ms,
        });
    }
    Ok(reports)
}
