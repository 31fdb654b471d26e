//! Incremental search over chain lengths `k = 0..=k_max`.

use std::time::Instant;

use ibc_smt::solver::{Model, SmtSolver};
use tracing::{info, warn};

use super::adapter::{check_encoding, CheckOutcome};
use super::timeout::{
    attempt_timeout_secs, deadline_exceeded, deadline_from_timeout_secs, timeout_unknown_reason,
};
use super::{with_solver_factory, IbcError, SearchOptions};
use crate::config::IbcProblem;
use crate::encoder::encode_synthesis;
use crate::extract::{extract_coefficients, ExtractError, ReconstructedCoefficients};
use crate::result::{AttemptRecord, AttemptVerdict, FoundCertificate, SearchOutcome};
use crate::sanity::check_chain;
use crate::template::CoefficientTable;

/// Search with the backend named in `options`.
pub fn search(problem: &IbcProblem, options: &SearchOptions) -> Result<SearchOutcome, IbcError> {
    with_solver_factory!(options.solver, factory => search_with(problem, options, factory))
}

/// Search with solvers built by `make_solver`, which receives the timeout in
/// seconds to configure (0 = none). Every chain length gets a fresh solver.
///
/// No single attempt ends the search early unless it yields a chain: unsat,
/// unknown, backend failures, unreadable models and models that fail the
/// numeric re-check are all recorded and the next `k` is tried.
pub fn search_with<S, F>(
    problem: &IbcProblem,
    options: &SearchOptions,
    mut make_solver: F,
) -> Result<SearchOutcome, IbcError>
where
    S: SmtSolver,
    F: FnMut(u64) -> Result<S, S::Error>,
{
    let deadline = deadline_from_timeout_secs(options.overall_timeout_secs);
    let mut attempts = Vec::new();

    for k in 0..=problem.k_max() {
        let context = format!("k = {k}");
        let timeout = match attempt_timeout_secs(options.attempt_timeout_secs, deadline) {
            Some(secs) if !deadline_exceeded(deadline) => secs,
            _ => {
                let reason = timeout_unknown_reason(&context);
                warn!(k, "{reason}");
                attempts.push(AttemptRecord {
                    k,
                    verdict: AttemptVerdict::Unknown { reason },
                    elapsed_ms: 0,
                });
                continue;
            }
        };

        info!(system = problem.name(), k, "checking chain");
        let (encoding, table) = encode_synthesis(problem, k);
        let start = Instant::now();
        let outcome = make_solver(timeout).and_then(|mut solver| check_encoding(&mut solver, &encoding));
        let elapsed_ms = start.elapsed().as_millis() as u64;

        let verdict = match outcome {
            Ok(CheckOutcome::Satisfiable(model)) => {
                info!(k, elapsed_ms, "status: sat");
                match accept_model(problem, options, &model, &table) {
                    Ok(coefficients) => {
                        for (i, cert) in coefficients.certificates.iter().enumerate() {
                            info!("i={i}: {cert:?}");
                        }
                        attempts.push(AttemptRecord {
                            k,
                            verdict: AttemptVerdict::Satisfiable,
                            elapsed_ms,
                        });
                        return Ok(SearchOutcome::Found(FoundCertificate {
                            system: problem.name().to_string(),
                            k,
                            coefficients,
                            attempts,
                        }));
                    }
                    Err(verdict) => {
                        warn!(k, "model discarded: {verdict}");
                        verdict
                    }
                }
            }
            Ok(CheckOutcome::Unsatisfiable) => {
                info!(k, elapsed_ms, "status: unsat");
                AttemptVerdict::Unsatisfiable
            }
            Ok(CheckOutcome::Unknown(reason)) => {
                info!(k, elapsed_ms, reason = reason.as_str(), "status: unknown");
                AttemptVerdict::Unknown { reason }
            }
            Err(e) => {
                warn!(k, elapsed_ms, "solver failed: {e}");
                AttemptVerdict::Failed {
                    reason: e.to_string(),
                }
            }
        };
        attempts.push(AttemptRecord {
            k,
            verdict,
            elapsed_ms,
        });
    }

    info!(system = problem.name(), k_max = problem.k_max(), "no chain found");
    Ok(SearchOutcome::NotFound {
        system: problem.name().to_string(),
        k_max: problem.k_max(),
        attempts,
    })
}

/// Read the chain out of `model` and re-check it on the sample grid.
fn accept_model(
    problem: &IbcProblem,
    options: &SearchOptions,
    model: &Model,
    table: &CoefficientTable,
) -> Result<ReconstructedCoefficients, AttemptVerdict> {
    let unreadable = |e: ExtractError| AttemptVerdict::Failed {
        reason: format!("coefficient extraction failed: {e}"),
    };
    let coefficients = extract_coefficients(model, table).map_err(unreadable)?;
    if options.sanity_samples > 0 {
        let chain = coefficients.chain(problem.basis()).map_err(unreadable)?;
        let violations = check_chain(problem, &chain, options.sanity_samples);
        if !violations.is_empty() {
            return Err(AttemptVerdict::Rejected { violations });
        }
    }
    Ok(coefficients)
}
